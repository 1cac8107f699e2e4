//! Clue discovery: keyword rules and scripted inspections.
//!
//! A small fixed table maps (subject, keyword present in produced text)
//! to a clue. Matching is a case-insensitive substring check, so an
//! LLM rephrasing that preserves the keyword still triggers. Scripted
//! discoveries award a clue unconditionally on first inspection of a
//! named object in a specific location.

use crate::session::Clue;
use crate::world::normalize;
use serde::{Deserialize, Serialize};

/// Who or what produced the text being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClueSubject<'a> {
    /// Dialogue attributed to an NPC (by catalog key).
    Npc(&'a str),
    /// Narration produced at a location (by catalog key).
    Location(&'a str),
}

/// A keyword-triggered clue rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueRule {
    /// NPC key this rule listens to, if dialogue-sourced.
    pub npc: Option<String>,
    /// Location key this rule listens to, if narration-sourced.
    pub location: Option<String>,
    /// Lowercase keyword that must appear in the produced text.
    pub keyword: String,
    pub clue: Clue,
}

/// A scripted first-inspection discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedDiscovery {
    /// Location the object must be inspected in.
    pub location: String,
    /// Normalized object name.
    pub object: String,
    pub clue: Clue,
    /// Narration shown when the clue is first discovered.
    pub discovery_text: String,
    /// Narration shown on repeat inspections.
    pub repeat_text: String,
}

/// The fixed clue table for a world.
#[derive(Debug, Clone, Default)]
pub struct ClueBook {
    rules: Vec<ClueRule>,
    scripted: Vec<ScriptedDiscovery>,
}

impl ClueBook {
    pub fn new(rules: Vec<ClueRule>, scripted: Vec<ScriptedDiscovery>) -> Self {
        Self { rules, scripted }
    }

    /// Scan produced text for keyword-triggered clues.
    ///
    /// Returns every matching clue; recording them idempotently is the
    /// session's job.
    pub fn extract(&self, subject: ClueSubject<'_>, text: &str) -> Vec<Clue> {
        let haystack = text.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| match subject {
                ClueSubject::Npc(id) => rule.npc.as_deref() == Some(id),
                ClueSubject::Location(id) => rule.location.as_deref() == Some(id),
            })
            .filter(|rule| haystack.contains(&rule.keyword))
            .map(|rule| rule.clue.clone())
            .collect()
    }

    /// Look up the scripted discovery for inspecting an object at a
    /// location, if one exists.
    pub fn scripted(&self, location: &str, object: &str) -> Option<&ScriptedDiscovery> {
        let object = normalize(object);
        let object = object.strip_prefix("the ").unwrap_or(&object);
        self.scripted
            .iter()
            .find(|s| s.location == location && s.object == object)
    }
}

/// Clue table for the default magical-school mystery world.
pub fn hogwarts_clues() -> ClueBook {
    let rules = vec![
        ClueRule {
            npc: Some("draco".to_string()),
            location: None,
            keyword: "astronomy tower".to_string(),
            clue: Clue::new(
                "astronomy-tower-sighting",
                "Draco was seen near the Astronomy Tower that night.",
            ),
        },
        ClueRule {
            npc: Some("evelyn".to_string()),
            location: None,
            keyword: "ancient map".to_string(),
            clue: Clue::new(
                "ancient-map",
                "Someone was carrying an ancient map out of the library.",
            ),
        },
        ClueRule {
            npc: Some("dumbledore".to_string()),
            location: None,
            keyword: "restricted section".to_string(),
            clue: Clue::new(
                "restricted-section",
                "The missing artifact is tied to the Restricted Section.",
            ),
        },
        // Inspecting the library shelves points at the same lead.
        ClueRule {
            npc: None,
            location: Some("library".to_string()),
            keyword: "restricted section".to_string(),
            clue: Clue::new(
                "restricted-section",
                "The missing artifact is tied to the Restricted Section.",
            ),
        },
    ];

    let scripted = vec![ScriptedDiscovery {
        location: "great hall".to_string(),
        object: "shimmer".to_string(),
        clue: Clue::new(
            "magical-trace",
            "The magical trace of the missing artifact.",
        ),
        discovery_text: "As you examine the area, you discover a peculiar \
                         shimmer! It leaves behind a magical trace - a new \
                         clue: the magical trace of the missing artifact."
            .to_string(),
        repeat_text: "You've already inspected the shimmer. It seems to \
                      point toward the library, but you have nothing new to \
                      learn here."
            .to_string(),
    }];

    ClueBook::new(rules, scripted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let book = hogwarts_clues();
        let clues = book.extract(
            ClueSubject::Npc("draco"),
            "Fine! I was up on the ASTRONOMY TOWER, but I saw nothing!",
        );
        assert_eq!(clues.len(), 1);
        assert_eq!(clues[0].id, "astronomy-tower-sighting");
    }

    #[test]
    fn test_keyword_requires_matching_subject() {
        let book = hogwarts_clues();
        // Evelyn mentioning the tower does not trigger Draco's rule.
        let clues = book.extract(
            ClueSubject::Npc("evelyn"),
            "I heard someone on the astronomy tower.",
        );
        assert!(clues.is_empty());
    }

    #[test]
    fn test_location_sourced_rule() {
        let book = hogwarts_clues();
        let clues = book.extract(
            ClueSubject::Location("library"),
            "The missing volume belongs to the restricted section.",
        );
        assert_eq!(clues.len(), 1);
        assert_eq!(clues[0].id, "restricted-section");
    }

    #[test]
    fn test_no_match_yields_empty() {
        let book = hogwarts_clues();
        assert!(book
            .extract(ClueSubject::Npc("draco"), "I know nothing about it.")
            .is_empty());
    }

    #[test]
    fn test_scripted_lookup() {
        let book = hogwarts_clues();
        assert!(book.scripted("great hall", "shimmer").is_some());
        assert!(book.scripted("great hall", "The Shimmer").is_some());
        assert!(book.scripted("library", "shimmer").is_none());
        assert!(book.scripted("great hall", "candles").is_none());
    }
}
