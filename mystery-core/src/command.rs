//! Command classification: free-text player input to a typed [`Action`].
//!
//! Classification is prefix/keyword based, applied in a fixed priority
//! order (movement, inspection, dialogue, fallback) so ambiguous input
//! resolves deterministically. Matching is case-folded; the original
//! casing of the input is preserved for echo-back.

use crate::world::WorldCatalog;

const MOVE_PREFIXES: &[&str] = &["go to", "travel to", "head to"];
const INSPECT_PREFIXES: &[&str] = &["inspect", "examine"];
const DIALOGUE_PREFIXES: &[&str] = &["talk to", "speak with", "ask"];

/// The classified intent of a player's raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Move to a catalog location (key is validated).
    Move { destination: String },
    /// Inspect a free-text object; targets are not validated.
    Inspect { object: String },
    /// Address a catalog NPC. `query` is the question for `ask ...`
    /// input, otherwise the full original input.
    Dialogue { npc: String, query: String },
    /// Input that resolved to no world action.
    Unknown(UnknownInput),
}

/// What kind of input failed to resolve, for user-facing feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownInput {
    /// A movement verb with an unmatched destination phrase.
    Destination { phrase: String },
    /// A dialogue verb with an unmatched addressee phrase.
    Person { phrase: String },
    /// Anything else; carries the original text.
    Other { text: String },
}

/// Classify raw player input against the world catalog.
pub fn classify(catalog: &WorldCatalog, raw: &str) -> Action {
    let input = raw.trim();

    // 1. Movement
    for prefix in MOVE_PREFIXES {
        if let Some(rest) = strip_prefix_ci(input, prefix) {
            return match catalog.match_location(rest) {
                Some(location) => Action::Move {
                    destination: location.id.clone(),
                },
                None => Action::Unknown(UnknownInput::Destination {
                    phrase: rest.to_string(),
                }),
            };
        }
    }

    // 2. Inspection
    for prefix in INSPECT_PREFIXES {
        if let Some(rest) = strip_prefix_ci(input, prefix) {
            if !rest.is_empty() {
                return Action::Inspect {
                    object: rest.to_string(),
                };
            }
        }
    }

    // 3. Dialogue by verb
    for prefix in DIALOGUE_PREFIXES {
        if let Some(rest) = strip_prefix_ci(input, prefix) {
            return match catalog.find_npc_in(rest) {
                Some(npc) => Action::Dialogue {
                    npc: npc.id.clone(),
                    // For `ask` the remainder is the question verbatim;
                    // bare addressing passes the whole input through.
                    query: if *prefix == "ask" && !rest.is_empty() {
                        rest.to_string()
                    } else {
                        input.to_string()
                    },
                },
                None => Action::Unknown(UnknownInput::Person {
                    phrase: rest.to_string(),
                }),
            };
        }
    }

    // 3b. Dialogue by NPC name anywhere in the input
    if let Some(npc) = catalog.find_npc_in(input) {
        return Action::Dialogue {
            npc: npc.id.clone(),
            query: input.to_string(),
        };
    }

    // 4. Fallback
    Action::Unknown(UnknownInput::Other {
        text: input.to_string(),
    })
}

/// Strip an ASCII prefix case-insensitively, requiring a word boundary,
/// and return the trimmed remainder.
fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &input[prefix.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::hogwarts_catalog;

    #[test]
    fn test_classify_move() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "go to library"),
            Action::Move {
                destination: "library".to_string()
            }
        );
        assert_eq!(
            classify(&catalog, "Travel To the Great Hall"),
            Action::Move {
                destination: "great hall".to_string()
            }
        );
        assert_eq!(
            classify(&catalog, "head to courtyard"),
            Action::Move {
                destination: "courtyard".to_string()
            }
        );
    }

    #[test]
    fn test_classify_unknown_destination() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "go to the Forbidden Zone"),
            Action::Unknown(UnknownInput::Destination {
                phrase: "the Forbidden Zone".to_string()
            })
        );
    }

    #[test]
    fn test_classify_inspect_preserves_casing() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "examine the Stone Fountain"),
            Action::Inspect {
                object: "the Stone Fountain".to_string()
            }
        );
    }

    #[test]
    fn test_inspect_beats_dialogue_name_match() {
        // Priority order: an inspect verb wins even when an NPC name
        // appears in the input.
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "inspect draco's wand"),
            Action::Inspect {
                object: "draco's wand".to_string()
            }
        );
    }

    #[test]
    fn test_classify_dialogue_verbs() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "talk to draco"),
            Action::Dialogue {
                npc: "draco".to_string(),
                query: "talk to draco".to_string()
            }
        );
        assert_eq!(
            classify(&catalog, "ask evelyn about the missing artifact"),
            Action::Dialogue {
                npc: "evelyn".to_string(),
                query: "evelyn about the missing artifact".to_string()
            }
        );
    }

    #[test]
    fn test_classify_dialogue_by_name_only() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "Dumbledore, what happened here?"),
            Action::Dialogue {
                npc: "dumbledore".to_string(),
                query: "Dumbledore, what happened here?".to_string()
            }
        );
    }

    #[test]
    fn test_classify_unknown_person() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "talk to the gardener"),
            Action::Unknown(UnknownInput::Person {
                phrase: "the gardener".to_string()
            })
        );
    }

    #[test]
    fn test_classify_fallback() {
        let catalog = hogwarts_catalog();
        assert_eq!(
            classify(&catalog, "sing a song"),
            Action::Unknown(UnknownInput::Other {
                text: "sing a song".to_string()
            })
        );
    }

    #[test]
    fn test_prefix_needs_word_boundary() {
        let catalog = hogwarts_catalog();
        // "gossip" must not be read as "go" + "ssip".
        assert!(matches!(
            classify(&catalog, "gossip about draco"),
            Action::Dialogue { .. }
        ));
        // "asking" must not be read as "ask" + "ing".
        assert!(matches!(
            classify(&catalog, "asking"),
            Action::Unknown(UnknownInput::Other { .. })
        ));
    }
}
