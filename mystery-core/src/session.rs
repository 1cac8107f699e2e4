//! Per-session narrative state: timeline, evidence, and NPC memory.

use crate::dialogue::NpcMemory;
use crate::world::{AvatarKind, WorldCatalog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Speaker name used for engine narration.
pub const NARRATOR: &str = "Narrator";
/// Speaker name used for echoed player messages.
pub const PLAYER: &str = "You";

/// Opaque, globally unique session identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a fresh session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One message in a session's append-only timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub speaker: String,
    pub text: String,
    #[serde(rename = "avatar_type")]
    pub avatar: AvatarKind,
}

impl TimelineEntry {
    pub fn new(
        speaker: impl Into<String>,
        text: impl Into<String>,
        avatar: AvatarKind,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            avatar,
        }
    }

    /// A narrator-attributed entry.
    pub fn narrator(text: impl Into<String>) -> Self {
        Self::new(NARRATOR, text, AvatarKind::Brown)
    }

    /// A player-attributed entry.
    pub fn player(text: impl Into<String>) -> Self {
        Self::new(PLAYER, text, AvatarKind::Blue)
    }
}

/// A discrete unit of discovered narrative information.
///
/// Recorded at most once per session per id, regardless of how the
/// surrounding text was phrased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub description: String,
}

impl Clue {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// The accumulated state of one player session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    /// Current location; always a catalog key.
    pub location: String,
    /// Public clue counter; always equals `evidence.len()`.
    pub clue_count: usize,
    /// Discovered clues in discovery order, set semantics by id.
    pub evidence: Vec<Clue>,
    /// Append-only message log in display order.
    pub timeline: Vec<TimelineEntry>,
    /// Per-NPC conversation memory, keyed by NPC catalog key.
    pub npc_memory: HashMap<String, NpcMemory>,
}

impl SessionState {
    /// Create a session at the catalog's starting location, seeded
    /// with the opening narration.
    pub fn new(id: SessionId, catalog: &WorldCatalog) -> Self {
        let opening = catalog.opening();
        Self {
            id,
            location: catalog.starting_location().to_string(),
            clue_count: 0,
            evidence: Vec::new(),
            timeline: vec![TimelineEntry::new(
                opening.speaker.clone(),
                opening.text.clone(),
                opening.avatar,
            )],
            npc_memory: HashMap::new(),
        }
    }

    /// Append an entry to the timeline.
    pub fn push_entry(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
    }

    /// Record a clue if it is not already in evidence.
    ///
    /// Returns `true` if the clue was newly recorded.
    pub fn record_clue(&mut self, clue: Clue) -> bool {
        if self.evidence.iter().any(|c| c.id == clue.id) {
            return false;
        }
        self.evidence.push(clue);
        self.clue_count += 1;
        true
    }

    /// Whether a clue id is already in evidence.
    pub fn has_clue(&self, id: &str) -> bool {
        self.evidence.iter().any(|c| c.id == id)
    }

    /// Memory for an NPC, created on first access.
    pub fn memory_for(&mut self, npc_id: &str) -> &mut NpcMemory {
        self.npc_memory.entry(npc_id.to_string()).or_default()
    }

    /// Verify the session's structural invariants after a mutation.
    ///
    /// `min_timeline_len` is the timeline length before the mutation;
    /// the timeline must have strictly grown past it.
    pub fn check_invariants(
        &self,
        catalog: &WorldCatalog,
        min_timeline_len: usize,
    ) -> Result<(), String> {
        if self.clue_count != self.evidence.len() {
            return Err(format!(
                "clue_count {} != evidence size {}",
                self.clue_count,
                self.evidence.len()
            ));
        }
        if !catalog.has_location(&self.location) {
            return Err(format!("current location '{}' not in catalog", self.location));
        }
        if self.timeline.len() <= min_timeline_len {
            return Err(format!(
                "timeline did not grow (was {}, now {})",
                min_timeline_len,
                self.timeline.len()
            ));
        }
        Ok(())
    }

    /// Build the caller-facing view of this session.
    pub fn view(&self, catalog: &WorldCatalog) -> SessionStateView {
        let location = catalog
            .location(&self.location)
            .map(|l| l.display.clone())
            .unwrap_or_else(|| self.location.clone());

        SessionStateView {
            location,
            clues_found: self.clue_count,
            timeline: self.timeline.clone(),
            evidence: self.evidence.iter().map(|c| c.id.clone()).collect(),
            npcs: catalog
                .npcs()
                .map(|npc| {
                    (
                        npc.id.clone(),
                        NpcView {
                            display: npc.display.clone(),
                            avatar: npc.avatar,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Display metadata for an NPC, exposed to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcView {
    pub display: String,
    #[serde(rename = "avatar_type")]
    pub avatar: AvatarKind,
}

/// Caller-facing snapshot of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateView {
    /// Display name of the current location.
    pub location: String,
    pub clues_found: usize,
    pub timeline: Vec<TimelineEntry>,
    /// Discovered clue identifiers in discovery order.
    pub evidence: Vec<String>,
    pub npcs: BTreeMap<String, NpcView>,
}
