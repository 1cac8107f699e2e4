//! Static world catalog: locations, NPCs, and presentation metadata.
//!
//! The catalog is immutable at runtime and injected into the engine,
//! so per-session logic stays testable against small fixture worlds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Avatar category used purely for presentation.
///
/// Serialized as a lowercase color name. Unrecognized categories fall
/// back to [`AvatarKind::Brown`] so presentation never fails on
/// unexpected data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    Purple,
    Green,
    Blue,
    #[default]
    #[serde(other)]
    Brown,
}

impl AvatarKind {
    /// The lowercase wire name of this avatar category.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarKind::Purple => "purple",
            AvatarKind::Green => "green",
            AvatarKind::Brown => "brown",
            AvatarKind::Blue => "blue",
        }
    }

    /// Parse a wire name, falling back to the default category.
    pub fn parse(name: &str) -> Self {
        match name {
            "purple" => AvatarKind::Purple,
            "green" => AvatarKind::Green,
            "brown" => AvatarKind::Brown,
            "blue" => AvatarKind::Blue,
            _ => AvatarKind::default(),
        }
    }
}

impl std::fmt::Display for AvatarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Normalized lowercase key, unique within the catalog.
    pub id: String,
    /// Display name shown to the player.
    pub display: String,
    /// Narration shown on arrival.
    pub description: String,
    /// Scripted descriptions for inspectable objects, keyed by
    /// normalized object name.
    pub objects: BTreeMap<String, String>,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        display: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            description: description.into(),
            objects: BTreeMap::new(),
        }
    }

    /// Add a scripted object description.
    pub fn with_object(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.objects.insert(normalize(&name.into()), description.into());
        self
    }

    /// Look up a scripted object description by free-text name.
    pub fn object_description(&self, name: &str) -> Option<&str> {
        self.objects.get(&normalize(name)).map(String::as_str)
    }
}

/// A non-player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    /// Normalized lowercase key, unique within the catalog.
    pub id: String,
    /// Display name shown to the player.
    pub display: String,
    /// Presentation avatar category.
    pub avatar: AvatarKind,
    /// Free-form persona description consumed by prompt construction.
    pub persona: String,
}

impl Npc {
    pub fn new(
        id: impl Into<String>,
        display: impl Into<String>,
        avatar: AvatarKind,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            avatar,
            persona: persona.into(),
        }
    }
}

/// The seeded narration shown when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    pub speaker: String,
    pub avatar: AvatarKind,
    pub text: String,
}

/// Read-only lookup tables for the fixed world.
#[derive(Debug, Clone)]
pub struct WorldCatalog {
    locations: BTreeMap<String, Location>,
    npcs: BTreeMap<String, Npc>,
    starting_location: String,
    opening: Opening,
}

impl WorldCatalog {
    /// Build a catalog from locations and NPCs.
    ///
    /// # Panics
    ///
    /// Panics if `starting_location` is not among the locations.
    /// Catalogs are constructed once at process start from fixed data,
    /// so a bad starting location is a programming error.
    pub fn new(
        locations: Vec<Location>,
        npcs: Vec<Npc>,
        starting_location: impl Into<String>,
        opening: Opening,
    ) -> Self {
        let starting_location = starting_location.into();
        let locations: BTreeMap<String, Location> = locations
            .into_iter()
            .map(|l| (l.id.clone(), l))
            .collect();
        assert!(
            locations.contains_key(&starting_location),
            "starting location '{starting_location}' not in catalog"
        );

        Self {
            locations,
            npcs: npcs.into_iter().map(|n| (n.id.clone(), n)).collect(),
            starting_location,
            opening,
        }
    }

    /// The fixed starting location key.
    pub fn starting_location(&self) -> &str {
        &self.starting_location
    }

    /// The seeded session-start narration.
    pub fn opening(&self) -> &Opening {
        &self.opening
    }

    /// Look up a location by key.
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Look up an NPC by key.
    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.get(id)
    }

    /// Iterate all locations in key order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Iterate all NPCs in key order.
    pub fn npcs(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.values()
    }

    /// Whether a location key exists.
    pub fn has_location(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Resolve a free-text destination phrase to a location.
    ///
    /// Comparison is exact on the normalized phrase against keys and
    /// display names, with a leading article stripped. No fuzzy or
    /// partial matching.
    pub fn match_location(&self, phrase: &str) -> Option<&Location> {
        let wanted = strip_article(&normalize(phrase));
        self.locations.values().find(|loc| {
            loc.id == wanted || strip_article(&normalize(&loc.display)) == wanted
        })
    }

    /// Find an NPC whose key or display name appears anywhere in the
    /// given input. Input is normalized; first match in key order wins.
    pub fn find_npc_in(&self, text: &str) -> Option<&Npc> {
        let haystack = normalize(text);
        self.npcs.values().find(|npc| {
            haystack.contains(npc.id.as_str()) || haystack.contains(&normalize(&npc.display))
        })
    }
}

/// Lowercase and collapse runs of whitespace to single spaces.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_article(phrase: &str) -> String {
    phrase
        .strip_prefix("the ")
        .unwrap_or(phrase)
        .to_string()
}

/// The default magical-school mystery world.
pub fn hogwarts_catalog() -> WorldCatalog {
    let locations = vec![
        Location::new(
            "great hall",
            "The Great Hall",
            "The Great Hall is magnificent as always, with floating candles \
             illuminating the enchanted ceiling. You feel a chill here.",
        )
        .with_object(
            "candles",
            "Hundreds of candles drift overhead. One cluster flickers oddly, \
             as if disturbed by something that passed through recently.",
        ),
        Location::new(
            "library",
            "The Library",
            "Thousands of dusty books line the shelves. Madam Pince watches \
             you suspiciously.",
        )
        .with_object(
            "books",
            "Most of the books are where they belong, but a gap on one shelf \
             catches your eye. The missing volume belongs to the restricted \
             section.",
        )
        .with_object(
            "shelves",
            "The shelves stretch into the gloom. Dust lies thick everywhere \
             except along one aisle, where someone walked recently.",
        ),
        Location::new(
            "courtyard",
            "The Courtyard",
            "The open courtyard is cold, with a stone fountain at its center. \
             Students rush to and fro.",
        )
        .with_object(
            "fountain",
            "Water trickles over worn stone. A few coins glint at the bottom, \
             none of them out of the ordinary.",
        ),
        Location::new(
            "dumbledore's office",
            "Dumbledore's Office",
            "A circular room filled with ancient, whirring instruments and \
             the sound of a sleeping phoenix.",
        )
        .with_object(
            "instruments",
            "The silver instruments whirr and click. One of them spins \
             faster whenever you mention the missing artifact.",
        ),
    ];

    let npcs = vec![
        Npc::new(
            "dumbledore",
            "Professor Dumbledore",
            AvatarKind::Purple,
            "Wise, calm, and slightly detached headmaster. Speaks in a \
             reassuring but enigmatic tone.",
        ),
        Npc::new(
            "draco",
            "Draco Malfoy",
            AvatarKind::Green,
            "Sly, arrogant, and easily panicked. Will deny everything and \
             try to shift blame.",
        ),
        Npc::new(
            "evelyn",
            "Evelyn (Fellow Student)",
            AvatarKind::Brown,
            "A studious and quiet Ravenclaw. Observant but nervous about \
             speaking out.",
        ),
    ];

    let opening = Opening {
        speaker: "Professor Dumbledore".to_string(),
        avatar: AvatarKind::Purple,
        text: "Welcome, young wizard, to Hogwarts School of Witchcraft and \
               Wizardry. A mysterious artifact has gone missing from the \
               castle, and we need your help to find it. Your journey begins \
               here in the Great Hall. What would you like to do?"
            .to_string(),
    };

    WorldCatalog::new(locations, npcs, "great hall", opening)
}
