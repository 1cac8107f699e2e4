//! Session-based murder mystery engine with LLM-backed NPC dialogue.
//!
//! This crate provides:
//! - Free-text command classification (movement, inspection, dialogue)
//! - Deterministic world actions over an injected static catalog
//! - NPC dialogue via the Gemini API, with a deterministic mock
//!   fallback that needs no external service
//! - Keyword-driven clue discovery and per-session narrative state
//!
//! # Quick Start
//!
//! ```ignore
//! use mystery_core::{hogwarts_catalog, hogwarts_clues, EngineConfig, MysteryEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = MysteryEngine::from_env(
//!         hogwarts_catalog(),
//!         hogwarts_clues(),
//!         EngineConfig::default(),
//!     );
//!
//!     let started = engine.start_session();
//!     let outcome = engine.apply_action(started.session_id, "go to library").await?;
//!     for entry in &outcome.reply {
//!         println!("{}: {}", entry.speaker, entry.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod clues;
pub mod command;
pub mod dialogue;
pub mod engine;
pub mod session;
pub mod store;
pub mod testing;
pub mod world;

// Primary public API
pub use clues::{hogwarts_clues, ClueBook, ClueRule, ClueSubject, ScriptedDiscovery};
pub use command::{classify, Action, UnknownInput};
pub use dialogue::{
    mock_reply, DialogueContext, Exchange, GeminiGenerator, GenerateError, NpcMemory, Responder,
    Strategy, TextGenerator,
};
pub use engine::{ActionOutcome, EngineConfig, EngineError, MysteryEngine, StartedSession};
pub use session::{
    Clue, NpcView, SessionId, SessionState, SessionStateView, TimelineEntry, NARRATOR, PLAYER,
};
pub use store::{SessionStore, DEFAULT_MAX_SESSIONS};
pub use testing::{FailingGenerator, ScriptedGenerator, TestHarness};
pub use world::{hogwarts_catalog, AvatarKind, Location, Npc, Opening, WorldCatalog};
