//! The session engine: classifies input, resolves actions, and
//! mutates session state.
//!
//! Only unknown session ids surface as errors. Unresolved targets
//! become narrator text, generation failures become mock replies, and
//! invariant violations abort the mutation instead of persisting
//! corrupted state (each action mutates a clone that is committed only
//! after its invariants re-check).

use crate::clues::{ClueBook, ClueSubject};
use crate::command::{classify, Action, UnknownInput};
use crate::dialogue::{DialogueContext, GeminiGenerator, Responder};
use crate::session::{SessionId, SessionState, SessionStateView, TimelineEntry};
use crate::store::{SessionStore, DEFAULT_MAX_SESSIONS};
use crate::world::WorldCatalog;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced to the engine's caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("session invariant violated: {0}")]
    Invariant(String),
}

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ceiling on concurrently retained sessions.
    pub max_sessions: usize,
    /// Bound on a single live generation call.
    pub generation_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            generation_timeout: Duration::from_secs(20),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

/// A freshly started session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub state: SessionStateView,
}

/// The result of applying one action.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActionOutcome {
    /// The entries this action appended, excluding the player echo.
    pub reply: Vec<TimelineEntry>,
    pub state: SessionStateView,
}

/// The session-based mystery engine.
pub struct MysteryEngine {
    catalog: WorldCatalog,
    clues: ClueBook,
    responder: Responder,
    store: SessionStore,
}

impl MysteryEngine {
    /// Build an engine from explicit collaborators.
    pub fn new(
        catalog: WorldCatalog,
        clues: ClueBook,
        responder: Responder,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            clues,
            responder: responder.with_timeout(config.generation_timeout),
            store: SessionStore::new(config.max_sessions),
        }
    }

    /// Build a mock-only engine (no external calls).
    pub fn mock(catalog: WorldCatalog, clues: ClueBook) -> Self {
        Self::new(catalog, clues, Responder::mock(), EngineConfig::default())
    }

    /// Build an engine from the environment: live generation when
    /// GEMINI_API_KEY is set (honoring MODEL), mock otherwise.
    pub fn from_env(catalog: WorldCatalog, clues: ClueBook, config: EngineConfig) -> Self {
        let responder = match gemini::Gemini::from_env() {
            Ok(client) => {
                let client = match std::env::var("MODEL") {
                    Ok(model) => client.with_model(model),
                    Err(_) => client,
                };
                info!(model = client.model(), "live generation configured");
                Responder::live(Box::new(GeminiGenerator::new(client)))
            }
            Err(_) => {
                info!("GEMINI_API_KEY not set, running with mock dialogue");
                Responder::mock()
            }
        };
        Self::new(catalog, clues, responder, config)
    }

    /// Whether dialogue uses the live strategy.
    pub fn is_live(&self) -> bool {
        self.responder.is_live()
    }

    /// The injected world catalog.
    pub fn catalog(&self) -> &WorldCatalog {
        &self.catalog
    }

    /// Number of retained sessions.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Start a new session at the fixed starting location.
    pub fn start_session(&self) -> StartedSession {
        let id = SessionId::new();
        let state = SessionState::new(id, &self.catalog);
        let view = state.view(&self.catalog);
        self.store.insert(state);
        info!(session = %id, "session started");

        StartedSession {
            session_id: id,
            state: view,
        }
    }

    /// Resolve one player action against a session.
    ///
    /// Returns the newly appended reply entries (the player echo is
    /// recorded in the timeline but not repeated in the reply) plus a
    /// state snapshot.
    pub async fn apply_action(
        &self,
        session_id: SessionId,
        text: &str,
    ) -> Result<ActionOutcome, EngineError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or(EngineError::NotFound(session_id))?;

        // Per-session serialization: one action in flight at a time.
        let mut guard = handle.state.lock().await;
        handle.touch();

        let mut working = guard.clone();
        let before = working.timeline.len();
        working.push_entry(TimelineEntry::player(text.trim()));

        let mut reply = Vec::new();
        match classify(&self.catalog, text) {
            Action::Move { destination } => {
                self.resolve_move(&mut working, &destination, &mut reply);
            }
            Action::Inspect { object } => {
                self.resolve_inspect(&mut working, &object, &mut reply);
            }
            Action::Dialogue { npc, query } => {
                self.resolve_dialogue(&mut working, &npc, &query, &mut reply)
                    .await;
            }
            Action::Unknown(unknown) => {
                resolve_unknown(&mut working, unknown, &mut reply);
            }
        }

        if let Err(violation) = working.check_invariants(&self.catalog, before) {
            error!(session = %session_id, %violation, "aborting action");
            return Err(EngineError::Invariant(violation));
        }

        let state = working.view(&self.catalog);
        *guard = working;

        Ok(ActionOutcome { reply, state })
    }

    fn resolve_move(&self, state: &mut SessionState, destination: &str, reply: &mut Vec<TimelineEntry>) {
        let Some(location) = self.catalog.location(destination) else {
            emit(
                state,
                reply,
                TimelineEntry::narrator(format!(
                    "You can't seem to find a path to '{destination}'."
                )),
            );
            return;
        };

        if state.location == location.id {
            emit(
                state,
                reply,
                TimelineEntry::narrator(format!("You are already in {}.", location.display)),
            );
            return;
        }

        state.location = location.id.clone();
        emit(state, reply, TimelineEntry::narrator(location.description.clone()));
    }

    fn resolve_inspect(&self, state: &mut SessionState, object: &str, reply: &mut Vec<TimelineEntry>) {
        if let Some(discovery) = self.clues.scripted(&state.location, object) {
            let text = if state.record_clue(discovery.clue.clone()) {
                discovery.discovery_text.clone()
            } else {
                discovery.repeat_text.clone()
            };
            emit(state, reply, TimelineEntry::narrator(text));
            return;
        }

        let text = self
            .catalog
            .location(&state.location)
            .and_then(|l| l.object_description(object))
            .map(str::to_string)
            .unwrap_or_else(|| {
                let object = strip_article(object.trim());
                format!(
                    "You carefully inspect the {object}. You find nothing out of the \
                     ordinary, but you feel like you should be looking for something \
                     else..."
                )
            });

        for clue in self.clues.extract(ClueSubject::Location(&state.location), &text) {
            if state.record_clue(clue.clone()) {
                info!(session = %state.id, clue = %clue.id, "clue discovered");
            }
        }

        emit(state, reply, TimelineEntry::narrator(text));
    }

    async fn resolve_dialogue(
        &self,
        state: &mut SessionState,
        npc_id: &str,
        query: &str,
        reply: &mut Vec<TimelineEntry>,
    ) {
        let Some(npc) = self.catalog.npc(npc_id) else {
            emit(
                state,
                reply,
                TimelineEntry::narrator("No one by that name is here."),
            );
            return;
        };

        let location = self
            .catalog
            .location(&state.location)
            .map(|l| l.display.clone())
            .unwrap_or_else(|| state.location.clone());
        let memory = state.npc_memory.get(npc_id).cloned().unwrap_or_default();

        let ctx = DialogueContext {
            location: &location,
            evidence: &state.evidence,
            memory: &memory,
        };
        let text = self.responder.respond(npc, query, &ctx).await;

        state.memory_for(npc_id).add_exchange(query, &text);
        for clue in self.clues.extract(ClueSubject::Npc(npc_id), &text) {
            if state.record_clue(clue.clone()) {
                info!(session = %state.id, clue = %clue.id, "clue discovered");
            }
        }

        emit(
            state,
            reply,
            TimelineEntry::new(npc.display.clone(), text, npc.avatar),
        );
    }
}

fn resolve_unknown(state: &mut SessionState, unknown: UnknownInput, reply: &mut Vec<TimelineEntry>) {
    let text = match unknown {
        UnknownInput::Destination { phrase } => format!(
            "You can't seem to find a path to '{phrase}'. Try a common castle location."
        ),
        UnknownInput::Person { phrase } => {
            format!("No one by the name '{phrase}' is here.")
        }
        UnknownInput::Other { .. } => "You try to execute the action, but it doesn't seem to \
                                       have a clear effect. Try 'go to [location]', 'inspect \
                                       [item]', or 'talk to [NPC]'."
            .to_string(),
    };
    emit(state, reply, TimelineEntry::narrator(text));
}

/// Drop a leading article for cleaner echo-back.
fn strip_article(object: &str) -> &str {
    for article in ["the ", "The ", "a ", "A "] {
        if let Some(rest) = object.strip_prefix(article) {
            return rest;
        }
    }
    object
}

/// Append an entry to both the timeline and the reply list.
fn emit(state: &mut SessionState, reply: &mut Vec<TimelineEntry>, entry: TimelineEntry) {
    state.push_entry(entry.clone());
    reply.push(entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clues::hogwarts_clues;
    use crate::world::hogwarts_catalog;

    fn mock_engine() -> MysteryEngine {
        MysteryEngine::mock(hogwarts_catalog(), hogwarts_clues())
    }

    #[test]
    fn test_start_session_initial_state() {
        let engine = mock_engine();
        let started = engine.start_session();

        assert_eq!(started.state.location, "The Great Hall");
        assert_eq!(started.state.timeline.len(), 1);
        assert_eq!(started.state.clues_found, 0);
        assert_eq!(engine.session_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let engine = mock_engine();
        let missing = SessionId::new();
        let result = engine.apply_action(missing, "go to library").await;
        assert!(matches!(result, Err(EngineError::NotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_move_to_valid_location() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "go to library")
            .await
            .unwrap();

        assert_eq!(outcome.state.location, "The Library");
        assert_eq!(outcome.reply.len(), 1);
        assert_eq!(outcome.reply[0].speaker, "Narrator");
        assert!(outcome.reply[0].text.contains("dusty books"));
    }

    #[tokio::test]
    async fn test_move_to_unknown_destination_is_soft() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "go to the forbidden zone")
            .await
            .unwrap();

        assert_eq!(outcome.state.location, "The Great Hall");
        assert_eq!(outcome.reply.len(), 1);
        assert_eq!(outcome.reply[0].speaker, "Narrator");
        assert!(outcome.reply[0].text.contains("the forbidden zone"));
    }

    #[tokio::test]
    async fn test_move_to_current_location() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "go to great hall")
            .await
            .unwrap();

        assert_eq!(outcome.state.location, "The Great Hall");
        assert!(outcome.reply[0].text.contains("already in"));
    }

    #[tokio::test]
    async fn test_player_echo_recorded_but_not_replied() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "go to library")
            .await
            .unwrap();

        // Timeline: opening, player echo, narrator arrival.
        assert_eq!(outcome.state.timeline.len(), 3);
        assert_eq!(outcome.state.timeline[1].speaker, "You");
        assert_eq!(outcome.state.timeline[1].text, "go to library");
        assert_eq!(outcome.reply.len(), 1);
    }

    #[tokio::test]
    async fn test_dialogue_attributed_to_npc() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "talk to draco")
            .await
            .unwrap();

        assert_eq!(outcome.reply.len(), 1);
        assert_eq!(outcome.reply[0].speaker, "Draco Malfoy");
        assert!(!outcome.reply[0].text.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_input_clarification() {
        let engine = mock_engine();
        let started = engine.start_session();

        let outcome = engine
            .apply_action(started.session_id, "sing a song")
            .await
            .unwrap();

        assert_eq!(outcome.state.location, "The Great Hall");
        assert_eq!(outcome.state.clues_found, 0);
        assert_eq!(outcome.reply.len(), 1);
        assert!(outcome.reply[0].text.contains("'go to [location]'"));
    }
}
