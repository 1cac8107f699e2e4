//! Testing utilities for the mystery engine.
//!
//! This module provides tools for integration testing:
//! - `ScriptedGenerator` and `FailingGenerator` for exercising the
//!   live strategy without API calls
//! - `TestHarness` for driving a session through scripted input
//! - Assertion helpers for verifying session state

use crate::clues::hogwarts_clues;
use crate::dialogue::{GenerateError, Responder, TextGenerator};
use crate::engine::{ActionOutcome, EngineConfig, EngineError, MysteryEngine};
use crate::session::SessionId;
use crate::world::hogwarts_catalog;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A generator that returns scripted replies in order.
///
/// Once the script is exhausted it fails, which exercises the mock
/// fallback path.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, GenerateError> {
        self.replies
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .ok_or_else(|| GenerateError::Service("script exhausted".to_string()))
    }
}

/// A generator that always fails, for testing fallback behavior.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Service("generator forced to fail".to_string()))
    }
}

/// Test harness: a default-world engine plus one started session.
pub struct TestHarness {
    pub engine: MysteryEngine,
    pub session_id: SessionId,
    /// The outcome of the most recent action.
    pub last: Option<ActionOutcome>,
}

impl TestHarness {
    /// Harness with mock dialogue.
    pub fn new() -> Self {
        Self::with_engine(MysteryEngine::mock(hogwarts_catalog(), hogwarts_clues()))
    }

    /// Harness with a custom live generator.
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self::with_engine(MysteryEngine::new(
            hogwarts_catalog(),
            hogwarts_clues(),
            Responder::live(generator),
            EngineConfig::default(),
        ))
    }

    fn with_engine(engine: MysteryEngine) -> Self {
        let started = engine.start_session();
        Self {
            engine,
            session_id: started.session_id,
            last: None,
        }
    }

    /// Send player input and return the outcome.
    pub async fn input(&mut self, text: &str) -> Result<ActionOutcome, EngineError> {
        let outcome = self.engine.apply_action(self.session_id, text).await?;
        self.last = Some(outcome.clone());
        Ok(outcome)
    }

    /// Display name of the session's current location.
    pub fn location(&self) -> String {
        self.last
            .as_ref()
            .map(|o| o.state.location.clone())
            .unwrap_or_else(|| "The Great Hall".to_string())
    }

    /// Clues found so far.
    pub fn clues_found(&self) -> usize {
        self.last.as_ref().map(|o| o.state.clues_found).unwrap_or(0)
    }

    /// Timeline length after the most recent action.
    pub fn timeline_len(&self) -> usize {
        self.last
            .as_ref()
            .map(|o| o.state.timeline.len())
            .unwrap_or(1)
    }

    /// The text of the last reply entry, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.last
            .as_ref()
            .and_then(|o| o.reply.last())
            .map(|e| e.text.as_str())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the session is at the given location (display name).
#[track_caller]
pub fn assert_location(harness: &TestHarness, display: &str) {
    let actual = harness.location();
    assert_eq!(
        actual, display,
        "Expected location '{display}', got '{actual}'"
    );
}

/// Assert the number of clues found.
#[track_caller]
pub fn assert_clues_found(harness: &TestHarness, count: usize) {
    let actual = harness.clues_found();
    assert_eq!(actual, count, "Expected {count} clues, got {actual}");
}

/// Assert the last reply was spoken by the given speaker.
#[track_caller]
pub fn assert_last_speaker(harness: &TestHarness, speaker: &str) {
    let actual = harness
        .last
        .as_ref()
        .and_then(|o| o.reply.last())
        .map(|e| e.speaker.clone())
        .unwrap_or_default();
    assert_eq!(
        actual, speaker,
        "Expected last speaker '{speaker}', got '{actual}'"
    );
}
