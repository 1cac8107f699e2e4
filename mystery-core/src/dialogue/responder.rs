//! Response generation: live strategy with mock fallback.
//!
//! Two interchangeable strategies sit behind one contract: a live
//! strategy that prompts an external text-generation capability, and a
//! deterministic mock. Generation failures of any kind (timeout,
//! service error, empty output) degrade to the mock reply; dialogue
//! always receives an answer.

use super::memory::NpcMemory;
use super::mock::mock_reply;
use crate::session::Clue;
use crate::world::Npc;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const SYSTEM_INSTRUCTION: &str = include_str!("prompts/npc_system.txt");

/// How many remembered exchanges are injected into a prompt.
const PROMPT_MEMORY_SLICE: usize = 5;

/// Default bound on a single live generation call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Failures of the external generation capability.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation timed out")]
    Timeout,

    #[error("generation service error: {0}")]
    Service(String),

    #[error("generation returned empty output")]
    Empty,
}

/// The external text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt under a fixed system instruction.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerateError>;
}

/// Live generator backed by the Gemini API.
pub struct GeminiGenerator {
    client: gemini::Gemini,
    temperature: f32,
    max_output_tokens: usize,
}

impl GeminiGenerator {
    pub fn new(client: gemini::Gemini) -> Self {
        Self {
            client,
            temperature: 0.8,
            max_output_tokens: 512,
        }
    }

    /// Build from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, gemini::Error> {
        Ok(Self::new(gemini::Gemini::from_env()?))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: usize) -> Self {
        self.max_output_tokens = max;
        self
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerateError> {
        let request = gemini::Request::new(prompt)
            .with_system(system)
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens);

        match self.client.generate(request).await {
            Ok(text) => Ok(text),
            Err(gemini::Error::Empty) => Err(GenerateError::Empty),
            Err(e) => Err(GenerateError::Service(e.to_string())),
        }
    }
}

/// Generation strategy selected at engine construction time.
pub enum Strategy {
    /// Call an external capability, falling back to mock on failure.
    Live(Box<dyn TextGenerator>),
    /// Deterministic canned replies, no external dependency.
    Mock,
}

/// Session context injected into dialogue prompts.
pub struct DialogueContext<'a> {
    /// Display name of the player's current location.
    pub location: &'a str,
    /// Evidence collected so far, in discovery order.
    pub evidence: &'a [Clue],
    /// The targeted NPC's memory for this session.
    pub memory: &'a NpcMemory,
}

/// Produces NPC replies for the engine.
pub struct Responder {
    strategy: Strategy,
    timeout: Duration,
}

impl Responder {
    /// A responder using the live strategy.
    pub fn live(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            strategy: Strategy::Live(generator),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A responder using only the mock strategy.
    pub fn mock() -> Self {
        Self {
            strategy: Strategy::Mock,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound each live generation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the live strategy is configured.
    pub fn is_live(&self) -> bool {
        matches!(self.strategy, Strategy::Live(_))
    }

    /// Produce a reply from the targeted NPC.
    ///
    /// Infallible by design: any live-strategy failure is logged and
    /// answered by the mock strategy instead.
    pub async fn respond(&self, npc: &Npc, query: &str, ctx: &DialogueContext<'_>) -> String {
        let generator = match &self.strategy {
            Strategy::Mock => return mock_reply(npc, query),
            Strategy::Live(generator) => generator,
        };

        let prompt = build_prompt(npc, query, ctx);
        let result =
            tokio::time::timeout(self.timeout, generator.generate(SYSTEM_INSTRUCTION, &prompt))
                .await
                .unwrap_or(Err(GenerateError::Timeout));

        match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(npc = %npc.id, "live generation returned blank text, using mock reply");
                mock_reply(npc, query)
            }
            Err(e) => {
                warn!(npc = %npc.id, error = %e, "live generation failed, using mock reply");
                mock_reply(npc, query)
            }
        }
    }
}

/// Construct the user prompt: persona, situation, evidence, bounded
/// memory slice, then the player's line.
fn build_prompt(npc: &Npc, query: &str, ctx: &DialogueContext<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str("--- CURRENT CONTEXT ---\n");
    prompt.push_str(&format!("NPC NAME: {}\n", npc.display));
    prompt.push_str(&format!("NPC PERSONA: {}\n", npc.persona));
    prompt.push_str(&format!("PLAYER LOCATION: {}\n", ctx.location));

    prompt.push_str("EVIDENCE COLLECTED:\n");
    if ctx.evidence.is_empty() {
        prompt.push_str("None.\n");
    } else {
        for clue in ctx.evidence {
            prompt.push_str(&format!("- {}\n", clue.description));
        }
    }

    let recent = ctx.memory.recent(PROMPT_MEMORY_SLICE);
    if !recent.is_empty() {
        prompt.push_str("--- PRIOR EXCHANGES WITH THIS PLAYER ---\n");
        for exchange in recent {
            prompt.push_str(&format!("PLAYER: {}\n", exchange.question));
            prompt.push_str(&format!("{}: {}\n", npc.display, exchange.reply));
        }
    }

    prompt.push_str("--- PLAYER ACTION ---\n");
    prompt.push_str(&format!("PLAYER: {query}\n"));
    prompt.push_str("NPC REPLY:");

    prompt
}
