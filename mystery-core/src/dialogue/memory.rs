//! Per-NPC conversation memory.
//!
//! Each NPC remembers a bounded FIFO of prior exchanges within a
//! session, used to enrich later prompts to the same NPC while keeping
//! prompt size small.

use serde::{Deserialize, Serialize};

/// Maximum number of exchanges kept per NPC.
const MAX_EXCHANGES: usize = 8;

/// One prior question/reply pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub reply: String,
}

/// Bounded history of a session's exchanges with one NPC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcMemory {
    exchanges: Vec<Exchange>,
}

impl NpcMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exchange, dropping the oldest once full.
    pub fn add_exchange(&mut self, question: impl Into<String>, reply: impl Into<String>) {
        self.exchanges.push(Exchange {
            question: question.into(),
            reply: reply.into(),
        });
        while self.exchanges.len() > MAX_EXCHANGES {
            self.exchanges.remove(0);
        }
    }

    /// All remembered exchanges, oldest first.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// The most recent `count` exchanges, oldest first.
    pub fn recent(&self, count: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(count);
        &self.exchanges[start..]
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
