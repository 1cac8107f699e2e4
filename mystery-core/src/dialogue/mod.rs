//! NPC dialogue: prompt construction, generation strategies, and
//! per-NPC conversation memory.

mod memory;
mod mock;
mod responder;

pub use memory::{Exchange, NpcMemory};
pub use mock::mock_reply;
pub use responder::{
    DialogueContext, GeminiGenerator, GenerateError, Responder, Strategy, TextGenerator,
};
