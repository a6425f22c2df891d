//! Model clients for the assistant.
//!
//! ## Structure
//!
//! - `types`: chat messages, completion requests, errors
//! - `traits`: the `CompletionOracle` abstraction
//! - `prompts`: system prompt and task prompt builders
//! - `providers/`: provider implementations

pub mod prompts;
pub mod providers;
pub mod traits;
pub mod types;

pub use providers::openai_compat::OpenAiCompatClient;
pub use traits::CompletionOracle;
pub use types::{ChatMessage, ChatRole, CompletionRequest, ModelError, StreamDelta};
