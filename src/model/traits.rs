//! Traits for model clients.

use crate::model::types::{CompletionRequest, ModelError};

/// An opaque text-completion service: messages in, reply text out.
/// Implemented by `OpenAiCompatClient` and by scripted fakes in tests.
#[allow(async_fn_in_trait)]
pub trait CompletionOracle: Send + Sync {
    fn model_id(&self) -> String;
    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError>;
}
