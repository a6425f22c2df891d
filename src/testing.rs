//! Test doubles shared by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::model::{CompletionOracle, CompletionRequest, ModelError};
use crate::AppState;

/// Oracle that replays scripted replies in order and records every request.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        Self::new().then_reply(reply)
    }

    pub fn then_reply(self, reply: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn then_fail(self, error: ModelError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("oracle was never called")
    }
}

impl CompletionOracle for ScriptedOracle {
    fn model_id(&self) -> String {
        "scripted".to_string()
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(req);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("no scripted reply left".to_string())))
    }
}

/// App state whose workspace is already opened at `dir`.
pub fn state_with_workspace(dir: &tempfile::TempDir) -> AppState {
    let state = AppState::new(AppConfig::default());
    state.workspace.set(dir.path());
    state
}
