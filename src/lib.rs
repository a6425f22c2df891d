//! Codeforge backend library.
//!
//! Lets an assistant work inside one project directory: list and edit files,
//! turn model replies into file changes, apply them with per-file results,
//! and keep an append-only `history.md` audit trail.
//!
//! # Architecture
//!
//! - `workspace`: active root, path resolution, tree listing, codebase context
//! - `policy`: symlink-aware containment check for resolved paths
//! - `blocks`: file-block parser and apply pipeline
//! - `history`: Markdown audit log with a per-root single writer
//! - `model`: completion oracle trait and the OpenAI-compatible client
//! - `runtime`: assistant flows (chat, generate, debug, edit)
//! - `commands`: transport-agnostic entry points
//! - `bus`: change notifications
//! - `config`: environment configuration

pub mod blocks;
pub mod bus;
pub mod commands;
pub mod config;
pub mod history;
pub mod model;
pub mod policy;
pub mod runtime;
pub mod workspace;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use blocks::{ApplyResult, ParsedFileBlock};
use bus::EventBus;
use config::AppConfig;
use history::HistoryLog;
use model::ModelError;
use workspace::{WorkspaceError, WorkspaceStore};

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no workspace selected")]
    NoWorkspace,
    #[error("{0} is required")]
    MissingArgument(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("path escapes workspace: {0}")]
    PathOutsideWorkspace(String),
    #[error("{0} is managed by the history log")]
    ReservedPath(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Oracle(#[from] ModelError),
}

impl From<WorkspaceError> for AppError {
    fn from(value: WorkspaceError) -> Self {
        match value {
            WorkspaceError::NoWorkspace => AppError::NoWorkspace,
            WorkspaceError::EmptyPath => AppError::MissingArgument("path"),
            WorkspaceError::OutsideWorkspace(path) => AppError::PathOutsideWorkspace(path),
            WorkspaceError::NotFound(path) => AppError::NotFound(path),
            WorkspaceError::Reserved(path) => AppError::ReservedPath(path),
            other @ WorkspaceError::Io { .. } => AppError::Io(other.to_string()),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Per-client context handed to every command.
pub struct AppState {
    pub workspace: WorkspaceStore,
    pub history: HistoryLog,
    pub bus: Arc<EventBus>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            workspace: WorkspaceStore::new(),
            history: HistoryLog::new(),
            bus: Arc::new(EventBus::new()),
            config,
        }
    }

    pub(crate) fn workspace_label(&self) -> Option<String> {
        self.workspace
            .get()
            .map(|root| root.to_string_lossy().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceOpenView {
    pub workspace_root: String,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContentView {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAckView {
    pub success: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResultsView {
    pub results: Vec<ApplyResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    pub history: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReplyView {
    pub response: String,
}

/// Reply text plus the file blocks proposed in it. Nothing is written until
/// the caller applies `files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReplyView {
    pub response: String,
    pub files: Vec<ParsedFileBlock>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber. Output goes to stderr so command
/// results on stdout stay machine-readable.
pub fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter).unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(config::DEFAULT_LOG_FILTER)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
