//! Append-only audit trail kept in `history.md` at the workspace root.
//!
//! Every logged action becomes a Markdown section:
//!
//! ```text
//! ## 2025-01-01T12:00:00.000Z
//! **Action**: Apply Changes
//! **Files Modified**:
//! - src/main.rs
//! **Summary**: Applied 1/1 changes
//! ---
//! ```
//!
//! Logging never fails the operation it describes. Appends to the same root
//! are serialized through one writer lock per root, so concurrent loggers
//! cannot drop each other's entries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::workspace::{WorkspaceError, WorkspaceStore, HISTORY_FILE_NAME};

pub const HISTORY_HEADER: &str =
    "# Project History\n\nThis file tracks all AI-assisted changes made to this project.\n\n---\n";

/// Optional fields attached to a logged action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDetails {
    pub request: Option<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub files_created: Vec<String>,
    pub summary: Option<String>,
}

impl HistoryDetails {
    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    pub fn with_files_modified(mut self, files: Vec<String>) -> Self {
        self.files_modified = files;
        self
    }

    pub fn with_files_created(mut self, files: Vec<String>) -> Self {
        self.files_created = files;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: HistoryDetails,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, details: HistoryDetails) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            details,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut entry = format!(
            "\n## {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        entry.push_str(&format!("**Action**: {}\n", self.action));

        if let Some(request) = self.details.request.as_deref().filter(|r| !r.is_empty()) {
            entry.push_str(&format!("**Request**: {request}\n"));
        }
        if !self.details.files_modified.is_empty() {
            entry.push_str("**Files Modified**:\n");
            for file in &self.details.files_modified {
                entry.push_str(&format!("- {file}\n"));
            }
        }
        if !self.details.files_created.is_empty() {
            entry.push_str("**Files Created**:\n");
            for file in &self.details.files_created {
                entry.push_str(&format!("- {file}\n"));
            }
        }
        if let Some(summary) = self.details.summary.as_deref().filter(|s| !s.is_empty()) {
            entry.push_str(&format!("**Summary**: {summary}\n"));
        }
        entry.push_str("---\n");
        entry
    }
}

#[derive(Clone, Default)]
pub struct HistoryLog {
    writers: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action` in the active workspace's history.
    ///
    /// A no-op without a workspace. Write failures are logged and swallowed;
    /// the returned flag only tells whether an entry was written.
    pub fn log_action(
        &self,
        workspace: &WorkspaceStore,
        action: &str,
        details: HistoryDetails,
    ) -> bool {
        let Some(root) = workspace.get() else {
            tracing::debug!("no workspace active, skipping history entry '{action}'");
            return false;
        };

        let entry = HistoryEntry::new(action, details);
        match self.append(&root, &entry) {
            Ok(()) => {
                tracing::info!("logged action: {action}");
                true
            }
            Err(e) => {
                tracing::warn!("failed to log action '{action}': {e}");
                false
            }
        }
    }

    /// Raw history text, or `None` when no workspace is active or nothing has
    /// been logged yet.
    pub fn read(&self, workspace: &WorkspaceStore) -> Result<Option<String>, WorkspaceError> {
        let Some(path) = workspace.history_path() else {
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkspaceError::from_io(Path::new(HISTORY_FILE_NAME), e)),
        }
    }

    pub fn append(&self, root: &Path, entry: &HistoryEntry) -> std::io::Result<()> {
        let lock = self
            .writers
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = root.join(HISTORY_FILE_NAME);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut text = String::new();
        if file.metadata()?.len() == 0 {
            text.push_str(HISTORY_HEADER);
        }
        text.push_str(&entry.to_markdown());
        file.write_all(text.as_bytes())?;
        file.flush()
    }
}
