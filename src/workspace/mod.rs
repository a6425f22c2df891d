//! Active workspace state and path resolution.
//!
//! A `WorkspaceStore` holds the single project root that every file operation
//! resolves against. It is an explicit handle owned by the caller (one per
//! connected client) rather than process-global state; clones share the same
//! root.
//!
//! # Sub-modules
//!
//! - `resolver`: lexical sandboxing of client-supplied relative paths
//! - `tree`: hierarchical listing of the workspace
//! - `context`: bounded codebase excerpts for assistant prompts

mod context;
mod resolver;
mod tree;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::policy::{PathPolicy, PolicyDecision};

pub use context::{collect_codebase_context, excerpt, ContextFile};
pub use resolver::normalize_relative;
pub use tree::{
    build_tree, is_empty_workspace, FileNode, FileTreeBuilder, NodeKind, IGNORED_ENTRIES,
};

/// Name of the reserved audit file at the workspace root.
pub const HISTORY_FILE_NAME: &str = "history.md";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no workspace selected")]
    NoWorkspace,
    #[error("path is required")]
    EmptyPath,
    #[error("path escapes workspace: {0}")]
    OutsideWorkspace(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0} is managed by the history log")]
    Reserved(String),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    /// Classify an I/O error raised while touching `path`.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        let display = path.to_string_lossy().replace('\\', "/");
        if source.kind() == std::io::ErrorKind::NotFound {
            WorkspaceError::NotFound(display)
        } else {
            WorkspaceError::Io {
                path: display,
                source,
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkspaceStore {
    root: Arc<RwLock<Option<PathBuf>>>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active root. No existence check is made here; callers that
    /// care check the directory afterwards.
    pub fn set(&self, root: impl Into<PathBuf>) {
        let root = root.into();
        match self.root.write() {
            Ok(mut guard) => *guard = Some(root),
            Err(poisoned) => *poisoned.into_inner() = Some(root),
        }
    }

    pub fn clear(&self) {
        match self.root.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn get(&self) -> Option<PathBuf> {
        match self.root.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn require(&self) -> Result<PathBuf, WorkspaceError> {
        self.get().ok_or(WorkspaceError::NoWorkspace)
    }

    /// Resolve a client-supplied relative path against the active root.
    ///
    /// The path is normalized lexically; absolute paths and `..` segments that
    /// climb above the root are rejected. Existing ancestors are then checked
    /// against the canonical root so a symlinked directory cannot redirect a
    /// write outside the workspace.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, WorkspaceError> {
        let root = self.require()?;
        let normalized = normalize_relative(relative)?;
        let full = root.join(&normalized);

        match PathPolicy::new(root).evaluate_path(&full) {
            PolicyDecision::Allow => Ok(full),
            PolicyDecision::Deny(reason) => {
                tracing::warn!("rejected workspace path {relative}: {reason}");
                Err(WorkspaceError::OutsideWorkspace(relative.to_string()))
            }
        }
    }

    /// Like `resolve`, but refuses the history file at the root: it only
    /// ever grows through `HistoryLog`.
    pub fn resolve_mutable(&self, relative: &str) -> Result<PathBuf, WorkspaceError> {
        let root = self.require()?;
        if is_history_file(&normalize_relative(relative)?) {
            tracing::warn!("rejected change to reserved {relative} under {}", root.display());
            return Err(WorkspaceError::Reserved(relative.to_string()));
        }
        self.resolve(relative)
    }

    pub fn read_file(&self, relative: &str) -> Result<String, WorkspaceError> {
        let full = self.resolve(relative)?;
        std::fs::read_to_string(&full)
            .map_err(|e| WorkspaceError::from_io(Path::new(relative), e))
    }

    /// Write `content`, creating intermediate directories and replacing any
    /// existing file.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf, WorkspaceError> {
        let full = self.resolve_mutable(relative)?;
        if let Some(parent) = full.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| WorkspaceError::from_io(Path::new(relative), e))?;
            }
        }
        std::fs::write(&full, content)
            .map_err(|e| WorkspaceError::from_io(Path::new(relative), e))?;
        Ok(full)
    }

    pub fn delete_file(&self, relative: &str) -> Result<(), WorkspaceError> {
        let full = self.resolve_mutable(relative)?;
        std::fs::remove_file(&full).map_err(|e| WorkspaceError::from_io(Path::new(relative), e))
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        self.get().map(|root| root.join(HISTORY_FILE_NAME))
    }
}

// Case-insensitive so `History.md` cannot alias the log on macOS or Windows.
fn is_history_file(normalized: &Path) -> bool {
    let mut components = normalized.components();
    match (components.next(), components.next()) {
        (Some(only), None) => only
            .as_os_str()
            .to_string_lossy()
            .eq_ignore_ascii_case(HISTORY_FILE_NAME),
        _ => false,
    }
}
