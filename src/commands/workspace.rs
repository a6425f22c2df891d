use std::path::PathBuf;

use crate::bus::topics;
use crate::workspace::{build_tree, is_empty_workspace, FileNode, WorkspaceError};
use crate::{AppError, AppState, FileAckView, FileContentView, HistoryView, WorkspaceOpenView};

pub fn open_workspace(state: &AppState, path: &str) -> Result<WorkspaceOpenView, AppError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(AppError::MissingArgument("path"));
    }
    // One spelling per directory, so history writers for a root share a lock.
    let root: PathBuf = std::path::absolute(path)
        .map_err(|e| AppError::Io(format!("{path}: {e}")))?
        .components()
        .collect();

    let is_empty = match is_empty_workspace(&root) {
        Ok(empty) => empty,
        Err(WorkspaceError::NotFound(_)) => {
            tracing::warn!(
                "workspace root {} does not exist yet, treating as empty",
                root.display()
            );
            true
        }
        Err(e) => return Err(e.into()),
    };

    state.workspace.set(root.clone());
    tracing::info!("workspace opened: {} (empty: {is_empty})", root.display());

    let workspace_root = root.to_string_lossy().to_string();
    state.bus.emit(
        topics::WORKSPACE_OPENED,
        Some(workspace_root.clone()),
        serde_json::json!({ "isEmpty": is_empty }),
    );
    Ok(WorkspaceOpenView {
        workspace_root,
        is_empty,
    })
}

pub fn close_workspace(state: &AppState) {
    let previous = state.workspace_label();
    state.workspace.clear();
    if previous.is_some() {
        tracing::info!("workspace closed");
        state
            .bus
            .emit(topics::WORKSPACE_CLOSED, previous, serde_json::Value::Null);
    }
}

pub fn list_files(state: &AppState) -> Result<Vec<FileNode>, AppError> {
    let root = state.workspace.require()?;
    Ok(build_tree(&root)?)
}

pub fn read_file(state: &AppState, path: &str) -> Result<FileContentView, AppError> {
    let content = state.workspace.read_file(path)?;
    Ok(FileContentView {
        path: path.to_string(),
        content,
    })
}

/// Create or overwrite a file. Missing content writes an empty file.
pub fn write_file(
    state: &AppState,
    path: &str,
    content: Option<&str>,
) -> Result<FileAckView, AppError> {
    let content = content.unwrap_or_default();
    state.workspace.write_file(path, content)?;
    tracing::debug!("wrote {path} ({} bytes)", content.len());

    state.bus.emit(
        topics::FILE_WRITTEN,
        state.workspace_label(),
        serde_json::json!({ "path": path, "bytes": content.len() }),
    );
    Ok(FileAckView {
        success: true,
        path: path.to_string(),
    })
}

pub fn delete_file(state: &AppState, path: &str) -> Result<FileAckView, AppError> {
    state.workspace.delete_file(path)?;
    tracing::debug!("deleted {path}");

    state.bus.emit(
        topics::FILE_DELETED,
        state.workspace_label(),
        serde_json::json!({ "path": path }),
    );
    Ok(FileAckView {
        success: true,
        path: path.to_string(),
    })
}

pub fn get_history(state: &AppState) -> Result<HistoryView, AppError> {
    let history = state.history.read(&state.workspace)?;
    Ok(HistoryView { history })
}
