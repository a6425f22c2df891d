//! Assistant flows layered over the workspace and a completion oracle.

pub mod assistant;

pub use assistant::{chat, codebase_context, debug, edit_code, generate_project};

use crate::bus::topics;
use crate::history::HistoryDetails;
use crate::AppState;

/// Append a history entry for the active workspace and announce it on the
/// bus. Never fails; see `HistoryLog::log_action`.
pub(crate) fn record_action(state: &AppState, action: &str, details: HistoryDetails) {
    if state.history.log_action(&state.workspace, action, details) {
        state.bus.emit(
            topics::HISTORY_APPENDED,
            state.workspace_label(),
            serde_json::json!({ "action": action }),
        );
    }
}
