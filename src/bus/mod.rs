//! Change notifications for whoever renders the workspace.
//!
//! Commands publish an event after they touch the workspace (open, write,
//! delete, apply, history append). Listeners use them to rebuild the file
//! tree or refresh an open editor. Publishing never blocks and never fails the
//! command that emits.

mod event_bus;

pub use event_bus::{BusEvent, EventBus};

pub mod topics {
    pub const WORKSPACE_OPENED: &str = "workspace.opened";
    pub const WORKSPACE_CLOSED: &str = "workspace.closed";
    pub const FILE_WRITTEN: &str = "file.written";
    pub const FILE_DELETED: &str = "file.deleted";
    pub const CHANGES_APPLIED: &str = "changes.applied";
    pub const HISTORY_APPENDED: &str = "history.appended";
}
