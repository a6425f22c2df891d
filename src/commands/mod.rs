//! Transport-agnostic entry points.
//!
//! Every command takes the caller's `AppState` and returns a serializable
//! view or an `AppError`. The CLI binary maps them onto subcommands; an HTTP
//! or IPC layer would do the same.

pub mod assistant;
pub mod changes;
pub mod workspace;
