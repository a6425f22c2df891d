//! File blocks proposed by the assistant and their application to disk.
//!
//! The assistant is instructed to emit every file it wants to create or
//! replace as a fenced block tagged `file:<path>`. `parser` extracts those
//! blocks from the raw reply; `apply` writes them into the active workspace
//! with per-file results.

mod apply;
mod parser;

pub use apply::{summarize_results, ApplyPipeline, ApplyResult};
pub use parser::{parse_file_blocks, ParsedFileBlock};
