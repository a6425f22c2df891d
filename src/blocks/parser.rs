//! Scanner for file blocks in free-form assistant replies.
//!
//! Grammar:
//! ```text
//! Block   := "```file:" Path LF Content "```"
//! Path    := one or more non-LF characters (trimmed)
//! Content := any text, shortest match up to the first "```"
//! ```
//!
//! The scanner is a three-state machine (`SeekingOpen`, `ReadingPath`,
//! `ReadingContent`). The first fence after the content starts always closes
//! the block, so a fence nested inside file content ends it early. A single
//! line break right before the closing fence belongs to the fence line and is
//! not part of the content. Blocks without a closing fence are dropped.

use serde::{Deserialize, Serialize};

const OPEN_MARKER: &str = "```file:";
const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFileBlock {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState<'a> {
    SeekingOpen,
    ReadingPath { marker: usize, path_start: usize },
    ReadingContent { path: &'a str, content_start: usize },
}

/// Extract every well-formed file block from `text`, in order of appearance.
pub fn parse_file_blocks(text: &str) -> Vec<ParsedFileBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0usize;
    let mut state = ScanState::SeekingOpen;

    loop {
        state = match state {
            ScanState::SeekingOpen => match text[cursor..].find(OPEN_MARKER) {
                Some(rel) => {
                    let marker = cursor + rel;
                    ScanState::ReadingPath {
                        marker,
                        path_start: marker + OPEN_MARKER.len(),
                    }
                }
                None => break,
            },
            ScanState::ReadingPath { marker, path_start } => match text[path_start..].find('\n') {
                // The path needs at least one character; retry past this marker.
                Some(0) => {
                    cursor = marker + 1;
                    ScanState::SeekingOpen
                }
                Some(rel) => ScanState::ReadingContent {
                    path: text[path_start..path_start + rel].trim(),
                    content_start: path_start + rel + 1,
                },
                None => break,
            },
            ScanState::ReadingContent {
                path,
                content_start,
            } => match text[content_start..].find(FENCE) {
                Some(rel) => {
                    let raw = &text[content_start..content_start + rel];
                    blocks.push(ParsedFileBlock {
                        path: path.to_string(),
                        content: strip_fence_line_break(raw).to_string(),
                    });
                    cursor = content_start + rel + FENCE.len();
                    ScanState::SeekingOpen
                }
                None => break,
            },
        };
    }

    blocks
}

fn strip_fence_line_break(raw: &str) -> &str {
    raw.strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw)
}
