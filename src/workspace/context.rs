//! Bounded codebase excerpts handed to the assistant as prompt context.
//!
//! Uses `ignore` for .gitignore-aware walking on top of the tree builder's
//! ignore set. The history file and non-UTF-8 files are skipped.

use std::path::Path;

use ignore::WalkBuilder;
use serde::Serialize;

use super::tree::FileTreeBuilder;
use super::{WorkspaceError, HISTORY_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextFile {
    pub path: String,
    pub content: String,
}

/// Collect up to `max_files` files below `root` in path order, each cut to
/// `max_chars` characters.
pub fn collect_codebase_context(
    root: &Path,
    max_files: usize,
    max_chars: usize,
) -> Result<Vec<ContextFile>, WorkspaceError> {
    std::fs::metadata(root).map_err(|e| WorkspaceError::from_io(root, e))?;

    let filter = FileTreeBuilder::default();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .follow_links(false)
        .require_git(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry.depth() == 0 || !filter.is_ignored(&entry.file_name().to_string_lossy())
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        if files.len() >= max_files {
            break;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("context walk error: {e}");
                continue;
            }
        };
        if !entry.file_type().map_or(false, |ft| ft.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = relative.to_string_lossy().replace('\\', "/");
        if rel_str == HISTORY_FILE_NAME {
            continue;
        }

        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        let Ok(text) = String::from_utf8(bytes) else {
            continue;
        };

        files.push(ContextFile {
            path: rel_str,
            content: excerpt(&text, max_chars),
        });
    }

    Ok(files)
}

/// Shorten `text` to at most `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_files_in_path_order_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/b.rs", b"b");
        write(dir.path(), "src/a.rs", b"a");
        write(dir.path(), "README.md", b"readme");
        write(dir.path(), "history.md", b"# Project History");
        write(dir.path(), "node_modules/x/index.js", b"x");
        write(dir.path(), "logo.bin", &[0xff, 0xfe, 0x00]);

        let files = collect_codebase_context(dir.path(), 30, 3000).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn respects_gitignore_without_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", b"secret.env\n");
        write(dir.path(), "secret.env", b"KEY=1");
        write(dir.path(), "app.py", b"print(1)");

        let files = collect_codebase_context(dir.path(), 30, 3000).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec![".gitignore", "app.py"]);
    }

    #[test]
    fn limits_file_count_and_excerpt_length() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{i}.txt"), "ééééé".as_bytes());
        }

        let files = collect_codebase_context(dir.path(), 2, 3).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].content, "ééé");
    }

    #[test]
    fn excerpt_cuts_on_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 200), "short");
    }
}
