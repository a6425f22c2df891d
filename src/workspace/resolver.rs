use std::path::{Component, Path, PathBuf};

use super::WorkspaceError;

/// Normalize a client-supplied path into a relative path that stays under the
/// workspace root.
///
/// Both `/` and `\` separate segments. `.` segments are dropped and `..` pops
/// the previous segment; popping past the root, or passing an absolute path,
/// is rejected.
pub fn normalize_relative(raw: &str) -> Result<PathBuf, WorkspaceError> {
    if raw.trim().is_empty() {
        return Err(WorkspaceError::EmptyPath);
    }

    let as_path = Path::new(raw);
    let has_prefix = as_path
        .components()
        .any(|c| matches!(c, Component::Prefix(_)));
    if as_path.is_absolute()
        || as_path.has_root()
        || has_prefix
        || raw.starts_with(['/', '\\'])
        || has_drive_root(raw)
    {
        return Err(WorkspaceError::OutsideWorkspace(raw.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(WorkspaceError::OutsideWorkspace(raw.to_string()));
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(WorkspaceError::EmptyPath);
    }

    Ok(segments.iter().collect())
}

/// `C:`, `C:/...` or `C:\...`. A bare `a:notes.txt` is a legal Unix file
/// name; on Windows `Component::Prefix` rejects it.
fn has_drive_root(raw: &str) -> bool {
    match raw.as_bytes() {
        [drive, b':'] => drive.is_ascii_alphabetic(),
        [drive, b':', sep, ..] => drive.is_ascii_alphabetic() && matches!(sep, b'/' | b'\\'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_relative_paths_pass_through() {
        assert_eq!(normalize_relative("a.txt").unwrap(), PathBuf::from("a.txt"));
        assert_eq!(
            normalize_relative("src/components/App.jsx").unwrap(),
            PathBuf::from("src/components/App.jsx")
        );
    }

    #[test]
    fn dot_segments_and_backslashes_are_normalized() {
        assert_eq!(
            normalize_relative("./src//lib\\mod.rs").unwrap(),
            PathBuf::from("src/lib/mod.rs")
        );
        assert_eq!(
            normalize_relative("a/b/../c").unwrap(),
            PathBuf::from("a/c")
        );
    }

    #[test]
    fn escaping_paths_are_rejected() {
        for raw in [
            "../x",
            "a/../../x",
            "/etc/passwd",
            "\\server\\share",
            "C:\\Windows\\win.ini",
            "c:/tmp/x",
            "D:",
        ] {
            assert!(
                matches!(normalize_relative(raw), Err(WorkspaceError::OutsideWorkspace(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn colon_in_a_unix_file_name_is_not_a_drive() {
        assert_eq!(
            normalize_relative("a:notes.txt").unwrap(),
            PathBuf::from("a:notes.txt")
        );
        assert_eq!(
            normalize_relative("docs/b:c.md").unwrap(),
            PathBuf::from("docs/b:c.md")
        );
    }

    #[test]
    fn empty_paths_are_rejected() {
        for raw in ["", "   ", ".", "a/.."] {
            assert!(
                matches!(normalize_relative(raw), Err(WorkspaceError::EmptyPath)),
                "{raw:?} should be empty"
            );
        }
    }
}
