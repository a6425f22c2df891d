//! Hierarchical listing of the workspace for the file explorer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::WorkspaceError;

/// Entry names that are never listed or walked into: version-control
/// metadata, dependency caches and build output.
pub const IGNORED_ENTRIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "dist",
    ".next",
    ".cache",
    ".idea",
    ".DS_Store",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    /// Workspace-relative, always `/`-separated.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

#[derive(Debug, Clone)]
pub struct FileTreeBuilder {
    ignored: Vec<String>,
}

impl Default for FileTreeBuilder {
    fn default() -> Self {
        Self {
            ignored: IGNORED_ENTRIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FileTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add names on top of the default ignore set.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == name)
    }

    /// Materialize the full tree below `root`, directories first and then
    /// files, each group sorted by name.
    pub fn build(&self, root: &Path) -> Result<Vec<FileNode>, WorkspaceError> {
        ensure_directory(root)?;
        self.walk(root, root)
            .map_err(|e| WorkspaceError::from_io(root, e))
    }

    /// True when `root` has no entries left after the ignore set is applied.
    pub fn is_empty(&self, root: &Path) -> Result<bool, WorkspaceError> {
        ensure_directory(root)?;
        let read_dir = std::fs::read_dir(root).map_err(|e| WorkspaceError::from_io(root, e))?;
        for entry in read_dir.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.is_ignored(&name) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn walk(&self, root: &Path, dir: &Path) -> std::io::Result<Vec<FileNode>> {
        let mut entries: Vec<(bool, String, std::path::PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_ignored(&name) {
                continue;
            }
            // Symlinks are listed as files and never followed.
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push((is_dir, name, entry.path()));
        }
        entries.sort_by(|(a_dir, a_name, _), (b_dir, b_name, _)| {
            b_dir.cmp(a_dir).then_with(|| a_name.cmp(b_name))
        });

        let mut nodes = Vec::with_capacity(entries.len());
        for (is_dir, name, path) in entries {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");

            if is_dir {
                let children = match self.walk(root, &path) {
                    Ok(children) => children,
                    Err(e) => {
                        tracing::warn!("skipping unreadable directory {rel}: {e}");
                        Vec::new()
                    }
                };
                nodes.push(FileNode {
                    name,
                    path: rel,
                    kind: NodeKind::Directory,
                    extension: None,
                    children: Some(children),
                });
            } else {
                let extension = Path::new(&name)
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .filter(|ext| !ext.is_empty());
                nodes.push(FileNode {
                    name,
                    path: rel,
                    kind: NodeKind::File,
                    extension,
                    children: None,
                });
            }
        }

        Ok(nodes)
    }
}

fn ensure_directory(root: &Path) -> Result<(), WorkspaceError> {
    let metadata = std::fs::metadata(root).map_err(|e| WorkspaceError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(WorkspaceError::Io {
            path: root.to_string_lossy().replace('\\', "/"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }
    Ok(())
}

pub fn build_tree(root: &Path) -> Result<Vec<FileNode>, WorkspaceError> {
    FileTreeBuilder::default().build(root)
}

pub fn is_empty_workspace(root: &Path) -> Result<bool, WorkspaceError> {
    FileTreeBuilder::default().is_empty(root)
}
