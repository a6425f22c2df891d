use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyDecision {
    Allow,
    Deny(String),
}

/// Decides whether an absolute candidate path really lives under the
/// workspace root once symlinks on disk are taken into account.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    workspace_root: PathBuf,
}

impl PathPolicy {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    pub fn evaluate_path(&self, candidate: &Path) -> PolicyDecision {
        let root = match self.workspace_root.canonicalize() {
            Ok(v) => v,
            // Root not created yet: nothing on disk can redirect the candidate.
            Err(_) => {
                return if candidate.starts_with(&self.workspace_root) {
                    PolicyDecision::Allow
                } else {
                    PolicyDecision::Deny(format!(
                        "path outside workspace: {}",
                        normalize_path_text(candidate.to_string_lossy().as_ref())
                    ))
                };
            }
        };

        // Walk up to the nearest entry that exists on disk (a dangling symlink
        // counts as existing) and check where it really points.
        let mut ancestor = candidate.to_path_buf();
        loop {
            if std::fs::symlink_metadata(&ancestor).is_ok() {
                return match ancestor.canonicalize() {
                    Ok(canonical) if canonical.starts_with(&root) => PolicyDecision::Allow,
                    Ok(canonical) => PolicyDecision::Deny(format!(
                        "path outside workspace: {}",
                        normalize_path_text(canonical.to_string_lossy().as_ref())
                    )),
                    Err(e) => PolicyDecision::Deny(format!(
                        "unresolvable path {}: {e}",
                        normalize_path_text(ancestor.to_string_lossy().as_ref())
                    )),
                };
            }
            if !ancestor.pop() {
                break;
            }
        }

        PolicyDecision::Deny(format!(
            "no existing ancestor for {}",
            normalize_path_text(candidate.to_string_lossy().as_ref())
        ))
    }
}

fn normalize_path_text(raw: &str) -> String {
    raw.replace("\\\\?\\", "")
}
