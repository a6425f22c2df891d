use serde::{Deserialize, Serialize};

use crate::workspace::{WorkspaceError, WorkspaceStore};

use super::ParsedFileBlock;

/// Outcome of one attempted write. A batch yields one result per input block,
/// in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub path: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyResult {
    fn applied(path: &str) -> Self {
        Self {
            path: path.to_string(),
            success: true,
            error: None,
        }
    }

    fn failed(path: &str, error: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Writes file blocks into the active workspace one at a time.
///
/// There is no rollback: a failing block is recorded and the batch moves on.
pub struct ApplyPipeline<'a> {
    workspace: &'a WorkspaceStore,
}

impl<'a> ApplyPipeline<'a> {
    pub fn new(workspace: &'a WorkspaceStore) -> Self {
        Self { workspace }
    }

    pub fn apply(&self, blocks: &[ParsedFileBlock]) -> Result<Vec<ApplyResult>, WorkspaceError> {
        self.workspace.require()?;

        let mut results = Vec::with_capacity(blocks.len());
        for block in blocks {
            let result = match self.workspace.write_file(&block.path, &block.content) {
                Ok(full) => {
                    tracing::debug!("applied {} ({} bytes)", full.display(), block.content.len());
                    ApplyResult::applied(&block.path)
                }
                Err(e) => {
                    tracing::warn!("failed to apply {}: {e}", block.path);
                    ApplyResult::failed(&block.path, e)
                }
            };
            results.push(result);
        }

        Ok(results)
    }
}

/// `"Applied k/n changes"` for the history log.
pub fn summarize_results(results: &[ApplyResult]) -> String {
    let succeeded = results.iter().filter(|r| r.success).count();
    format!("Applied {}/{} changes", succeeded, results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(path: &str, content: &str) -> ParsedFileBlock {
        ParsedFileBlock {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    fn store_at(dir: &tempfile::TempDir) -> WorkspaceStore {
        let store = WorkspaceStore::new();
        store.set(dir.path());
        store
    }

    #[test]
    fn applies_every_block_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);

        let results = ApplyPipeline::new(&store)
            .apply(&[block("a.txt", "hello"), block("b/c.py", "print(1)")])
            .unwrap();

        assert_eq!(
            results,
            vec![
                ApplyResult::applied("a.txt"),
                ApplyResult::applied("b/c.py"),
            ]
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("b/c.py")).unwrap(), "print(1)");
    }

    #[test]
    fn one_bad_path_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        std::fs::write(dir.path().join("blocker"), "i am a file").unwrap();

        let results = ApplyPipeline::new(&store)
            .apply(&[
                block("first.txt", "1"),
                block("blocker/child.txt", "cannot nest under a file"),
                block("bad\0name.txt", "nul byte"),
                block("../outside.txt", "escape"),
                block("last.txt", "4"),
            ])
            .unwrap();

        assert_eq!(results.len(), 5);
        let flags: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(flags, vec![true, false, false, false, true]);
        assert!(results[1].error.is_some());
        assert!(results[3].error.as_deref().unwrap().contains("escapes workspace"));
        assert_eq!(std::fs::read_to_string(dir.path().join("last.txt")).unwrap(), "4");
        assert_eq!(summarize_results(&results), "Applied 2/5 changes");
    }

    #[test]
    fn history_block_fails_alone_and_leaves_log_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        let log_path = dir.path().join("history.md");
        std::fs::write(&log_path, "# Project History\n\n## earlier entry\n---\n").unwrap();

        let results = ApplyPipeline::new(&store)
            .apply(&[block("history.md", "wiped\n"), block("notes.txt", "kept")])
            .unwrap();

        let flags: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(flags, vec![false, true]);
        assert!(results[0].error.as_deref().unwrap().contains("history log"));
        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "# Project History\n\n## earlier entry\n---\n"
        );
        assert_eq!(summarize_results(&results), "Applied 1/2 changes");
    }

    #[test]
    fn duplicate_paths_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);

        let results = ApplyPipeline::new(&store)
            .apply(&[block("dup.txt", "first"), block("dup.txt", "second")])
            .unwrap();

        assert!(results.iter().all(|r| r.success));
        assert_eq!(std::fs::read_to_string(dir.path().join("dup.txt")).unwrap(), "second");
    }

    #[test]
    fn empty_batch_yields_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        let results = ApplyPipeline::new(&store).apply(&[]).unwrap();
        assert!(results.is_empty());
        assert_eq!(summarize_results(&results), "Applied 0/0 changes");
    }

    #[test]
    fn missing_workspace_aborts() {
        let store = WorkspaceStore::new();
        assert!(matches!(
            ApplyPipeline::new(&store).apply(&[block("a.txt", "x")]),
            Err(WorkspaceError::NoWorkspace)
        ));
    }

    #[test]
    fn failed_results_serialize_error_and_successes_omit_it() {
        let json = serde_json::to_value(vec![
            ApplyResult::applied("ok.txt"),
            ApplyResult::failed("bad.txt", "boom"),
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"path": "ok.txt", "success": true},
                {"path": "bad.txt", "success": false, "error": "boom"}
            ])
        );
    }
}
