// tests/pipeline_integration.rs
//! End-to-end: open a workspace, ask the model for files, apply them, read
//! them back and check the audit trail.

mod common;

use codeforge_lib::bus::topics;
use codeforge_lib::commands::{assistant, changes, workspace};
use codeforge_lib::history::HISTORY_HEADER;
use codeforge_lib::workspace::NodeKind;
use codeforge_lib::AppError;

use common::{client_for, fresh_state, mock_chat_reply};
use httpmock::MockServer;
use pretty_assertions::assert_eq;

const GENERATED: &str = "Here is your project.\n\
```file:README.md\n# Todo\n```\n\
```file:src/app.js\nconsole.log('todo');\n```\n\
Run it with node.";

#[tokio::test]
async fn generate_apply_and_audit() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let mock = mock_chat_reply(&server, GENERATED);
    let oracle = client_for(&server);
    let state = fresh_state();
    let mut events = state.bus.subscribe();

    let opened = workspace::open_workspace(&state, &dir.path().to_string_lossy()).unwrap();
    assert!(opened.is_empty);

    let reply = assistant::generate_project(&state, &oracle, "a todo app")
        .await
        .unwrap();
    mock.assert();
    assert_eq!(reply.files.len(), 2);

    let applied = changes::apply_files(&state, &reply.files).unwrap();
    assert!(applied.results.iter().all(|r| r.success));

    assert_eq!(
        workspace::read_file(&state, "src/app.js").unwrap().content,
        "console.log('todo');"
    );

    let tree = workspace::list_files(&state).unwrap();
    let top: Vec<(&str, NodeKind)> = tree.iter().map(|n| (n.name.as_str(), n.kind)).collect();
    assert_eq!(
        top,
        vec![
            ("src", NodeKind::Directory),
            ("README.md", NodeKind::File),
            ("history.md", NodeKind::File),
        ]
    );

    let history = workspace::get_history(&state).unwrap().history.unwrap();
    assert!(history.starts_with(HISTORY_HEADER));
    let generation = history.find("**Action**: Project Generation").unwrap();
    let apply = history.find("**Action**: Apply Changes").unwrap();
    assert!(generation < apply);
    assert!(history.contains("**Summary**: Applied 2/2 changes"));

    let seen: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.event_type)
        .collect();
    assert_eq!(seen.first().map(String::as_str), Some(topics::WORKSPACE_OPENED));
    assert_eq!(seen.last().map(String::as_str), Some(topics::CHANGES_APPLIED));
}

#[tokio::test]
async fn oracle_auth_failure_surfaces_and_leaves_workspace_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/v1/chat/completions");
        then.status(401).body("invalid key");
    });
    let oracle = client_for(&server);
    let state = fresh_state();
    workspace::open_workspace(&state, &dir.path().to_string_lossy()).unwrap();

    let err = assistant::chat(&state, &oracle, "hello", Some(false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Oracle(_)));
    assert_eq!(workspace::get_history(&state).unwrap().history, None);
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn switching_workspaces_redirects_later_writes() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let state = fresh_state();

    workspace::open_workspace(&state, &first.path().to_string_lossy()).unwrap();
    workspace::write_file(&state, "a.txt", Some("one")).unwrap();

    workspace::open_workspace(&state, &second.path().to_string_lossy()).unwrap();
    workspace::write_file(&state, "a.txt", Some("two")).unwrap();

    assert_eq!(std::fs::read_to_string(first.path().join("a.txt")).unwrap(), "one");
    assert_eq!(std::fs::read_to_string(second.path().join("a.txt")).unwrap(), "two");

    workspace::close_workspace(&state);
    assert!(matches!(
        workspace::list_files(&state),
        Err(AppError::NoWorkspace)
    ));
}
