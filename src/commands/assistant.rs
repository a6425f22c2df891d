use crate::model::CompletionOracle;
use crate::runtime;
use crate::{AppError, AppState, AssistantReplyView, ChatReplyView};

pub async fn chat<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    message: &str,
    include_codebase: Option<bool>,
) -> Result<ChatReplyView, AppError> {
    let response =
        runtime::chat(state, oracle, message, include_codebase.unwrap_or(true)).await?;
    Ok(ChatReplyView { response })
}

pub async fn generate_project<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    description: &str,
) -> Result<AssistantReplyView, AppError> {
    runtime::generate_project(state, oracle, description).await
}

pub async fn debug<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    error_message: &str,
    file_path: Option<&str>,
) -> Result<AssistantReplyView, AppError> {
    runtime::debug(state, oracle, error_message, file_path).await
}

pub async fn edit_code<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    instruction: &str,
    target_file: Option<&str>,
) -> Result<AssistantReplyView, AppError> {
    runtime::edit_code(state, oracle, instruction, target_file).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::changes::apply_files;
    use crate::testing::{state_with_workspace, ScriptedOracle};

    #[tokio::test]
    async fn chat_defaults_to_including_codebase() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_workspace(&dir);
        let oracle = ScriptedOracle::replying("ok");

        let view = chat(&state, &oracle, "hello", None).await.unwrap();
        assert_eq!(view.response, "ok");
        assert_eq!(oracle.last_request().messages.len(), 4);
    }

    #[tokio::test]
    async fn proposed_edit_can_be_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greet.py"), "print('hi')\n").unwrap();
        let state = state_with_workspace(&dir);
        let oracle = ScriptedOracle::replying(
            "Updated greeting.\n```file:greet.py\nprint('hello')\n```\n",
        );

        let reply = edit_code(&state, &oracle, "say hello", Some("greet.py"))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("greet.py")).unwrap(),
            "print('hi')\n"
        );

        let applied = apply_files(&state, &reply.files).unwrap();
        assert!(applied.results[0].success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("greet.py")).unwrap(),
            "print('hello')"
        );

        let history = state.history.read(&state.workspace).unwrap().unwrap();
        let edit = history.find("**Action**: Code Edit").unwrap();
        let apply = history.find("**Action**: Apply Changes").unwrap();
        assert!(edit < apply);
    }
}
