//! Chat, project generation, debugging and editing.
//!
//! Each flow assembles a prompt around the workspace, asks the oracle for a
//! reply and records a history entry. Proposed file blocks are returned to
//! the caller; nothing is written to disk here.

use crate::blocks::{parse_file_blocks, ParsedFileBlock};
use crate::history::HistoryDetails;
use crate::model::prompts;
use crate::model::{ChatMessage, CompletionOracle, CompletionRequest, ModelError};
use crate::workspace::{collect_codebase_context, excerpt};
use crate::{AppError, AppState, AssistantReplyView};

use super::record_action;

const REQUEST_EXCERPT_CHARS: usize = 200;

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 8192;
const GENERATE_TEMPERATURE: f32 = 0.7;
const GENERATE_MAX_TOKENS: u32 = 16000;
const FIX_TEMPERATURE: f32 = 0.5;
const FIX_MAX_TOKENS: u32 = 8192;

/// Render the codebase context for prompts. Never fails: a missing workspace
/// or unreadable tree degrades to a placeholder line.
pub fn codebase_context(state: &AppState) -> String {
    let Some(root) = state.workspace.get() else {
        return prompts::UNREADABLE_CONTEXT.to_string();
    };
    match collect_codebase_context(
        &root,
        state.config.context_files,
        state.config.context_chars,
    ) {
        Ok(files) => {
            tracing::debug!("collected {} context files from {}", files.len(), root.display());
            prompts::render_codebase_context(&files)
        }
        Err(e) => {
            tracing::warn!("failed to collect codebase context: {e}");
            prompts::UNREADABLE_CONTEXT.to_string()
        }
    }
}

pub async fn chat<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    message: &str,
    include_codebase: bool,
) -> Result<String, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::MissingArgument("message"));
    }
    tracing::info!("chat request: {}", excerpt(message, 100));

    let mut messages = vec![ChatMessage::system(prompts::ide_system_prompt())];
    if include_codebase {
        let context = codebase_context(state);
        messages.push(ChatMessage::user(prompts::context_preamble(&context)));
        messages.push(ChatMessage::assistant(prompts::CONTEXT_ACKNOWLEDGEMENT));
    }
    messages.push(ChatMessage::user(message));

    let response = complete(
        oracle,
        CompletionRequest {
            messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        },
    )
    .await?;

    record_action(
        state,
        "AI Chat",
        HistoryDetails::default()
            .with_request(excerpt(message, REQUEST_EXCERPT_CHARS))
            .with_summary("AI conversation"),
    );
    Ok(response)
}

pub async fn generate_project<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    description: &str,
) -> Result<AssistantReplyView, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::MissingArgument("description"));
    }
    tracing::info!("generate project: {}", excerpt(description, 100));

    let response = complete(
        oracle,
        single_turn(
            prompts::project_generation_prompt(description),
            GENERATE_TEMPERATURE,
            GENERATE_MAX_TOKENS,
        ),
    )
    .await?;
    let files = parse_file_blocks(&response);

    record_action(
        state,
        "Project Generation",
        HistoryDetails::default()
            .with_request(description)
            .with_files_created(block_paths(&files))
            .with_summary(format!("Generated {} files for new project", files.len())),
    );
    Ok(AssistantReplyView { response, files })
}

pub async fn debug<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    error_message: &str,
    file: Option<&str>,
) -> Result<AssistantReplyView, AppError> {
    if error_message.trim().is_empty() {
        return Err(AppError::MissingArgument("error"));
    }
    tracing::info!("debug request");

    let context = codebase_context(state);
    let target = read_target(state, file);
    let prompt = prompts::debug_prompt(
        error_message,
        target.as_ref().map(|(p, c)| (p.as_str(), c.as_str())),
        &context,
    );

    let response = complete(oracle, single_turn(prompt, FIX_TEMPERATURE, FIX_MAX_TOKENS)).await?;
    let files = parse_file_blocks(&response);

    record_action(
        state,
        "Debug",
        HistoryDetails::default()
            .with_request(excerpt(error_message, REQUEST_EXCERPT_CHARS))
            .with_files_modified(block_paths(&files))
            .with_summary("Debugging and fix proposal"),
    );
    Ok(AssistantReplyView { response, files })
}

pub async fn edit_code<O: CompletionOracle>(
    state: &AppState,
    oracle: &O,
    instruction: &str,
    file: Option<&str>,
) -> Result<AssistantReplyView, AppError> {
    if instruction.trim().is_empty() {
        return Err(AppError::MissingArgument("instruction"));
    }
    tracing::info!("edit request: {}", excerpt(instruction, 100));

    let context = codebase_context(state);
    let target = read_target(state, file);
    let prompt = prompts::edit_prompt(
        instruction,
        target.as_ref().map(|(p, c)| (p.as_str(), c.as_str())),
        &context,
    );

    let response = complete(oracle, single_turn(prompt, FIX_TEMPERATURE, FIX_MAX_TOKENS)).await?;
    let files = parse_file_blocks(&response);

    record_action(
        state,
        "Code Edit",
        HistoryDetails::default()
            .with_request(excerpt(instruction, REQUEST_EXCERPT_CHARS))
            .with_files_modified(block_paths(&files))
            .with_summary("Code modification"),
    );
    Ok(AssistantReplyView { response, files })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn single_turn(prompt: String, temperature: f32, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(prompts::ide_system_prompt()),
            ChatMessage::user(prompt),
        ],
        temperature,
        max_tokens,
    }
}

async fn complete<O: CompletionOracle>(
    oracle: &O,
    req: CompletionRequest,
) -> Result<String, AppError> {
    tracing::debug!(
        "calling {} with {} messages",
        oracle.model_id(),
        req.messages.len()
    );
    let reply = oracle.complete(req).await?;
    if reply.trim().is_empty() {
        return Err(ModelError::InvalidResponse("empty reply".to_string()).into());
    }
    Ok(reply)
}

/// Read the file the caller pointed at. An unreadable file is left out of the
/// prompt rather than failing the request.
fn read_target(state: &AppState, file: Option<&str>) -> Option<(String, String)> {
    let path = file.map(str::trim).filter(|p| !p.is_empty())?;
    match state.workspace.read_file(path) {
        Ok(content) => Some((path.to_string(), content)),
        Err(e) => {
            tracing::debug!("skipping target file {path}: {e}");
            None
        }
    }
}

fn block_paths(files: &[ParsedFileBlock]) -> Vec<String> {
    files.iter().map(|f| f.path.clone()).collect()
}
