use crate::blocks::{parse_file_blocks, summarize_results, ApplyPipeline, ParsedFileBlock};
use crate::bus::topics;
use crate::history::HistoryDetails;
use crate::runtime::record_action;
use crate::{AppError, AppState, ApplyResultsView};

/// Extract proposed file blocks from a model reply. Pure; touches nothing.
pub fn parse_response(text: &str) -> Vec<ParsedFileBlock> {
    parse_file_blocks(text)
}

/// Write every block into the workspace, best effort, and log the batch.
pub fn apply_files(
    state: &AppState,
    blocks: &[ParsedFileBlock],
) -> Result<ApplyResultsView, AppError> {
    let results = ApplyPipeline::new(&state.workspace).apply(blocks)?;
    let summary = summarize_results(&results);
    tracing::info!("{summary}");

    record_action(
        state,
        "Apply Changes",
        HistoryDetails::default()
            .with_files_modified(blocks.iter().map(|b| b.path.clone()).collect())
            .with_summary(summary.clone()),
    );
    state.bus.emit(
        topics::CHANGES_APPLIED,
        state.workspace_label(),
        serde_json::json!({
            "summary": summary,
            "results": &results,
        }),
    );

    Ok(ApplyResultsView { results })
}
