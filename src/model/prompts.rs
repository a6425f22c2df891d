//! Prompt builders for the assistant flows.
//!
//! Every prompt that may lead to file changes restates the block protocol
//! understood by `blocks::parse_file_blocks`.

use crate::workspace::ContextFile;

// ---------------------------------------------------------------------------
// Block protocol
// ---------------------------------------------------------------------------

pub const FILE_BLOCK_EXAMPLE: &str = "```file:path/to/file.ext\nfull file content\n```";

pub const EMPTY_WORKSPACE_CONTEXT: &str = "This is an empty workspace with no files yet.";

pub const UNREADABLE_CONTEXT: &str = "Could not read codebase.";

pub const CONTEXT_ACKNOWLEDGEMENT: &str = "I've analyzed the codebase. How can I help you?";

pub fn ide_system_prompt() -> String {
    format!(
        r#"You are an expert coding assistant embedded in an editor. The user's whole workspace is available to you, so never ask them to paste code.

You help with:
1. Project generation from a description
2. Explaining code file by file or function by function
3. Debugging: finding the cause of an error and proposing a fix
4. Editing and refactoring existing code
5. Performance and structure improvements
6. Documentation, comments and README files

Rules:
- Explain your reasoning before proposing changes.
- To create or replace a file, emit its complete new content in exactly this format:
{FILE_BLOCK_EXAMPLE}
- Never put another triple-backtick fence inside a file block; it ends the block.
- Use plain markdown for explanations.

Be concise and accurate, like an experienced pair programmer."#
    )
}

// ---------------------------------------------------------------------------
// Context rendering
// ---------------------------------------------------------------------------

pub fn render_codebase_context(files: &[ContextFile]) -> String {
    if files.is_empty() {
        return EMPTY_WORKSPACE_CONTEXT.to_string();
    }

    let mut context = String::from("## Current Codebase:\n\n");
    for file in files {
        context.push_str(&format!("### {}\n```\n{}\n```\n\n", file.path, file.content));
    }
    context
}

// ---------------------------------------------------------------------------
// Task prompts
// ---------------------------------------------------------------------------

pub fn context_preamble(context: &str) -> String {
    format!("Here is the current codebase for context:\n\n{context}")
}

pub fn project_generation_prompt(description: &str) -> String {
    format!(
        r#"Generate a complete project for this description.

PROJECT DESCRIPTION:
{description}

First write the documentation files:
- README.md (overview, setup, usage)
- architecture.md (system design and components)
- features.md (every feature explained)
- dataflow.md (how data moves through the system)
- systemflow.md (system processes)
- userflow.md (user journeys)
- about.md (purpose and credits)

Then write the code files for a working implementation.

Emit every file as:
{FILE_BLOCK_EXAMPLE}

The project must be complete and runnable; include every file it needs."#
    )
}

pub fn debug_prompt(error_message: &str, target: Option<(&str, &str)>, context: &str) -> String {
    let mut prompt =
        format!("Debug this error and explain the issue:\n\nERROR:\n{error_message}\n\n");
    if let Some((path, content)) = target {
        prompt.push_str(&format!("RELEVANT FILE ({path}):\n```\n{content}\n```\n\n"));
    }
    prompt.push_str(&format!("CODEBASE CONTEXT:\n{context}\n\n"));
    prompt.push_str(&format!(
        "Please:\n1. Explain what causes the error\n2. Point at the faulty code\n3. Provide the fix as complete files using:\n{FILE_BLOCK_EXAMPLE}"
    ));
    prompt
}

pub fn edit_prompt(instruction: &str, target: Option<(&str, &str)>, context: &str) -> String {
    let mut prompt = format!("INSTRUCTION: {instruction}\n\n");
    if let Some((path, content)) = target {
        prompt.push_str(&format!("TARGET FILE ({path}):\n```\n{content}\n```\n\n"));
    }
    prompt.push_str(&format!("CODEBASE:\n{context}\n\n"));
    prompt.push_str(&format!(
        "Make the requested changes and return every modified file using:\n{FILE_BLOCK_EXAMPLE}"
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::parse_file_blocks;

    #[test]
    fn protocol_example_is_itself_a_parseable_block() {
        let blocks = parse_file_blocks(FILE_BLOCK_EXAMPLE);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].path, "path/to/file.ext");
    }

    #[test]
    fn empty_context_uses_placeholder() {
        assert_eq!(render_codebase_context(&[]), EMPTY_WORKSPACE_CONTEXT);
    }

    #[test]
    fn context_renders_each_file_under_a_heading() {
        let files = vec![ContextFile {
            path: "src/app.js".to_string(),
            content: "console.log(1)".to_string(),
        }];
        let rendered = render_codebase_context(&files);
        assert!(rendered.starts_with("## Current Codebase:"));
        assert!(rendered.contains("### src/app.js\n```\nconsole.log(1)\n```"));
    }

    #[test]
    fn debug_prompt_includes_target_file_only_when_given() {
        let with = debug_prompt("TypeError", Some(("a.js", "let x;")), "ctx");
        assert!(with.contains("RELEVANT FILE (a.js)"));
        let without = debug_prompt("TypeError", None, "ctx");
        assert!(!without.contains("RELEVANT FILE"));
        assert!(without.contains("```file:"));
    }
}
