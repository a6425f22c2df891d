use codeforge_lib::commands::{assistant, changes, workspace};
use codeforge_lib::config::AppConfig;
use codeforge_lib::model::OpenAiCompatClient;
use codeforge_lib::{init_tracing, AppError, AppState};
use serde::Serialize;

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    workspace: Option<String>,
    command: Option<String>,
    positional: Vec<String>,
    file: Option<String>,
    no_codebase: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("codeforge: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        print_help();
        return Ok(());
    };
    let Some(command) = args.command.as_deref() else {
        print_help();
        return Err("missing command".to_string());
    };

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    init_tracing(&config.log_filter);
    let state = AppState::new(config);

    // `parse` is pure and works without a workspace.
    if command == "parse" {
        let text = read_stdin()?;
        return print_json(&changes::parse_response(&text));
    }

    let root = args
        .workspace
        .clone()
        .or_else(|| std::env::var("CODEFORGE_WORKSPACE").ok())
        .filter(|root| !root.trim().is_empty())
        .ok_or_else(|| "--workspace <dir> or CODEFORGE_WORKSPACE is required".to_string())?;
    let opened = workspace::open_workspace(&state, &root).map_err(err)?;
    tracing::debug!("workspace {} (empty: {})", opened.workspace_root, opened.is_empty);

    match command {
        "tree" => print_json(&workspace::list_files(&state).map_err(err)?),
        "read" => {
            let path = positional(&args, "path")?;
            let view = workspace::read_file(&state, &path).map_err(err)?;
            print!("{}", view.content);
            Ok(())
        }
        "write" => {
            let path = positional(&args, "path")?;
            let content = read_stdin()?;
            print_json(&workspace::write_file(&state, &path, Some(&content)).map_err(err)?)
        }
        "delete" => {
            let path = positional(&args, "path")?;
            print_json(&workspace::delete_file(&state, &path).map_err(err)?)
        }
        "apply" => {
            let text = read_stdin()?;
            let blocks = changes::parse_response(&text);
            print_json(&changes::apply_files(&state, &blocks).map_err(err)?)
        }
        "history" => {
            let view = workspace::get_history(&state).map_err(err)?;
            println!("{}", view.history.as_deref().unwrap_or("No history yet"));
            Ok(())
        }
        "chat" => {
            let message = positional(&args, "message")?;
            let oracle = oracle(&state)?;
            let view = assistant::chat(&state, &oracle, &message, Some(!args.no_codebase))
                .await
                .map_err(err)?;
            println!("{}", view.response);
            Ok(())
        }
        "generate" => {
            let description = positional(&args, "description")?;
            let oracle = oracle(&state)?;
            print_json(
                &assistant::generate_project(&state, &oracle, &description)
                    .await
                    .map_err(err)?,
            )
        }
        "debug" => {
            let error = positional(&args, "error")?;
            let oracle = oracle(&state)?;
            print_json(
                &assistant::debug(&state, &oracle, &error, args.file.as_deref())
                    .await
                    .map_err(err)?,
            )
        }
        "edit" => {
            let instruction = positional(&args, "instruction")?;
            let oracle = oracle(&state)?;
            print_json(
                &assistant::edit_code(&state, &oracle, &instruction, args.file.as_deref())
                    .await
                    .map_err(err)?,
            )
        }
        other => Err(format!("unknown command: {other}")),
    }
}

/// Returns `Ok(None)` when help was requested.
fn parse_args<I>(raw: I) -> Result<Option<CliArgs>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = raw.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(None);
        }

        if let Some(value) = arg.strip_prefix("--workspace=") {
            parsed.workspace = Some(value.to_string());
            continue;
        }
        if arg == "--workspace" || arg == "-w" {
            let value = args
                .next()
                .ok_or_else(|| "--workspace requires a value".to_string())?;
            parsed.workspace = Some(value);
            continue;
        }

        if let Some(value) = arg.strip_prefix("--file=") {
            parsed.file = Some(value.to_string());
            continue;
        }
        if arg == "--file" {
            let value = args
                .next()
                .ok_or_else(|| "--file requires a value".to_string())?;
            parsed.file = Some(value);
            continue;
        }

        if arg == "--no-codebase" {
            parsed.no_codebase = true;
            continue;
        }

        if arg.starts_with("--") {
            return Err(format!("unknown argument: {arg}"));
        }
        if parsed.command.is_none() {
            parsed.command = Some(arg);
        } else {
            parsed.positional.push(arg);
        }
    }
    Ok(Some(parsed))
}

/// Positional arguments are joined so unquoted prose still works.
fn positional(args: &CliArgs, name: &str) -> Result<String, String> {
    let value = args.positional.join(" ");
    if value.trim().is_empty() {
        return Err(format!("{name} is required"));
    }
    Ok(value)
}

fn oracle(state: &AppState) -> Result<OpenAiCompatClient, String> {
    OpenAiCompatClient::from_config(&state.config.oracle).map_err(|e| e.to_string())
}

fn read_stdin() -> Result<String, String> {
    std::io::read_to_string(std::io::stdin()).map_err(|e| format!("failed to read stdin: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to serialize output: {error}"))?;
    println!("{json}");
    Ok(())
}

fn err(error: AppError) -> String {
    error.to_string()
}

fn print_help() {
    println!("codeforge: workspace file operations and assistant-driven edits");
    println!();
    println!("Usage:");
    println!("  codeforge --workspace <dir> <command> [args]");
    println!();
    println!("Commands:");
    println!("  tree                               Print the workspace file tree as JSON");
    println!("  read <path>                        Print a file");
    println!("  write <path>                       Write stdin to a file");
    println!("  delete <path>                      Delete a file");
    println!("  parse                              Print the file blocks in stdin (no workspace)");
    println!("  apply                              Parse stdin and write its file blocks");
    println!("  history                            Print history.md");
    println!("  chat <message> [--no-codebase]     Ask the assistant");
    println!("  generate <description>             Propose files for a new project");
    println!("  debug <error> [--file <path>]      Explain an error and propose a fix");
    println!("  edit <instruction> [--file <path>] Propose an edit");
    println!();
    println!("Options:");
    println!("  --workspace, -w <dir>              Workspace root (default: $CODEFORGE_WORKSPACE)");
    println!("  --help, -h                         Show this help");
    println!();
    println!("Assistant commands print proposed files without writing them; pipe the");
    println!("reply through `apply` to write them. OPENAI_API_KEY, OPENAI_MODEL and");
    println!("OPENAI_BASE_URL configure the model endpoint.");
}
