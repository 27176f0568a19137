use serde::Serialize;

use crate::cli::CheckArgs;
use crate::commands::{discover_schema_files, read_source};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Per-file result of `check`, as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    models: usize,
    configs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    message: String,
    line: usize,
    column: usize,
}

/// Run the `check` command: parse schema files and render diagnostics.
pub fn run(args: CheckArgs, output: &OutputContext) -> Result<(), CliError> {
    let files = discover_schema_files(&args.paths)?;

    let mut reports = Vec::with_capacity(files.len());
    let mut total_models = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();

        match prisma_schema_syntax::parse(&source_text) {
            Ok(document) => {
                let models = document.models().count();
                let configs = document.configs().count();
                total_models += models;
                output.status(&format!("  {filename} .... {models} models, {configs} configs"));
                reports.push(FileReport {
                    file: filename,
                    models,
                    configs,
                    error: None,
                });
            }
            Err(error) => {
                failed += 1;
                output.parse_failure(&error, &filename);
                reports.push(FileReport {
                    file: filename,
                    models: 0,
                    configs: 0,
                    error: Some(ErrorReport {
                        message: error.message().to_string(),
                        line: error.position().line,
                        column: error.position().column,
                    }),
                });
            }
        }
    }

    // Summary
    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_models} models parsed from {} files, {failed} errors",
                files.len()
            );
            if failed > 0 {
                output.warn(&summary);
            } else {
                output.success(&summary);
            }
        }
        OutputMode::Json => {
            let summary = serde_json::json!({
                "files": files.len(),
                "models": total_models,
                "errors": failed,
                "results": reports,
            });
            output.print_json(&summary);
        }
        OutputMode::Plain => {
            println!("{}\t{total_models}\t{failed}", files.len());
        }
    }

    if failed > 0 {
        Err(CliError::ParseFailed {
            failed,
            total: files.len(),
        })
    } else {
        Ok(())
    }
}
