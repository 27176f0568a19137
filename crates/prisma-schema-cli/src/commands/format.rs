use std::path::PathBuf;

use crate::cli::FormatArgs;
use crate::commands::{discover_schema_files, read_source};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `format` command.
///
/// Without flags the canonical text of every file is printed to stdout.
/// `--write` rewrites files that are not canonical, `--check` only lists
/// them.
pub fn run(args: FormatArgs, output: &OutputContext) -> Result<(), CliError> {
    let files = discover_schema_files(&args.paths)?;

    let mut unformatted: Vec<PathBuf> = Vec::new();
    let mut failed = 0usize;
    let mut results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();

        let document = match prisma_schema_syntax::parse(&source_text) {
            Ok(document) => document,
            Err(error) => {
                failed += 1;
                output.parse_failure(&error, &filename);
                if output.mode == OutputMode::Json {
                    results.push(serde_json::json!({
                        "file": filename,
                        "error": error.message(),
                    }));
                }
                continue;
            }
        };

        let canonical = prisma_schema_syntax::print(&document);
        let changed = canonical != source_text;
        tracing::debug!(file = %filename, changed, "formatted schema file");

        if args.check {
            if changed {
                match output.mode {
                    OutputMode::Human => output.warn(&format!("{filename} is not formatted")),
                    OutputMode::Plain => println!("{filename}"),
                    OutputMode::Json => {}
                }
                unformatted.push(file.clone());
            }
        } else if args.write {
            if changed {
                std::fs::write(file, &canonical).map_err(|e| CliError::Io {
                    path: file.clone(),
                    source: e,
                })?;
                output.status(&format!("  formatted {filename}"));
            }
        } else if output.mode != OutputMode::Json {
            print!("{canonical}");
        }

        if output.mode == OutputMode::Json {
            let mut result = serde_json::json!({ "file": filename, "changed": changed });
            if !args.check && !args.write {
                result["output"] = serde_json::Value::String(canonical);
            }
            results.push(result);
        }
    }

    if output.mode == OutputMode::Json {
        output.print_json(&serde_json::json!({
            "files": files.len(),
            "errors": failed,
            "unformatted": unformatted.len(),
            "results": results,
        }));
    }

    if failed > 0 {
        return Err(CliError::ParseFailed {
            failed,
            total: files.len(),
        });
    }
    if !unformatted.is_empty() {
        return Err(CliError::Unformatted { files: unformatted });
    }
    if args.check {
        output.success(&format!("{} files already formatted", files.len()));
    }
    Ok(())
}
