use crate::cli::AstArgs;
use crate::commands::read_source;
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `ast` command: print the parsed document as pretty JSON.
pub fn run(args: AstArgs, output: &OutputContext) -> Result<(), CliError> {
    let source_text = read_source(&args.file)?;
    let document = prisma_schema_syntax::parse(&source_text).map_err(|error| CliError::Parse {
        error,
        file: args.file.clone(),
    })?;

    let value = serde_json::to_value(&document).map_err(|e| CliError::Other(e.to_string()))?;
    output.print_json(&value);
    Ok(())
}
