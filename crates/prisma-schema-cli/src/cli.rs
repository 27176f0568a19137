use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Checker and formatter for Prisma-style schema files.
///
/// Parses `model`, `datasource` and `generator` blocks, reports syntax
/// errors with source excerpts, and rewrites files in canonical form.
#[derive(Parser)]
#[command(
    name = "prisma-schema",
    version,
    about = "Check and format Prisma-style schema files",
    after_help = "Use 'prisma-schema <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Output format: human (default), json, plain [env: PRISMA_SCHEMA_FORMAT]
    #[arg(
        long,
        global = true,
        default_value = "human",
        env = "PRISMA_SCHEMA_FORMAT",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse schema files and report syntax errors
    Check(CheckArgs),

    /// Print schema files in canonical form
    Format(FormatArgs),

    /// Dump the syntax tree of a schema file as JSON
    Ast(AstArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `prisma-schema check`.
#[derive(Args)]
pub struct CheckArgs {
    /// Schema files or directories to check (default: ./prisma/)
    #[arg(default_value = "prisma/")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for `prisma-schema format`.
#[derive(Args)]
pub struct FormatArgs {
    /// Schema files or directories to format (default: ./prisma/)
    #[arg(default_value = "prisma/")]
    pub paths: Vec<PathBuf>,

    /// Fail if any file is not already canonical; changes nothing
    #[arg(long = "check", conflicts_with = "write")]
    pub check: bool,

    /// Rewrite files in place instead of printing to stdout
    #[arg(short = 'w', long = "write")]
    pub write: bool,
}

/// Arguments for `prisma-schema ast`.
#[derive(Args)]
pub struct AstArgs {
    /// Schema file to parse
    pub file: PathBuf,
}

/// Arguments for `prisma-schema completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}
