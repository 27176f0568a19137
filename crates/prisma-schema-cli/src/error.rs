use std::path::PathBuf;

use prisma_schema_syntax::ParseError;

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / usage error
/// - 3: parse error
/// - 4: files not in canonical form (`format --check`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
    Unformatted = 4,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A single file failed to parse.
    #[error("failed to parse {}: {error}", .file.display())]
    Parse { error: ParseError, file: PathBuf },

    /// Several files failed to parse; each was already reported.
    #[error("{failed} of {total} files failed to parse")]
    ParseFailed { failed: usize, total: usize },

    /// Files whose contents differ from their canonical form.
    #[error("{} files are not formatted", .files.len())]
    Unformatted { files: Vec<PathBuf> },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Schema file or directory not found.
    #[error("no schema files found in {}", .path.display())]
    NoSchemaFiles { path: PathBuf },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { .. } | Self::ParseFailed { .. } => ExitCode::ParseError,
            Self::Unformatted { .. } => ExitCode::Unformatted,
            Self::NoSchemaFiles { .. } => ExitCode::InvalidArguments,
            Self::Io { .. } | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parse { error, file } => serde_json::json!({
                "error": "parse_error",
                "file": file.display().to_string(),
                "message": error.message(),
                "line": error.position().line,
                "column": error.position().column,
                "offset": error.position().offset,
            }),
            Self::ParseFailed { failed, total } => serde_json::json!({
                "error": "parse_error",
                "failed": failed,
                "total": total,
            }),
            Self::Unformatted { files } => serde_json::json!({
                "error": "unformatted",
                "files": files
                    .iter()
                    .map(|file| file.display().to_string())
                    .collect::<Vec<_>>(),
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}
