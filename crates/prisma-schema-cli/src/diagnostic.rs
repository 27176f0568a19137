use miette::{Diagnostic, NamedSource, SourceSpan};
use prisma_schema_syntax::{ErrorKind, ParseError};

/// A diagnostic wrapping a `ParseError` for rich miette rendering.
///
/// Unlike the error's own report it names the file it came from.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// Convert a `ParseError` into a miette `SchemaDiagnostic`.
pub fn parse_error_to_diagnostic(error: &ParseError, filename: &str) -> SchemaDiagnostic {
    let source = error.source_text();
    let offset = error.position().offset;
    let width = source[offset.min(source.len())..]
        .chars()
        .next()
        .map_or(0, char::len_utf8);

    let (label, suggestion) = match error.kind() {
        ErrorKind::UnexpectedToken => (
            "unrecognized character".to_string(),
            Some(
                "Only identifiers, @attributes, \"strings\" and the symbols { } ( ) , ? = [] \
                 may appear outside string literals."
                    .to_string(),
            ),
        ),
        ErrorKind::Syntax if width == 0 => (
            "input ended here".to_string(),
            Some("The file ended before the block was complete; check for a missing '}'.".to_string()),
        ),
        ErrorKind::Syntax => (lowercase_first(error.message()), None),
        ErrorKind::NestingLimit => (
            "nesting limit reached here".to_string(),
            Some(format!(
                "Function calls may nest at most {} levels deep.",
                prisma_schema_syntax::MAX_CALL_DEPTH
            )),
        ),
    };

    SchemaDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: (offset, width).into(),
        message: error.message().to_string(),
        label,
        suggestion,
    }
}

/// Render a parse error for a file as a miette report.
pub fn render_diagnostic(error: &ParseError, filename: &str) -> miette::Report {
    miette::Report::new(parse_error_to_diagnostic(error, filename))
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
