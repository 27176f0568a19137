use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, SourceCode};
use serde::Serialize;

use crate::span::Position;

/// Outcome of a grammar rule: the produced value or the furthest failure.
pub type ParseResult<T> = Result<T, ParseError>;

/// The two classes of parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The tokenizer could not classify the character at the position.
    UnexpectedToken,
    /// A grammar rule did not match.
    Syntax,
    /// Function calls nested past the parser's recursion limit.
    NestingLimit,
}

impl ErrorKind {
    fn code(self) -> &'static str {
        match self {
            Self::UnexpectedToken => "prisma_schema::unexpected_token",
            Self::Syntax => "prisma_schema::syntax_error",
            Self::NestingLimit => "prisma_schema::nesting_limit",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unrecognized character",
            Self::Syntax => "here",
            Self::NestingLimit => "nested too deeply",
        }
    }
}

/// A positioned parse failure.
///
/// Carries a shared handle to the source text so it can render a code
/// frame on its own.
#[derive(Clone, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
    position: Position,
    source_code: Arc<String>,
}

impl ParseError {
    pub fn syntax(
        message: impl Into<String>,
        position: Position,
        source_code: Arc<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            position,
            source_code,
        }
    }

    pub fn unexpected_token(
        message: impl Into<String>,
        position: Position,
        source_code: Arc<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::UnexpectedToken,
            message: message.into(),
            position,
            source_code,
        }
    }

    pub fn nesting_limit(position: Position, source_code: Arc<String>) -> Self {
        Self {
            kind: ErrorKind::NestingLimit,
            message: "Expression nested too deeply".to_string(),
            position,
            source_code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn source_text(&self) -> &str {
        &self.source_code
    }

    /// Lexical and nesting failures abort parsing; alternation never
    /// recovers from them.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedToken | ErrorKind::NestingLimit)
    }

    /// Replaces the message, keeping kind and position.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Renders the message followed by a code frame around the position.
    pub fn render(&self) -> String {
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_links(false);
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, self) {
            Ok(()) => rendered,
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("position", &self.position)
            .finish()
    }
}

impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message && self.position == other.position
    }
}

impl Eq for ParseError {}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        let source: &dyn SourceCode = &*self.source_code;
        Some(source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new(
            Some(self.kind.label().to_string()),
            self.position.offset,
            0,
        );
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    fn source(text: &str) -> Arc<String> {
        Arc::new(text.to_string())
    }

    fn failure(message: &str) -> ParseError {
        ParseError::syntax(message, Position::new(6, 1, 7), source("model {"))
    }

    #[test]
    fn display_includes_message_and_position() {
        let err = failure("Expected model name");
        assert_eq!(err.to_string(), "Expected model name at 1:7");
    }

    #[test]
    fn error_is_std_error_without_source() {
        let err: Box<dyn Error> = Box::new(failure("Expected model name"));
        assert!(err.source().is_none());
    }

    #[test]
    fn with_message_keeps_position_and_kind() {
        let err = failure("Expected identifier").with_message("Expected model name");
        assert_eq!(err.message(), "Expected model name");
        assert_eq!(err.position(), Position::new(6, 1, 7));
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn lexical_and_nesting_errors_are_fatal() {
        let lexical =
            ParseError::unexpected_token("Unexpected character '#'", Position::START, source("#"));
        assert!(lexical.is_fatal());
        let nesting = ParseError::nesting_limit(Position::START, source("f("));
        assert!(nesting.is_fatal());
        assert_eq!(nesting.message(), "Expression nested too deeply");
        assert!(!failure("Expected '{'").is_fatal());
    }

    #[test]
    fn equality_ignores_the_source_handle() {
        let a = ParseError::syntax("Expected '{'", Position::START, source("a"));
        let b = ParseError::syntax("Expected '{'", Position::START, source("b"));
        assert_eq!(a, b);
    }

    #[test]
    fn render_shows_message_and_source_line() {
        let err = ParseError::syntax(
            "Expected model name",
            Position::new(16, 2, 7),
            source("// header\nmodel {\n}"),
        );
        let rendered = err.render();
        assert!(rendered.contains("Expected model name"), "{rendered}");
        assert!(rendered.contains("model {"), "{rendered}");
    }

    #[test]
    fn render_at_end_of_input() {
        let err = ParseError::syntax("Expected '}'", Position::new(11, 1, 12), source("model Foo {"));
        let rendered = err.render();
        assert!(rendered.contains("Expected '}'"), "{rendered}");
    }

    // The result alias follows the usual monadic laws.

    #[test]
    fn map_and_then_are_no_ops_on_err() {
        let err: ParseResult<i32> = Err(failure("boom"));
        assert_eq!(err.clone().map(|v| v + 1), Err(failure("boom")));
        assert_eq!(err.and_then(|v| Ok(v + 1)), Err(failure("boom")));
    }

    #[test]
    fn or_else_is_a_no_op_on_ok() {
        let ok: ParseResult<i32> = Ok(1);
        assert_eq!(ok.or_else(|_| Ok::<i32, ParseError>(2)), Ok(1));
    }

    #[test]
    fn or_else_recovers_from_err() {
        let err: ParseResult<i32> = Err(failure("boom"));
        assert_eq!(err.or_else(|_| Ok::<i32, ParseError>(2)), Ok(2));
    }

    #[test]
    fn and_then_can_turn_success_into_failure() {
        let ok: ParseResult<i32> = Ok(1);
        assert!(ok.and_then(|_| Err::<i32, _>(failure("boom"))).is_err());
    }

    #[test]
    fn question_mark_surfaces_the_error() {
        fn run() -> ParseResult<i32> {
            let value: ParseResult<i32> = Err(failure("inner"));
            Ok(value? + 1)
        }
        assert_eq!(run().unwrap_err().message(), "inner");
    }
}
