use serde::Serialize;

use crate::span::{Position, Span};

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// `[a-zA-Z][a-zA-Z0-9_]*`, which also covers keywords and `true`/`false`.
    Identifier,
    /// An attribute marker such as `@id` or `@db.VarChar`.
    Attribute,
    /// A double-quoted string literal, quotes included.
    String,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Question,
    Equals,
    /// The array marker `[]`.
    Brackets,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Attribute => "attribute",
            Self::String => "string literal",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Comma => "','",
            Self::Question => "'?'",
            Self::Equals => "'='",
            Self::Brackets => "'[]'",
            Self::Eof => "end of input",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A classified slice of the source, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub start: Position,
    pub end: Position,
}

impl<'src> Token<'src> {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_human_readable() {
        assert_eq!(TokenKind::LBrace.description(), "'{'");
        assert_eq!(TokenKind::Identifier.description(), "identifier");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }

    #[test]
    fn token_span_covers_its_text() {
        let token = Token {
            kind: TokenKind::Identifier,
            text: "model",
            start: Position::START,
            end: Position::START.advanced_by("model"),
        };
        assert_eq!(token.span().len(), 5);
        assert!(token.is(TokenKind::Identifier));
    }
}
