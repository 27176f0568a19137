use logos::Logos;

use crate::span::Position;
use crate::token::{Token, TokenKind};

/// Raw lexemes recognized by logos. Whitespace is skipped automatically.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(r"@[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)*")]
    Attribute,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("?")]
    Question,

    #[token("=")]
    Equals,

    #[token("[]")]
    Brackets,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Identifier => TokenKind::Identifier,
            Lexeme::Attribute => TokenKind::Attribute,
            Lexeme::String => TokenKind::String,
            Lexeme::LBrace => TokenKind::LBrace,
            Lexeme::RBrace => TokenKind::RBrace,
            Lexeme::LParen => TokenKind::LParen,
            Lexeme::RParen => TokenKind::RParen,
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::Question => TokenKind::Question,
            Lexeme::Equals => TokenKind::Equals,
            Lexeme::Brackets => TokenKind::Brackets,
        }
    }
}

/// A character the lexer could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub position: Position,
    pub found: char,
}

/// Lazily tokenized source with a rewindable cursor.
///
/// Tokens are produced on demand and cached by ordinal, so restoring the
/// cursor never re-lexes anything.
pub struct TokenList<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, Lexeme>,
    /// Position right after the last consumed text.
    cursor: Position,
    tokens: Vec<Token<'src>>,
    pointer: usize,
    failure: Option<LexError>,
}

impl<'src> TokenList<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: Lexeme::lexer(source),
            cursor: Position::START,
            tokens: Vec::new(),
            pointer: 0,
            failure: None,
        }
    }

    /// Returns the token under the cursor without consuming it.
    pub fn peek(&mut self) -> Result<Token<'src>, LexError> {
        if self.pointer == self.tokens.len() {
            let token = self.compute_next()?;
            self.tokens.push(token);
        }
        Ok(self.tokens[self.pointer])
    }

    /// Returns the token under the cursor and moves past it.
    ///
    /// At end of input the cursor stays on the EOF token.
    pub fn advance(&mut self) -> Result<Token<'src>, LexError> {
        let token = self.peek()?;
        if token.kind != TokenKind::Eof {
            self.pointer += 1;
        }
        Ok(token)
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Moves the cursor back to a previously visited ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `pointer` was never reached.
    pub fn restore(&mut self, pointer: usize) {
        assert!(
            pointer <= self.tokens.len(),
            "attempt to restore to token {pointer}, only {} computed",
            self.tokens.len()
        );
        self.pointer = pointer;
    }

    fn compute_next(&mut self) -> Result<Token<'src>, LexError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }

        let Some(result) = self.lexer.next() else {
            self.consume_to(self.source.len());
            return Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                start: self.cursor,
                end: self.cursor,
            });
        };

        let range = self.lexer.span();
        self.consume_to(range.start);
        let start = self.cursor;

        match result {
            Ok(lexeme) => {
                self.consume_to(range.end);
                let token = Token {
                    kind: lexeme.into(),
                    text: &self.source[range],
                    start,
                    end: self.cursor,
                };
                tracing::trace!(kind = %token.kind, text = token.text, at = %token.start, "token");
                Ok(token)
            }
            Err(()) => {
                let found = self.source[range.start..].chars().next().unwrap_or('\0');
                let failure = LexError {
                    position: start,
                    found,
                };
                self.failure = Some(failure);
                Err(failure)
            }
        }
    }

    fn consume_to(&mut self, offset: usize) {
        if offset > self.cursor.offset {
            self.cursor = self
                .cursor
                .advanced_by(&self.source[self.cursor.offset..offset]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tokens = TokenList::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = tokens.advance().expect("lex error");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn recognizes_simple_identifier() {
        let mut tokens = TokenList::new("foo");
        let token = tokens.advance().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.text, "foo");
        assert_eq!(token.start, Position::new(0, 1, 1));
        assert_eq!(token.end, Position::new(3, 1, 4));
    }

    #[test]
    fn recognizes_attributes() {
        let mut tokens = TokenList::new("@id @db.VarChar");
        let first = tokens.advance().unwrap();
        assert_eq!(first.kind, TokenKind::Attribute);
        assert_eq!(first.text, "@id");
        let second = tokens.advance().unwrap();
        assert_eq!(second.text, "@db.VarChar");
    }

    #[test]
    fn recognizes_punctuation() {
        assert_eq!(
            kinds("{ } ( ) , ? = []"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Question,
                TokenKind::Equals,
                TokenKind::Brackets,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn recognizes_strings_with_escaped_quotes() {
        let mut tokens = TokenList::new(r#""say \"hi\"" "plain""#);
        let first = tokens.advance().unwrap();
        assert_eq!(first.kind, TokenKind::String);
        assert_eq!(first.text, r#""say \"hi\"""#);
        assert_eq!(tokens.advance().unwrap().text, r#""plain""#);
    }

    #[test]
    fn identifier_followed_by_modifier() {
        assert_eq!(
            kinds("Int? Int[]"),
            vec![
                TokenKind::Identifier,
                TokenKind::Question,
                TokenKind::Identifier,
                TokenKind::Brackets,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn ignores_spaces() {
        let mut tokens = TokenList::new("    foo  ");
        let token = tokens.advance().unwrap();
        assert_eq!(token.start.offset, 4);
        assert_eq!(token.end.offset, 7);
    }

    #[test]
    fn tracks_lines_and_columns_across_newlines() {
        let mut tokens = TokenList::new("\n\n  foo\nbar");
        let foo = tokens.advance().unwrap();
        assert_eq!(foo.start, Position::new(4, 3, 3));
        let bar = tokens.advance().unwrap();
        assert_eq!(bar.start, Position::new(8, 4, 1));
        assert_eq!(bar.end, Position::new(11, 4, 4));
    }

    #[test]
    fn eof_token_sits_at_the_final_position() {
        let mut tokens = TokenList::new("foo \n");
        tokens.advance().unwrap();
        let eof = tokens.advance().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.text, "");
        assert_eq!(eof.start, Position::new(5, 2, 1));
        assert_eq!(eof.start, eof.end);
    }

    #[test]
    fn advance_is_idempotent_at_eof() {
        let mut tokens = TokenList::new("foo");
        tokens.advance().unwrap();
        let first = tokens.advance().unwrap();
        let second = tokens.advance().unwrap();
        assert_eq!(first, second);
        assert_eq!(tokens.pointer(), 1);
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("  \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn unexpected_character_reports_its_position() {
        let mut tokens = TokenList::new("foo\n  ß");
        tokens.advance().unwrap();
        let err = tokens.advance().unwrap_err();
        assert_eq!(err.found, 'ß');
        assert_eq!(err.position, Position::new(6, 2, 3));
        assert_eq!(tokens.peek().unwrap_err(), err);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut tokens = TokenList::new("foo bar");
        assert_eq!(tokens.peek().unwrap().text, "foo");
        assert_eq!(tokens.pointer(), 0);
        assert_eq!(tokens.peek().unwrap().text, "foo");
    }

    #[test]
    fn restore_rewinds_to_a_previous_token() {
        let mut tokens = TokenList::new("foo { bar }");
        tokens.advance().unwrap();
        let mark = tokens.pointer();
        assert_eq!(tokens.advance().unwrap().text, "{");
        assert_eq!(tokens.advance().unwrap().text, "bar");
        tokens.restore(mark);
        assert_eq!(tokens.advance().unwrap().text, "{");
    }

    #[test]
    #[should_panic(expected = "attempt to restore")]
    fn restore_beyond_computed_tokens_panics() {
        let mut tokens = TokenList::new("foo");
        tokens.restore(9000);
    }
}
