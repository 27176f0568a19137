//! Backtracking parser combinators.
//!
//! A [`Rule`] maps the parser state to a value or a [`ParseError`]. Rules
//! are always invoked through [`Rule::parse`], which rewinds the token
//! cursor when the rule fails, so any rule can be tried speculatively
//! inside [`choice`] without manual bookkeeping.
//!
//! Any `fn(&mut ParserState) -> ParseResult<T>` is a rule, which is how the
//! grammar refers to itself recursively.

use std::sync::Arc;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{LexError, TokenList};
use crate::span::Position;
use crate::token::{Token, TokenKind};

/// Per-parse mutable state: the token cache and its cursor.
pub struct ParserState<'src> {
    tokens: TokenList<'src>,
    source: Arc<String>,
    depth: usize,
}

impl<'src> ParserState<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: TokenList::new(source),
            source: Arc::new(source.to_string()),
            depth: 0,
        }
    }

    pub fn peek(&mut self) -> ParseResult<Token<'src>> {
        self.tokens.peek().map_err(|e| self.lex_error(e))
    }

    pub fn advance(&mut self) -> ParseResult<Token<'src>> {
        self.tokens.advance().map_err(|e| self.lex_error(e))
    }

    pub fn pointer(&self) -> usize {
        self.tokens.pointer()
    }

    pub fn restore(&mut self, pointer: usize) {
        self.tokens.restore(pointer);
    }

    /// Builds a syntax error at `position`.
    pub fn error(&self, message: impl Into<String>, position: Position) -> ParseError {
        ParseError::syntax(message, position, Arc::clone(&self.source))
    }

    /// Runs `body` one nesting level deeper.
    ///
    /// Once `limit` levels are open the body is not run and a fatal error
    /// is raised at the next token. Bounds the recursion of grammar rules
    /// that call themselves.
    pub fn nested<T>(
        &mut self,
        limit: usize,
        body: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= limit {
            let at = self.peek()?.start;
            return Err(ParseError::nesting_limit(at, Arc::clone(&self.source)));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn lex_error(&self, error: LexError) -> ParseError {
        ParseError::unexpected_token(
            format!("Unexpected character '{}'", error.found),
            error.position,
            Arc::clone(&self.source),
        )
    }
}

/// A grammar rule.
pub trait Rule<'src> {
    type Output;

    /// Runs the rule body. Callers should go through [`Rule::parse`].
    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output>;

    /// Runs the rule, restoring the cursor to where it started on failure.
    fn parse(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        let pointer = state.pointer();
        let result = self.apply(state);
        if result.is_err() {
            state.restore(pointer);
        }
        result
    }

    /// Transforms the value of a successful match.
    fn map<F, U>(self, mapper: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map { rule: self, mapper }
    }
}

impl<'src, T, F> Rule<'src> for F
where
    F: Fn(&mut ParserState<'src>) -> ParseResult<T>,
{
    type Output = T;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<T> {
        self(state)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Map<R, F> {
    rule: R,
    mapper: F,
}

impl<'src, R, F, U> Rule<'src> for Map<R, F>
where
    R: Rule<'src>,
    F: Fn(R::Output) -> U,
{
    type Output = U;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<U> {
        self.rule.parse(state).map(&self.mapper)
    }
}

/// Matches one token of the given kind.
pub fn token(kind: TokenKind) -> Expect {
    Expect { kind }
}

#[derive(Debug, Clone, Copy)]
pub struct Expect {
    kind: TokenKind,
}

impl<'src> Rule<'src> for Expect {
    type Output = Token<'src>;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Token<'src>> {
        let next = state.peek()?;
        if next.kind == self.kind {
            state.advance()
        } else {
            Err(state.error(format!("Expected {}", self.kind), next.start))
        }
    }
}

/// Matches an identifier token with exactly the given text.
pub fn keyword(name: &'static str) -> Keyword {
    Keyword { name }
}

#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    name: &'static str,
}

impl<'src> Rule<'src> for Keyword {
    type Output = Token<'src>;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Token<'src>> {
        let next = state.peek()?;
        if next.kind == TokenKind::Identifier && next.text == self.name {
            state.advance()
        } else {
            Err(state.error(format!("Expected keyword {}", self.name), next.start))
        }
    }
}

/// Runs a tuple of rules in order, producing the tuple of their values.
pub fn sequence<R>(rules: R) -> Sequence<R> {
    Sequence(rules)
}

#[derive(Debug, Clone, Copy)]
pub struct Sequence<R>(R);

macro_rules! impl_sequence {
    ($($rule:ident . $idx:tt => $value:ident),+) => {
        impl<'src, $($rule: Rule<'src>),+> Rule<'src> for Sequence<($($rule,)+)> {
            type Output = ($($rule::Output,)+);

            fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
                $(let $value = self.0.$idx.parse(state)?;)+
                Ok(($($value,)+))
            }
        }
    };
}

impl_sequence!(A.0 => a, B.1 => b);
impl_sequence!(A.0 => a, B.1 => b, C.2 => c);
impl_sequence!(A.0 => a, B.1 => b, C.2 => c, D.3 => d);
impl_sequence!(A.0 => a, B.1 => b, C.2 => c, D.3 => d, E.4 => e);

/// Tries a tuple of alternatives in order from the same position.
///
/// When every alternative fails, the error of the one that got furthest
/// is reported; ties go to the earliest, and `message` at the starting
/// token wins when no alternative advanced at all.
pub fn choice<R>(message: &'static str, rules: R) -> Choice<R> {
    Choice { message, rules }
}

#[derive(Debug, Clone, Copy)]
pub struct Choice<R> {
    message: &'static str,
    rules: R,
}

fn furthest_failure(previous: ParseError, next: ParseError) -> ParseError {
    if next.position().offset > previous.position().offset {
        next
    } else {
        previous
    }
}

macro_rules! impl_choice {
    ($($rule:ident . $idx:tt),+) => {
        impl<'src, T, $($rule: Rule<'src, Output = T>),+> Rule<'src> for Choice<($($rule,)+)> {
            type Output = T;

            fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<T> {
                let start = state.peek()?.start;
                let mut furthest = state.error(self.message, start);
                $(
                    match self.rules.$idx.parse(state) {
                        Ok(value) => return Ok(value),
                        Err(error) if error.is_fatal() => return Err(error),
                        Err(error) => furthest = furthest_failure(furthest, error),
                    }
                )+
                tracing::trace!(
                    error = furthest.message(),
                    at = %furthest.position(),
                    "all alternatives failed"
                );
                Err(furthest)
            }
        }
    };
}

impl_choice!(A.0, B.1);
impl_choice!(A.0, B.1, C.2);
impl_choice!(A.0, B.1, C.2, D.3);

/// Matches `rule` or nothing.
pub fn optional<R>(rule: R) -> Optional<R> {
    Optional(rule)
}

#[derive(Debug, Clone, Copy)]
pub struct Optional<R>(R);

impl<'src, R: Rule<'src>> Rule<'src> for Optional<R> {
    type Output = Option<R::Output>;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        match self.0.parse(state) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_fatal() => Err(error),
            Err(_) => Ok(None),
        }
    }
}

/// Applies `rule` until it fails once.
pub fn zero_or_more<R>(rule: R) -> ZeroOrMore<R> {
    ZeroOrMore(rule)
}

#[derive(Debug, Clone, Copy)]
pub struct ZeroOrMore<R>(R);

impl<'src, R: Rule<'src>> Rule<'src> for ZeroOrMore<R> {
    type Output = Vec<R::Output>;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        let mut values = Vec::new();
        loop {
            let before = state.pointer();
            match self.0.parse(state) {
                Ok(value) => {
                    values.push(value);
                    if state.pointer() == before {
                        return Ok(values);
                    }
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(_) => return Ok(values),
            }
        }
    }
}

/// Zero or more `rule` matches with `separator` between them.
///
/// A separator that is not followed by an element is left unconsumed.
pub fn separated<R, S>(rule: R, separator: S) -> Separated<R, S> {
    Separated { rule, separator }
}

#[derive(Debug, Clone, Copy)]
pub struct Separated<R, S> {
    rule: R,
    separator: S,
}

impl<'src, R, S> Rule<'src> for Separated<R, S>
where
    R: Rule<'src>,
    S: Rule<'src>,
{
    type Output = Vec<R::Output>;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        let mut values = match self.rule.parse(state) {
            Ok(first) => vec![first],
            Err(error) if error.is_fatal() => return Err(error),
            Err(_) => return Ok(Vec::new()),
        };

        loop {
            let before = state.pointer();
            let next = self
                .separator
                .parse(state)
                .and_then(|_| self.rule.parse(state));
            match next {
                Ok(value) => values.push(value),
                Err(error) => {
                    state.restore(before);
                    if error.is_fatal() {
                        return Err(error);
                    }
                    return Ok(values);
                }
            }
        }
    }
}

/// Applies `rule` until the next token is `stop`, then consumes the stop
/// token as well.
///
/// Fails as soon as `rule` fails before the stop token is reached.
pub fn take_until<R>(rule: R, stop: TokenKind) -> TakeUntil<R> {
    TakeUntil { rule, stop }
}

#[derive(Debug, Clone, Copy)]
pub struct TakeUntil<R> {
    rule: R,
    stop: TokenKind,
}

impl<'src, R: Rule<'src>> Rule<'src> for TakeUntil<R> {
    type Output = (Vec<R::Output>, Token<'src>);

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        let mut values = Vec::new();
        loop {
            let next = state.peek()?;
            if next.kind == self.stop {
                let stop = state.advance()?;
                return Ok((values, stop));
            }

            let before = state.pointer();
            values.push(self.rule.parse(state)?);
            if state.pointer() == before {
                return Err(state.error(format!("Expected {}", self.stop), next.start));
            }
        }
    }
}

/// Replaces the message of a syntax error raised by `rule`, keeping its
/// position.
pub fn with_message<R>(rule: R, message: &'static str) -> WithMessage<R> {
    WithMessage { rule, message }
}

#[derive(Debug, Clone, Copy)]
pub struct WithMessage<R> {
    rule: R,
    message: &'static str,
}

impl<'src, R: Rule<'src>> Rule<'src> for WithMessage<R> {
    type Output = R::Output;

    fn apply(&self, state: &mut ParserState<'src>) -> ParseResult<Self::Output> {
        self.rule.parse(state).map_err(|error| {
            if error.is_fatal() {
                error
            } else {
                error.with_message(self.message)
            }
        })
    }
}
