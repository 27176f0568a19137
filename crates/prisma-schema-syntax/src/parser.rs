use tracing::debug;

use crate::ast::{
    Attribute, BooleanLiteral, ConfigDefinition, ConfigKind, ConfigOption, Definition, Document,
    Expression, FieldDefinition, FieldType, FunctionCall, Identifier, ModelDefinition,
    StringLiteral, TypeModifier,
};
use crate::combinator::{
    choice, keyword, optional, separated, sequence, take_until, token, with_message, zero_or_more,
    ParserState, Rule,
};
use crate::error::{ParseError, ParseResult};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

/// How deeply function calls may nest inside a config value or attribute.
pub const MAX_CALL_DEPTH: usize = 64;

/// Parse schema source text into a [`Document`].
///
/// Parsing stops at the first failure; the returned error is the one from
/// the alternative that got furthest into the input.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let mut state = ParserState::new(source);
    match document.parse(&mut state) {
        Ok(document) => {
            debug!(
                definitions = document.definitions.len(),
                "parsed schema document"
            );
            Ok(document)
        }
        Err(error) => {
            debug!(%error, "schema parse failed");
            Err(error)
        }
    }
}

/// Strip the escaping of `\"` from the body of a string literal.
pub fn unescape_string(body: &str) -> String {
    body.replace("\\\"", "\"")
}

// -- Grammar productions --

/// document = definition* EOF
fn document(state: &mut ParserState<'_>) -> ParseResult<Document> {
    let (definitions, eof) = take_until(definition, TokenKind::Eof).parse(state)?;
    let span = match definitions.first() {
        Some(first) => Span::new(first.span().start, eof.end),
        None => Span::point(Position::START),
    };
    Ok(Document { definitions, span })
}

/// definition = model_definition | config_definition
fn definition(state: &mut ParserState<'_>) -> ParseResult<Definition> {
    choice(
        "Expected config or model definition",
        (model_definition, config_definition),
    )
    .parse(state)
}

/// model_definition = "model" identifier "{" field_definition* "}"
fn model_definition(state: &mut ParserState<'_>) -> ParseResult<Definition> {
    let (model, name, _, (fields, close)) = sequence((
        keyword("model"),
        with_message(identifier, "Expected model name"),
        token(TokenKind::LBrace),
        take_until(field_definition, TokenKind::RBrace),
    ))
    .parse(state)?;

    Ok(Definition::Model(ModelDefinition {
        name,
        fields,
        span: Span::new(model.start, close.end),
    }))
}

/// field_definition = identifier field_type attribute*
fn field_definition(state: &mut ParserState<'_>) -> ParseResult<FieldDefinition> {
    let (name, field_type, attributes) = sequence((
        with_message(identifier, "Expected field definition or '}'"),
        field_type,
        zero_or_more(attribute),
    ))
    .parse(state)?;

    let end = attributes
        .last()
        .map_or(field_type.span.end, |attribute| attribute.span.end);
    Ok(FieldDefinition {
        span: Span::new(name.span.start, end),
        name,
        field_type,
        attributes,
    })
}

/// field_type = identifier ("?" | "[]")?
fn field_type(state: &mut ParserState<'_>) -> ParseResult<FieldType> {
    let (name, modifier) = sequence((
        with_message(identifier, "Expected field type"),
        optional(choice(
            "Expected type modifier",
            (token(TokenKind::Question), token(TokenKind::Brackets)),
        )),
    ))
    .parse(state)?;

    let (modifier, end) = match modifier {
        None => (TypeModifier::None, name.span.end),
        Some(token) if token.is(TokenKind::Question) => (TypeModifier::Optional, token.end),
        Some(token) => (TypeModifier::Array, token.end),
    };
    Ok(FieldType {
        span: Span::new(name.span.start, end),
        name,
        modifier,
    })
}

/// attribute = ATTRIBUTE arguments?
fn attribute(state: &mut ParserState<'_>) -> ParseResult<Attribute> {
    let (marker, arguments) =
        sequence((token(TokenKind::Attribute), optional(arguments))).parse(state)?;

    let (arguments, end) = match arguments {
        Some((arguments, close)) => (arguments, close.end),
        None => (Vec::new(), marker.end),
    };
    Ok(Attribute {
        name: marker.text.to_string(),
        arguments,
        span: Span::new(marker.start, end),
    })
}

/// config_definition = ("datasource" | "generator") identifier "{" config_option* "}"
fn config_definition(state: &mut ParserState<'_>) -> ParseResult<Definition> {
    let ((kind, keyword_token), name, _, (options, close)) = sequence((
        config_kind,
        with_message(identifier, "Expected config name"),
        token(TokenKind::LBrace),
        take_until(config_option, TokenKind::RBrace),
    ))
    .parse(state)?;

    Ok(Definition::Config(ConfigDefinition {
        kind,
        name,
        options,
        span: Span::new(keyword_token.start, close.end),
    }))
}

fn config_kind<'src>(state: &mut ParserState<'src>) -> ParseResult<(ConfigKind, Token<'src>)> {
    choice(
        "Expected datasource or generator keyword",
        (
            keyword("datasource").map(|token| (ConfigKind::Datasource, token)),
            keyword("generator").map(|token| (ConfigKind::Generator, token)),
        ),
    )
    .parse(state)
}

/// config_option = identifier "=" expression
fn config_option(state: &mut ParserState<'_>) -> ParseResult<ConfigOption> {
    let (key, _, value) = sequence((
        with_message(identifier, "Expected config option or '}'"),
        token(TokenKind::Equals),
        expression,
    ))
    .parse(state)?;

    Ok(ConfigOption {
        span: Span::new(key.span.start, value.span().end),
        key,
        value,
    })
}

/// expression = function_call | string_literal | boolean_literal
///
/// Function calls come first so that an identifier followed by `(` is
/// never mistaken for a literal.
fn expression(state: &mut ParserState<'_>) -> ParseResult<Expression> {
    choice(
        "Expected expression",
        (function_call, string_literal, boolean_literal),
    )
    .parse(state)
}

/// function_call = identifier arguments
fn function_call(state: &mut ParserState<'_>) -> ParseResult<Expression> {
    let (name, (arguments, close)) = sequence((identifier, arguments)).parse(state)?;
    Ok(Expression::FunctionCall(FunctionCall {
        span: Span::new(name.span.start, close.end),
        name,
        arguments,
    }))
}

/// arguments = "(" (expression ("," expression)*)? ")"
fn arguments<'src>(
    state: &mut ParserState<'src>,
) -> ParseResult<(Vec<Expression>, Token<'src>)> {
    token(TokenKind::LParen).parse(state)?;
    state.nested(MAX_CALL_DEPTH, |state| {
        sequence((
            separated(expression, token(TokenKind::Comma)),
            token(TokenKind::RParen),
        ))
        .parse(state)
    })
}

fn string_literal(state: &mut ParserState<'_>) -> ParseResult<Expression> {
    let literal = token(TokenKind::String).parse(state)?;
    let body = literal
        .text
        .strip_prefix('"')
        .and_then(|text| text.strip_suffix('"'))
        .unwrap_or(literal.text);
    Ok(Expression::String(StringLiteral {
        value: unescape_string(body),
        span: literal.span(),
    }))
}

fn boolean_literal(state: &mut ParserState<'_>) -> ParseResult<Expression> {
    let literal = choice(
        "Expected boolean value",
        (keyword("true"), keyword("false")),
    )
    .parse(state)?;
    Ok(Expression::Boolean(BooleanLiteral {
        value: literal.text == "true",
        span: literal.span(),
    }))
}

fn identifier(state: &mut ParserState<'_>) -> ParseResult<Identifier> {
    token(TokenKind::Identifier)
        .map(|token| Identifier {
            name: token.text.to_string(),
            span: token.span(),
        })
        .parse(state)
}
