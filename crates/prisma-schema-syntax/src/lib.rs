//! # prisma-schema-syntax
//!
//! Parser and canonical printer for Prisma-style schema files.
//!
//! This crate provides:
//! - A lazy tokenizer that tracks line, column and byte offset
//! - A small backtracking parser-combinator engine ([`combinator`])
//! - A grammar producing a span-annotated [`Document`]
//! - A printer that renders a `Document` in canonical form
//! - Round-trip fidelity: `print(parse(s)) == s` for canonical `s`
//!
//! # Example
//!
//! ```
//! use prisma_schema_syntax::{parse, print, Definition, TypeModifier};
//!
//! let source = r#"
//! datasource db {
//!   provider = "postgresql"
//!   url = env("DATABASE_URL")
//! }
//!
//! model User {
//!   id Int @id @default(autoincrement())
//!   email String? @unique
//! }
//! "#;
//!
//! let document = parse(source).expect("parse failed");
//! assert_eq!(document.definitions.len(), 2);
//!
//! let Definition::Model(user) = &document.definitions[1] else {
//!     panic!("expected a model");
//! };
//! assert_eq!(user.fields[1].field_type.modifier, TypeModifier::Optional);
//!
//! let canonical = print(&document);
//! assert!(canonical.contains("  email  String? @unique\n"));
//! assert_eq!(print(&parse(&canonical).unwrap()), canonical);
//! ```
//!
//! Errors carry their position and the source text, so they can render
//! a code frame:
//!
//! ```
//! let err = prisma_schema_syntax::parse("model Foo {").unwrap_err();
//! assert_eq!(err.to_string(), "Expected field definition or '}' at 1:12");
//! assert!(err.render().contains("model Foo {"));
//! ```

pub mod ast;
pub mod combinator;
pub mod error;
mod lexer;
pub mod parser;
pub mod printer;
pub mod span;
pub mod token;

pub use ast::{
    Attribute, BooleanLiteral, ConfigDefinition, ConfigKind, ConfigOption, Definition, Document,
    Expression, FieldDefinition, FieldType, FunctionCall, Identifier, ModelDefinition,
    StringLiteral, TypeModifier,
};
pub use error::{ErrorKind, ParseError, ParseResult};
pub use lexer::{LexError, TokenList};
pub use parser::{parse, unescape_string, MAX_CALL_DEPTH};
pub use printer::{escape_string, print};
pub use span::{Position, Span};
pub use token::{Token, TokenKind};
