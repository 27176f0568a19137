//! Syntax tree produced by [`crate::parse`] and consumed by [`crate::print`].
//!
//! Every node records the [`Span`] it was parsed from. Spans are for
//! diagnostics only: `structurally_eq` compares two trees while ignoring
//! them, which is what round-trip checks need.

use serde::Serialize;

use crate::span::Span;

/// A whole schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub span: Span,
}

impl Document {
    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Model(model) => Some(model),
            Definition::Config(_) => None,
        })
    }

    pub fn configs(&self) -> impl Iterator<Item = &ConfigDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Config(config) => Some(config),
            Definition::Model(_) => None,
        })
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        all_structurally_eq(&self.definitions, &other.definitions, Definition::structurally_eq)
    }
}

/// A top-level block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Definition {
    Model(ModelDefinition),
    Config(ConfigDefinition),
}

impl Definition {
    pub fn name(&self) -> &Identifier {
        match self {
            Self::Model(model) => &model.name,
            Self::Config(config) => &config.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Model(model) => model.span,
            Self::Config(config) => config.span,
        }
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Model(a), Self::Model(b)) => a.structurally_eq(b),
            (Self::Config(a), Self::Config(b)) => a.structurally_eq(b),
            _ => false,
        }
    }
}

/// `model Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDefinition {
    pub name: Identifier,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
}

impl ModelDefinition {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name.structurally_eq(&other.name)
            && all_structurally_eq(&self.fields, &other.fields, FieldDefinition::structurally_eq)
    }
}

/// One line of a model body: `name Type @attr(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: Identifier,
    pub field_type: FieldType,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

impl FieldDefinition {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name.structurally_eq(&other.name)
            && self.field_type.structurally_eq(&other.field_type)
            && all_structurally_eq(&self.attributes, &other.attributes, Attribute::structurally_eq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    pub name: Identifier,
    pub modifier: TypeModifier,
    pub span: Span,
}

impl FieldType {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name.structurally_eq(&other.name) && self.modifier == other.modifier
    }
}

/// The optional suffix of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeModifier {
    #[default]
    None,
    /// `Type[]`
    Array,
    /// `Type?`
    Optional,
}

impl TypeModifier {
    /// The source suffix for this modifier.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Array => "[]",
            Self::Optional => "?",
        }
    }
}

/// `@name` or `@name(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// The attribute token text, leading `@` included.
    pub name: String,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

impl Attribute {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && all_structurally_eq(&self.arguments, &other.arguments, Expression::structurally_eq)
    }
}

/// `datasource name { ... }` or `generator name { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDefinition {
    pub kind: ConfigKind,
    pub name: Identifier,
    pub options: Vec<ConfigOption>,
    pub span: Span,
}

impl ConfigDefinition {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name.structurally_eq(&other.name)
            && all_structurally_eq(&self.options, &other.options, ConfigOption::structurally_eq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    Datasource,
    Generator,
}

impl ConfigKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Datasource => "datasource",
            Self::Generator => "generator",
        }
    }
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// `key = value` inside a config block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigOption {
    pub key: Identifier,
    pub value: Expression,
    pub span: Span,
}

impl ConfigOption {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.key.structurally_eq(&other.key) && self.value.structurally_eq(&other.value)
    }
}

/// A value in an attribute argument list or a config option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    String(StringLiteral),
    Boolean(BooleanLiteral),
    FunctionCall(FunctionCall),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Self::String(literal) => literal.span,
            Self::Boolean(literal) => literal.span,
            Self::FunctionCall(call) => call.span,
        }
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a.value == b.value,
            (Self::Boolean(a), Self::Boolean(b)) => a.value == b.value,
            (Self::FunctionCall(a), Self::FunctionCall(b)) => a.structurally_eq(b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    /// Content between the quotes with `\"` unescaped.
    ///
    /// Values built by hand must still print as a literal: no newline, and
    /// no unpaired `\` before a quote or at the end. See
    /// [`escape_string`](crate::escape_string).
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

/// `name(arg, ...)`; arguments may nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub name: Identifier,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

impl FunctionCall {
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name.structurally_eq(&other.name)
            && all_structurally_eq(&self.arguments, &other.arguments, Expression::structurally_eq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn all_structurally_eq<T>(a: &[T], b: &[T], eq: fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq(x, y))
}
