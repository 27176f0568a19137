use tracing::debug;

use crate::ast::{
    Attribute, ConfigDefinition, ConfigOption, Definition, Document, Expression,
    FieldDefinition, FieldType, FunctionCall, ModelDefinition,
};

/// Spaces per indentation level.
const INDENT_WIDTH: usize = 2;

/// Minimum gap between a field name and its type.
const TYPE_GAP: usize = 2;

/// Print a document in canonical form.
///
/// Canonical text parses back to a structurally equal document and prints
/// to itself again.
pub fn print(document: &Document) -> String {
    let mut printer = Printer::default();
    print_document(document, &mut printer);
    let output = printer.finish();
    debug!(
        definitions = document.definitions.len(),
        bytes = output.len(),
        "printed schema document"
    );
    output
}

/// Escape `"` as `\"` for a string literal body.
///
/// Only the quote is escaped, so a value whose backslashes would pair up
/// with the closing quote (such as `C:\`) does not survive printing.
/// Every value produced by [`crate::parse`] does.
pub fn escape_string(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Whether `"value"` printed with [`escape_string`] lexes back as a single
/// string literal.
fn is_printable_string(value: &str) -> bool {
    let escaped = escape_string(value);
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return false,
            '\\' if matches!(chars.next(), None | Some('\n')) => return false,
            _ => {}
        }
    }
    true
}

/// Line-oriented output buffer with indentation.
#[derive(Debug, Default)]
struct Printer {
    lines: Vec<String>,
    current: String,
    indentation: usize,
}

impl Printer {
    fn write(&mut self, text: &str) -> &mut Self {
        self.current.push_str(text);
        self
    }

    /// Writes `text` so that it starts at `column` of the current line,
    /// not counting indentation. Never truncates what is already there.
    fn write_aligned(&mut self, text: &str, column: usize) -> &mut Self {
        let width = self.current.chars().count();
        let padding = column.saturating_sub(width);
        self.current.extend(std::iter::repeat(' ').take(padding));
        self.write(text)
    }

    fn new_line(&mut self) -> &mut Self {
        let line = std::mem::take(&mut self.current);
        if line.is_empty() {
            self.lines.push(line);
        } else {
            let indent = " ".repeat(self.indentation * INDENT_WIDTH);
            self.lines.push(indent + &line);
        }
        self
    }

    fn indent(&mut self) -> &mut Self {
        self.indentation += 1;
        self
    }

    /// # Panics
    ///
    /// Panics when the indentation is already zero.
    fn unindent(&mut self) -> &mut Self {
        assert!(self.indentation > 0, "cannot unindent below zero");
        self.indentation -= 1;
        self
    }

    /// Writes `items` with `separator` between them on the current line.
    fn write_separated<T>(
        &mut self,
        items: &[T],
        separator: &str,
        mut print_item: impl FnMut(&T, &mut Self),
    ) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            print_item(item, self);
        }
        self
    }

    /// Writes `items` one per line.
    fn write_lines<T>(&mut self, items: &[T], mut print_item: impl FnMut(&T, &mut Self)) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.new_line();
            }
            print_item(item, self);
        }
        self
    }

    fn finish(mut self) -> String {
        if !self.current.is_empty() {
            self.new_line();
        }
        self.lines.join("\n")
    }
}

fn print_document(document: &Document, printer: &mut Printer) {
    printer.write_lines(&document.definitions, print_definition);
    printer.new_line();
}

fn print_definition(definition: &Definition, printer: &mut Printer) {
    match definition {
        Definition::Model(model) => print_model(model, printer),
        Definition::Config(config) => print_config(config, printer),
    }
}

/// Block header, indented body, closing brace. The line after the brace is
/// left open so consecutive definitions get a blank line between them.
fn print_block<T>(
    printer: &mut Printer,
    header: &[&str],
    body: &[T],
    print_item: impl FnMut(&T, &mut Printer),
) {
    for part in header {
        printer.write(part);
    }
    printer.write(" {").new_line();
    if !body.is_empty() {
        printer.indent().write_lines(body, print_item).new_line().unindent();
    }
    printer.write("}").new_line();
}

fn print_model(model: &ModelDefinition, printer: &mut Printer) {
    let type_column = model
        .fields
        .iter()
        .map(|field| field.name.as_str().chars().count())
        .max()
        .unwrap_or(0)
        + TYPE_GAP;

    print_block(
        printer,
        &["model ", model.name.as_str()],
        &model.fields,
        |field, printer| print_field(field, type_column, printer),
    );
}

fn print_field(field: &FieldDefinition, type_column: usize, printer: &mut Printer) {
    printer.write(field.name.as_str()).write("  ");
    print_type(&field.field_type, type_column, printer);
    for attribute in &field.attributes {
        printer.write(" ");
        print_attribute(attribute, printer);
    }
}

fn print_type(field_type: &FieldType, type_column: usize, printer: &mut Printer) {
    printer
        .write_aligned(field_type.name.as_str(), type_column)
        .write(field_type.modifier.suffix());
}

fn print_attribute(attribute: &Attribute, printer: &mut Printer) {
    printer.write(&attribute.name);
    if !attribute.arguments.is_empty() {
        print_arguments(&attribute.arguments, printer);
    }
}

fn print_config(config: &ConfigDefinition, printer: &mut Printer) {
    print_block(
        printer,
        &[config.kind.keyword(), " ", config.name.as_str()],
        &config.options,
        print_config_option,
    );
}

fn print_config_option(option: &ConfigOption, printer: &mut Printer) {
    printer.write(option.key.as_str()).write(" = ");
    print_expression(&option.value, printer);
}

fn print_expression(expression: &Expression, printer: &mut Printer) {
    match expression {
        Expression::Boolean(literal) => {
            printer.write(if literal.value { "true" } else { "false" });
        }
        Expression::String(literal) => {
            debug_assert!(
                is_printable_string(&literal.value),
                "string value {:?} cannot be printed as a literal",
                literal.value
            );
            printer
                .write("\"")
                .write(&escape_string(&literal.value))
                .write("\"");
        }
        Expression::FunctionCall(call) => print_function_call(call, printer),
    }
}

fn print_function_call(call: &FunctionCall, printer: &mut Printer) {
    printer.write(call.name.as_str());
    print_arguments(&call.arguments, printer);
}

fn print_arguments(arguments: &[Expression], printer: &mut Printer) {
    printer
        .write("(")
        .write_separated(arguments, ", ", print_expression)
        .write(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BooleanLiteral, ConfigKind, Identifier, StringLiteral, TypeModifier,
    };
    use crate::parser::parse;
    use crate::span::Span;

    fn ident(name: &str) -> Identifier {
        Identifier {
            name: name.to_string(),
            span: Span::default(),
        }
    }

    fn field(name: &str, type_name: &str, modifier: TypeModifier) -> FieldDefinition {
        FieldDefinition {
            name: ident(name),
            field_type: FieldType {
                name: ident(type_name),
                modifier,
                span: Span::default(),
            },
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    fn document(definitions: Vec<Definition>) -> Document {
        Document {
            definitions,
            span: Span::default(),
        }
    }

    fn reprint(source: &str) -> String {
        print(&parse(source).expect("parse should succeed"))
    }

    // -- Printer buffer --

    #[test]
    fn new_line_indents_non_empty_lines_only() {
        let mut printer = Printer::default();
        printer.indent().write("a").new_line().new_line().write("b");
        assert_eq!(printer.finish(), "  a\n\n  b");
    }

    #[test]
    fn write_aligned_pads_to_the_column() {
        let mut printer = Printer::default();
        printer.write("id").write_aligned("Int", 6);
        assert_eq!(printer.finish(), "id    Int");
    }

    #[test]
    fn write_aligned_never_truncates() {
        let mut printer = Printer::default();
        printer.write("identifier").write_aligned("Int", 4);
        assert_eq!(printer.finish(), "identifierInt");
    }

    #[test]
    fn write_aligned_ignores_indentation() {
        let mut printer = Printer::default();
        printer.indent().write("ab").write_aligned("c", 4);
        assert_eq!(printer.finish(), "  ab  c");
    }

    #[test]
    fn write_separated_joins_items() {
        let mut printer = Printer::default();
        printer.write_separated(&["a", "b", "c"], ", ", |item, p| {
            p.write(item);
        });
        assert_eq!(printer.finish(), "a, b, c");
    }

    #[test]
    #[should_panic(expected = "cannot unindent below zero")]
    fn unindent_below_zero_panics() {
        Printer::default().unindent();
    }

    // -- Documents --

    #[test]
    fn empty_document_prints_nothing() {
        assert_eq!(print(&document(vec![])), "");
    }

    #[test]
    fn empty_model_block() {
        assert_eq!(reprint("model Foo {}"), "model Foo {\n}\n");
    }

    #[test]
    fn empty_config_block() {
        assert_eq!(reprint("generator client {}"), "generator client {\n}\n");
    }

    #[test]
    fn definitions_are_separated_by_a_blank_line() {
        assert_eq!(
            reprint("model A {} model B {}"),
            "model A {\n}\n\nmodel B {\n}\n"
        );
    }

    #[test]
    fn fields_are_indented_and_types_aligned() {
        let model = ModelDefinition {
            name: ident("User"),
            fields: vec![
                field("short", "Int", TypeModifier::None),
                field("loooong", "String", TypeModifier::Optional),
            ],
            span: Span::default(),
        };
        let output = print(&document(vec![Definition::Model(model)]));
        assert_eq!(
            output,
            "model User {\n  short    Int\n  loooong  String?\n}\n"
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1].find("Int"), lines[2].find("String"));
    }

    #[test]
    fn alignment_counts_characters() {
        let model = ModelDefinition {
            name: ident("M"),
            fields: vec![
                field("straße", "String", TypeModifier::None),
                field("a", "Int", TypeModifier::Array),
            ],
            span: Span::default(),
        };
        assert_eq!(
            print(&document(vec![Definition::Model(model)])),
            "model M {\n  straße  String\n  a       Int[]\n}\n"
        );
    }

    #[test]
    fn attributes_follow_the_type() {
        assert_eq!(
            reprint(r#"model Post { id Int @id @default(autoincrement()) title String @map("t", true) }"#),
            "model Post {\n  id     Int @id @default(autoincrement())\n  title  String @map(\"t\", true)\n}\n"
        );
    }

    #[test]
    fn attribute_with_empty_argument_list_prints_bare() {
        assert_eq!(
            reprint("model Foo { id Int @default() }"),
            "model Foo {\n  id  Int @default\n}\n"
        );
    }

    #[test]
    fn config_options_print_as_assignments() {
        let config = ConfigDefinition {
            kind: ConfigKind::Datasource,
            name: ident("db"),
            options: vec![
                ConfigOption {
                    key: ident("provider"),
                    value: Expression::String(StringLiteral {
                        value: "postgresql".to_string(),
                        span: Span::default(),
                    }),
                    span: Span::default(),
                },
                ConfigOption {
                    key: ident("enabled"),
                    value: Expression::Boolean(BooleanLiteral {
                        value: false,
                        span: Span::default(),
                    }),
                    span: Span::default(),
                },
            ],
            span: Span::default(),
        };
        assert_eq!(
            print(&document(vec![Definition::Config(config)])),
            "datasource db {\n  provider = \"postgresql\"\n  enabled = false\n}\n"
        );
    }

    #[test]
    fn nested_function_calls_round_trip() {
        let source = "generator g {\n  a = outer(inner(true), \"x\")\n}\n";
        assert_eq!(reprint(source), source);
    }

    #[test]
    fn string_quotes_are_escaped() {
        let source = "datasource db {\n  url = \"say \\\"hi\\\"\"\n}\n";
        assert_eq!(reprint(source), source);
        assert_eq!(escape_string(r#"a"b"#), r#"a\"b"#);
    }

    #[test]
    fn parsed_backslashes_print_back_unchanged() {
        let source = "datasource db {\n  path = \"C:\\\\\"\n  quoted = \"\\\\\\\"x\"\n}\n";
        assert_eq!(reprint(source), source);
    }

    #[test]
    fn printable_strings() {
        assert!(is_printable_string("plain"));
        assert!(is_printable_string(r#"say "hi""#));
        assert!(is_printable_string(r"C:\\"));
        assert!(!is_printable_string(r"C:\"));
        assert!(!is_printable_string(r#"\""#));
        assert!(!is_printable_string("two\nlines"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cannot be printed as a literal")]
    fn unprintable_string_value_is_caught() {
        let literal = Expression::String(crate::ast::StringLiteral {
            value: r"C:\".to_string(),
            span: crate::span::Span::default(),
        });
        let mut printer = Printer::default();
        print_expression(&literal, &mut printer);
    }

    #[test]
    fn messy_input_is_normalized() {
        assert_eq!(
            reprint("model   User{id Int   @id\n\n\n  name  String?}datasource db{url=env(\"URL\")}"),
            "model User {\n  id    Int @id\n  name  String?\n}\n\ndatasource db {\n  url = env(\"URL\")\n}\n"
        );
    }
}
