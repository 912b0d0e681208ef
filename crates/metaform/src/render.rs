//! textual rendering
//!
//! Blocks render to lines. Basic properties (literals, references, lists, maps) come first with their `=` aligned
//! on the longest property name of the block, nested blocks included. Nested blocks follow one indentation level
//! deeper.
//!
//! Inside lists and maps there is no room for block syntax. There a `property` or `map` block is written as an
//! object of its properties, any other block as its identity.
use crate::block::Block;
use crate::value::{Literal, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// One level of indentation
pub const TAB: &str = "  ";

/// Maps with fewer entry lines than this are collapsed onto one line
const COLLAPSE_BELOW: usize = 4;

impl Block {
    /// Render this block indented by `pad` levels
    pub fn render(&self, pad: usize) -> Vec<String> {
        let indent = TAB.repeat(pad);
        let mut lines = vec![];

        if let Some(comment) = &self.comment {
            lines.push(format!("{indent}# {comment}"));
        }
        lines.push(format!("{indent}{}", self.header()));

        let basic: Vec<_> = self
            .properties
            .iter()
            .filter(|(_, value)| !matches!(value, Value::Nested(_)))
            .collect();
        let width = key_width(self.properties.keys());
        lines.extend(property_lines(&basic, width, &format!("{indent}{TAB}"), self.tomap));

        for value in self.properties.values() {
            if let Value::Nested(nested) = value {
                lines.extend(nested.render(pad + 1));
            }
        }

        lines.push(format!("{indent}}}"));
        lines
    }

    fn header(&self) -> String {
        let mut parts: Vec<String> = vec![];
        if !self.keyword.is_empty() {
            parts.push(self.keyword.clone());
        }
        parts.extend(self.labels.iter().map(|label| quote(label)));
        parts.push(if self.assignment { "= {" } else { "{" }.to_string());
        parts.join(" ")
    }
}

/// Render blocks in the given order, separated by blank lines
pub fn document(blocks: &[Arc<Block>]) -> String {
    blocks
        .iter()
        .map(|block| block.render(0).join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `key = value` lines with aligned `=`
///
/// Values spanning several lines continue below the column after `= `.
fn property_lines(
    entries: &[(&String, &Value)],
    width: usize,
    indent: &str,
    tomap: bool,
) -> Vec<String> {
    let mut lines = vec![];
    for (key, value) in entries {
        let prefix = format!("{indent}{:<width$} = ", key_repr(key));
        let continuation = " ".repeat(prefix.chars().count());

        let mut value_lines = value_lines(value, tomap).into_iter();
        if let Some(first) = value_lines.next() {
            lines.push(format!("{prefix}{first}"));
        }
        lines.extend(value_lines.map(|line| format!("{continuation}{line}")));
    }
    lines
}

fn key_width<'a>(keys: impl IntoIterator<Item = &'a String>) -> usize {
    keys.into_iter()
        .map(|key| key_repr(key).chars().count())
        .max()
        .unwrap_or(0)
}

fn value_lines(value: &Value, tomap: bool) -> Vec<String> {
    match value {
        Value::Map(entries) => map_lines(entries, tomap),
        value => vec![inline(value, tomap)],
    }
}

/// A map is laid out like the body of an anonymous block, inside the map wrapper
fn map_lines(entries: &indexmap::IndexMap<String, Value>, tomap: bool) -> Vec<String> {
    let (open, close) = map_wrapper(tomap);
    let entries: Vec<_> = entries.iter().collect();
    let width = key_width(entries.iter().map(|(key, _)| *key));
    let inner = property_lines(&entries, width, TAB, tomap);

    if inner.len() < COLLAPSE_BELOW {
        return vec![collapsed_map(&entries, tomap)];
    }

    let mut lines = Vec::with_capacity(inner.len() + 2);
    lines.push(open.to_string());
    lines.extend(inner);
    lines.push(close.to_string());
    lines
}

fn collapsed_map(entries: &[(&String, &Value)], tomap: bool) -> String {
    let (open, close) = map_wrapper(tomap);
    if entries.is_empty() {
        return format!("{open}{close}");
    }

    let body = entries
        .iter()
        .map(|(key, value)| format!("{} = {}", key_repr(key), inline(value, tomap)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{open} {body} {close}")
}

fn map_wrapper(tomap: bool) -> (&'static str, &'static str) {
    if tomap {
        ("tomap({", "})")
    } else {
        ("{", "}")
    }
}

/// Single line form of a value
fn inline(value: &Value, tomap: bool) -> String {
    match value {
        Value::Literal(literal) => literal.to_string(),
        Value::Reference(reference) => reference.to_string(),
        Value::List(items) => {
            let items: Vec<_> = items.iter().map(|item| inline(item, tomap)).collect();
            format!("tolist([{}])", items.join(","))
        }
        Value::Map(entries) => collapsed_map(&entries.iter().collect::<Vec<_>>(), tomap),
        Value::Nested(block) if block.kind().is_scheduled() => block.identity().to_string(),
        Value::Nested(block) => {
            collapsed_map(&block.properties.iter().collect::<Vec<_>>(), block.tomap)
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => f.write_str(&quote(s)),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Decimal(d) => write!(f, "{d:?}"),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}

fn quote(s: &str) -> String {
    hcl::Expression::String(s.to_string()).to_string()
}

/// Map keys which are not identifiers have to be quoted
fn key_repr(key: &str) -> Cow<'_, str> {
    if hcl::Identifier::new(key).is_ok() {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(quote(key))
    }
}
