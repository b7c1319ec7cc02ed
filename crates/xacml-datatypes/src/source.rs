//! Untyped inputs to datatype conversion.

use std::borrow::Cow;

use crate::identifiers::Identifier;
use crate::value::Value;

/// A text node lifted out of a request document, with the category of the
/// attribute it was found under.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub category: Option<Identifier>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: Identifier) -> Self {
        self.category = Some(category);
        self
    }
}

/// Anything a datatype can be asked to convert.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Text(String),
    /// Raw bytes; only the binary datatypes accept these.
    Bytes(Vec<u8>),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// An already-typed value.
    Value(Value),
    Node(TextNode),
    /// Several sources read as one: a single element stands for itself,
    /// otherwise their texts are concatenated.
    Sequence(Vec<Source>),
}

impl Source {
    /// Short name of the source kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Value(value) => value.type_name(),
            Self::Node(_) => "node",
            Self::Sequence(_) => "sequence",
        }
    }

    /// Collapses single-element sequences to their element.
    pub fn flatten(&self) -> &Source {
        match self {
            Self::Sequence(items) if items.len() == 1 => items[0].flatten(),
            other => other,
        }
    }

    /// The category carried by a node source, if any.
    pub fn category(&self) -> Option<&Identifier> {
        match self.flatten() {
            Self::Node(node) => node.category.as_ref(),
            _ => None,
        }
    }

    /// The textual reading of the source, or `None` when it has none.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Node(node) => Some(Cow::Borrowed(&node.text)),
            Self::Integer(v) => Some(Cow::Owned(v.to_string())),
            Self::Double(v) => Some(Cow::Owned(crate::builtin::render_double(*v))),
            Self::Boolean(v) => Some(Cow::Borrowed(if *v { "true" } else { "false" })),
            Self::Value(value) => Some(Cow::Owned(value.to_string())),
            Self::Bytes(_) => None,
            Self::Sequence(items) => match items.as_slice() {
                [single] => single.to_text(),
                items => items
                    .iter()
                    .map(Source::to_text)
                    .collect::<Option<Vec<_>>>()
                    .map(|parts| Cow::Owned(parts.concat())),
            },
        }
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Source {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Source {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Source {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<u8>> for Source {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<TextNode> for Source {
    fn from(value: TextNode) -> Self {
        Self::Node(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_sequence_is_its_element() {
        let source = Source::Sequence(vec![Source::Integer(7)]);
        assert_eq!(source.flatten(), &Source::Integer(7));
        assert_eq!(source.to_text().as_deref(), Some("7"));
    }

    #[test]
    fn multi_element_sequence_concatenates() {
        let source = Source::Sequence(vec![
            Source::Node(TextNode::new("2014-02-")),
            Source::Text("28".into()),
        ]);
        assert_eq!(source.to_text().as_deref(), Some("2014-02-28"));
    }

    #[test]
    fn bytes_have_no_text() {
        assert_eq!(Source::Bytes(vec![1, 2]).to_text(), None);
        let mixed = Source::Sequence(vec![Source::Text("a".into()), Source::Bytes(vec![])]);
        assert_eq!(mixed.to_text(), None);
    }

    #[test]
    fn category_comes_from_nodes() {
        let category = Identifier::new("urn:oasis:names:tc:xacml:3.0:attribute-category:resource");
        let node = Source::Node(TextNode::new("x").with_category(category.clone()));
        assert_eq!(node.category(), Some(&category));
        assert_eq!(Source::Sequence(vec![node]).category(), Some(&category));
        assert_eq!(Source::Text("x".into()).category(), None);
    }
}
