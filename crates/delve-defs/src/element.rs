use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// A namespaced markup name. The namespace is the resolved URI, not the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    /// Namespace URI, or `None` for unqualified names.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl Name {
    /// An unqualified name.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// A name in the given namespace URI.
    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Returns the namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: Name,
    /// Attribute value with character references decoded.
    pub value: String,
}

/// One node of a parsed definition tree.
///
/// Attributes and children keep their document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element name.
    pub name: Name,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    /// Location in the source the element was read from.
    #[serde(skip)]
    pub span: Span,
}

impl Element {
    /// Create an empty element with the given name.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
            span: 0..0,
        }
    }

    /// Create an empty unqualified element.
    pub fn named(local: impl Into<String>) -> Self {
        Self::new(Name::local(local))
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: Name, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name,
            value: value.into(),
        });
        self
    }

    /// Add a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set the character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// The element's local name, used as the dispatch key.
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Value of the first unqualified attribute with this local name.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// First child with this local name, in any namespace.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.local == local)
    }

    /// Character data with surrounding whitespace removed.
    pub fn value(&self) -> &str {
        self.text.trim()
    }

    /// Parse the trimmed character data.
    pub fn parse_value<T: FromStr>(&self) -> Result<T, T::Err> {
        self.value().parse()
    }

    /// Total number of elements in this subtree, including `self`.
    pub fn descendant_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Element::descendant_count)
            .sum::<usize>()
    }
}
