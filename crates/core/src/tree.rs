//! Content tree shared by the directive pipeline and the range highlighter.
//!
//! Elements, text, and directives that have not been rendered yet make up
//! the tree. Child order is rendering order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SlidemarkError;

/// Ordered property map attached to elements and directives.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A property or directive attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A string value (`key="value"`).
    String(String),
    /// A numeric value (`key=3`).
    Number(f64),
}

impl PropertyValue {
    /// Returns the string payload when this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            PropertyValue::Number(_) => None,
        }
    }

    /// Returns true for the empty string, which renders as a bare attribute.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, PropertyValue::String(value) if value.is_empty())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(value) => f.write_str(value),
            PropertyValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            PropertyValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

/// Merges two property maps; `overrides` wins except for `class`, which is
/// concatenated as `"<base> <override>"` when both sides carry one.
pub fn merge_properties(base: Properties, overrides: Properties) -> Properties {
    let base_class = base.get("class").cloned();
    let override_class = overrides.get("class").cloned();

    let mut merged = base;
    merged.extend(overrides);

    match (base_class, override_class) {
        (Some(base), Some(over)) => {
            merged.insert("class".to_string(), format!("{} {}", base, over).into());
        }
        (Some(base), None) => {
            merged.insert("class".to_string(), base);
        }
        (None, Some(over)) => {
            merged.insert("class".to_string(), over);
        }
        (None, None) => {}
    }

    merged
}

/// The three shapes a directive can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectiveKind {
    /// `:name[label]{attrs}` inside running text.
    Inline,
    /// `::name[label]{attrs}` on its own line.
    Leaf,
    /// `:::name` … `:::` wrapping block content.
    Container,
}

impl DirectiveKind {
    /// Tag for a wrapper that must be valid where the directive was written.
    pub fn block_or_inline_tag(self) -> &'static str {
        match self {
            DirectiveKind::Inline => "span",
            DirectiveKind::Leaf | DirectiveKind::Container => "div",
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Inline => "inline",
            DirectiveKind::Leaf => "leaf",
            DirectiveKind::Container => "container",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectiveKind {
    type Err = SlidemarkError;

    /// Accepts the canonical names as well as the mdast node type names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" | "text" | "textDirective" => Ok(DirectiveKind::Inline),
            "leaf" | "leafDirective" => Ok(DirectiveKind::Leaf),
            "container" | "containerDirective" => Ok(DirectiveKind::Container),
            other => Err(SlidemarkError::UnhandledDirectiveKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    /// Raw (unescaped) text.
    pub value: String,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Attributes, in key order.
    #[serde(default)]
    pub properties: Properties,
    /// Children in rendering order.
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl Element {
    /// Creates an element without properties or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merges properties into the element (see [`merge_properties`]).
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = merge_properties(std::mem::take(&mut self.properties), properties);
        self
    }

    /// Appends a class to the element's class list.
    pub fn class(self, class: impl Into<String>) -> Self {
        let mut extra = Properties::new();
        extra.insert("class".to_string(), PropertyValue::String(class.into()));
        self.properties(extra)
    }

    /// Appends children.
    pub fn children(mut self, children: impl IntoIterator<Item = ContentNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends a single child.
    pub fn child(mut self, child: impl Into<ContentNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Returns true when the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().any(|c| c == class)
    }

    /// Iterates over the whitespace-separated class list.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.properties
            .get("class")
            .and_then(PropertyValue::as_str)
            .unwrap_or_default()
            .split_whitespace()
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(&self.children, &mut buffer);
        buffer
    }
}

/// A directive that has been classified but not rendered yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveNode {
    /// How the directive was written.
    pub kind: DirectiveKind,
    /// Directive name, used as the registry key.
    pub name: String,
    /// Declared attributes.
    #[serde(default)]
    pub attributes: Properties,
    /// Directive content.
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl DirectiveNode {
    /// Creates a directive without attributes or children.
    pub fn new(kind: DirectiveKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Looks up a declared attribute.
    pub fn attribute(&self, key: &str) -> Option<&PropertyValue> {
        self.attributes.get(key)
    }

    /// Plain element view used when no component claims the directive.
    pub fn into_element(self) -> Element {
        Element {
            tag: self.name,
            properties: self.attributes,
            children: self.children,
        }
    }
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentNode {
    /// An element.
    Element(Element),
    /// A text run.
    Text(Text),
    /// An unrendered directive.
    Directive(DirectiveNode),
}

impl ContentNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        ContentNode::Text(Text {
            value: value.into(),
        })
    }

    /// Returns the element when this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ContentNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Child list of elements and directives; text nodes have none.
    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::Element(element) => &element.children,
            ContentNode::Directive(directive) => &directive.children,
            ContentNode::Text(_) => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(std::slice::from_ref(self), &mut buffer);
        buffer
    }
}

impl From<Element> for ContentNode {
    fn from(element: Element) -> Self {
        ContentNode::Element(element)
    }
}

impl From<Text> for ContentNode {
    fn from(text: Text) -> Self {
        ContentNode::Text(text)
    }
}

impl From<DirectiveNode> for ContentNode {
    fn from(directive: DirectiveNode) -> Self {
        ContentNode::Directive(directive)
    }
}

/// Document container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<ContentNode>,
}

impl Root {
    /// Creates a root from top-level nodes.
    pub fn new(children: Vec<ContentNode>) -> Self {
        Self { children }
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(&self.children, &mut buffer);
        buffer
    }
}

fn collect_text(nodes: &[ContentNode], buffer: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text(text) => buffer.push_str(&text.value),
            ContentNode::Element(element) => collect_text(&element.children, buffer),
            ContentNode::Directive(directive) => collect_text(&directive.children, buffer),
        }
    }
}
