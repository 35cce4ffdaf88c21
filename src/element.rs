//! Virtual element model
//!
//! Trees reach the linter already constructed by the host library. A tree is
//! made of [`Node`]s: host elements with a tag, props and children, composite
//! component references whose output is only reachable through a
//! [`Render`](crate::resolver::Render) capability, and leaf content.
//!
//! The same types deserialize from JSON/YAML descriptor files:
//!
//! ```json
//! { "tag": "button", "props": { "onClick": { "$handler": "save" } },
//!   "children": ["Save", null, { "component": "Icon", "props": { "name": "disk" } }] }
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use thiserror::Error;

/// Element props keyed by attribute name. Ordered so that two equal prop sets
/// always serialize to the same key.
pub type Props = BTreeMap<String, PropValue>;

/// Host tags rendered without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// An attribute could not be read in the shape a rule asked for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute `{attribute}` holds {found}, expected text")]
pub struct AttrError {
    pub attribute: String,
    pub found: &'static str,
}

/// Reference to an event handler. Only its presence matters to the rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Handler {
    #[serde(rename = "$handler")]
    pub name: String,
}

/// A single prop value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Handler(Handler),
    /// Objects and arrays such as `style` or a `className` list
    Other(serde_json::Value),
}

impl PropValue {
    /// Create a handler value
    pub fn handler(name: &str) -> Self {
        PropValue::Handler(Handler {
            name: name.to_string(),
        })
    }

    /// Read the value as attribute text.
    ///
    /// Bools and numbers coerce to the string the host would write into the
    /// DOM (`tabIndex={0}` reads as `"0"`). `Null` reads as absent.
    pub fn as_text(&self, attribute: &str) -> Result<Option<Cow<'_, str>>, AttrError> {
        match self {
            PropValue::Null => Ok(None),
            PropValue::Bool(b) => Ok(Some(Cow::Borrowed(if *b { "true" } else { "false" }))),
            PropValue::Number(n) => Ok(Some(Cow::Owned(format_number(*n)))),
            PropValue::String(s) => Ok(Some(Cow::Borrowed(s.as_str()))),
            PropValue::Handler(_) => Err(AttrError {
                attribute: attribute.to_string(),
                found: "a handler",
            }),
            PropValue::Other(value) => Err(AttrError {
                attribute: attribute.to_string(),
                found: if value.is_array() { "an array" } else { "an object" },
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Number(n as f64)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(f64::from(n))
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Identity of a composite component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentType(String);

impl ComponentType {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node in a virtual element tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "RawNode")]
pub enum Node {
    /// `null` / `undefined` / `true` / `false` children
    Empty,
    Text(String),
    Number(f64),
    Element(Element),
    Component(ComponentRef),
    Fragment(Vec<Node>),
}

/// Descriptor shapes accepted from tree files. Booleans left behind by
/// conditional children (`cond && <X/>`) render nothing.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Empty,
    Bool(bool),
    Text(String),
    Number(f64),
    Element(Element),
    Component(ComponentRef),
    Fragment(Vec<Node>),
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        match raw {
            RawNode::Empty | RawNode::Bool(_) => Node::Empty,
            RawNode::Text(s) => Node::Text(s),
            RawNode::Number(n) => Node::Number(n),
            RawNode::Element(e) => Node::Element(e),
            RawNode::Component(c) => Node::Component(c),
            RawNode::Fragment(nodes) => Node::Fragment(nodes),
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<ComponentRef> for Node {
    fn from(c: ComponentRef) -> Self {
        Node::Component(c)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::Fragment(nodes)
    }
}

/// A host (intrinsic) element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no props or children
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Create an element from the pieces a host passes to its constructor
    pub fn from_parts(tag: &str, props: Props, children: Vec<Node>) -> Self {
        Self {
            tag: tag.to_string(),
            props,
            children,
        }
    }

    /// Set a prop
    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Set a handler prop such as `onClick`
    pub fn with_handler(mut self, name: &str) -> Self {
        self.props.insert(name.to_string(), PropValue::handler(name));
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append an empty (`null`) child
    pub fn with_empty_child(mut self) -> Self {
        self.children.push(Node::Empty);
        self
    }

    /// Check the tag name, ignoring ASCII case
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Whether a prop is set to a non-null value
    pub fn has(&self, name: &str) -> bool {
        self.props.get(name).is_some_and(|v| !v.is_null())
    }

    /// Read a prop as attribute text. Absent and `null` props read as `None`.
    pub fn attr(&self, name: &str) -> Result<Option<Cow<'_, str>>, AttrError> {
        match self.props.get(name) {
            Some(value) => value.as_text(name),
            None => Ok(None),
        }
    }

    /// Whether an attribute reads as exactly `expected`
    pub fn attr_is(&self, name: &str, expected: &str) -> Result<bool, AttrError> {
        Ok(self.attr(name)?.is_some_and(|v| v == expected))
    }

    /// Whether an attribute is present with non-whitespace text
    pub fn attr_non_empty(&self, name: &str) -> Result<bool, AttrError> {
        Ok(self.attr(name)?.is_some_and(|v| !v.trim().is_empty()))
    }

    /// The `id` attribute, when it is readable text
    pub fn id(&self) -> Option<String> {
        self.attr("id").ok().flatten().map(Cow::into_owned)
    }
}

impl fmt::Display for Element {
    /// Serialize as markup, the way a DOM node's `outerHTML` reads
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.props {
            if name == "children" || value.is_handler() {
                continue;
            }
            let Ok(Some(text)) = value.as_text(name) else {
                continue;
            };
            let name = match name.as_str() {
                "className" => "class",
                "htmlFor" => "for",
                other => other,
            };
            write!(f, " {}=\"{}\"", name, escape(&text))?;
        }
        if VOID_TAGS.iter().any(|t| self.is(t)) && self.children.is_empty() {
            return f.write_char('>');
        }
        f.write_char('>')?;
        for child in &self.children {
            write_node(f, child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    match node {
        Node::Empty => Ok(()),
        Node::Text(s) => f.write_str(&escape(s)),
        Node::Number(n) => f.write_str(&format_number(*n)),
        Node::Element(e) => write!(f, "{}", e),
        Node::Component(c) => {
            write!(f, "<{}>", c.component)?;
            for child in &c.children {
                write_node(f, child)?;
            }
            write!(f, "</{}>", c.component)
        }
        Node::Fragment(nodes) => nodes.iter().try_for_each(|n| write_node(f, n)),
    }
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// A use of a composite component inside a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub component: ComponentType,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ComponentRef {
    pub fn new(name: &str) -> Self {
        Self {
            component: ComponentType::new(name),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}
