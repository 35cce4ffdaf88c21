//! Static component library and tree documents
//!
//! A tree document describes a composed UI as data:
//!
//! ```yaml
//! components:
//!   IconButton:
//!     tag: button
//!     props: { aria-label: "{{label}}" }
//!     children: ["{{children}}"]
//! tree:
//!   component: IconButton
//!   props: { label: Close }
//! ```
//!
//! Component templates are plain nodes. A text node `{{children}}` is
//! replaced by the component's children, a text node `{{name}}` by the text
//! of prop `name`, and a string attribute `{{name}}` by the prop's value.
//! Missing props drop the slot.

use crate::element::{ComponentRef, Element, Node, PropValue, Props};
use crate::resolver::{Render, RenderError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Error reading a tree document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown tree file format: {0}")]
    Format(String),
}

/// Named component templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentLibrary {
    templates: HashMap<String, Node>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    pub fn define(&mut self, name: &str, template: impl Into<Node>) {
        self.templates.insert(name.to_string(), template.into());
    }

    /// Builder form of [`ComponentLibrary::define`]
    pub fn with(mut self, name: &str, template: impl Into<Node>) -> Self {
        self.define(name, template);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Render for ComponentLibrary {
    fn render(&self, component: &ComponentRef) -> Result<Node, RenderError> {
        let template = self
            .templates
            .get(component.component.name())
            .ok_or_else(|| RenderError::UnknownComponent(component.component.name().to_string()))?;
        instantiate(template, component)
    }
}

fn slot(text: &str) -> Option<&str> {
    text.trim()
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .map(str::trim)
}

fn instantiate(template: &Node, component: &ComponentRef) -> Result<Node, RenderError> {
    Ok(match template {
        Node::Text(text) => match slot(text) {
            Some("children") => Node::Fragment(component.children.clone()),
            Some(name) => match component.props.get(name) {
                Some(value) => match value.as_text(name) {
                    Ok(Some(text)) => Node::Text(text.into_owned()),
                    Ok(None) => Node::Empty,
                    Err(e) => {
                        return Err(RenderError::Failed {
                            component: component.component.to_string(),
                            message: e.to_string(),
                        })
                    }
                },
                None => Node::Empty,
            },
            None => template.clone(),
        },
        Node::Element(element) => Node::Element(Element::from_parts(
            &element.tag,
            instantiate_props(&element.props, &component.props),
            instantiate_all(&element.children, component)?,
        )),
        Node::Component(inner) => Node::Component(ComponentRef {
            component: inner.component.clone(),
            props: instantiate_props(&inner.props, &component.props),
            children: instantiate_all(&inner.children, component)?,
        }),
        Node::Fragment(nodes) => Node::Fragment(instantiate_all(nodes, component)?),
        Node::Empty | Node::Number(_) => template.clone(),
    })
}

fn instantiate_all(nodes: &[Node], component: &ComponentRef) -> Result<Vec<Node>, RenderError> {
    nodes.iter().map(|n| instantiate(n, component)).collect()
}

fn instantiate_props(template: &Props, props: &Props) -> Props {
    template
        .iter()
        .filter_map(|(name, value)| match value {
            PropValue::String(s) => match slot(s) {
                Some(key) => props.get(key).map(|v| (name.clone(), v.clone())),
                None => Some((name.clone(), value.clone())),
            },
            _ => Some((name.clone(), value.clone())),
        })
        .collect()
}

/// A tree plus the components it uses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default)]
    pub components: ComponentLibrary,
    pub tree: Node,
}

impl TreeDocument {
    /// Load a document from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let doc = match ext {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => return Err(DocumentError::Format(ext.to_string())),
        };
        log::debug!("loaded tree from {}", path.display());
        Ok(doc)
    }
}
