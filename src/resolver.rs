//! Accessible-name resolution
//!
//! Decides whether an element's rendered content exposes any text an
//! assistive technology could announce. Composite components are expanded
//! through a caller-provided [`Render`] capability. All expansions made while
//! evaluating one tree go through a single [`RenderPass`], which renders each
//! distinct (component type, props) pair at most once and refuses to descend
//! into a component that is already being expanded.

use crate::aria;
use crate::element::{ComponentRef, ComponentType, Element, Node};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

/// Maximum number of nested component expansions followed in one branch
pub const MAX_RENDER_DEPTH: usize = 64;

/// A composite component could not produce its output
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    #[error("component `{component}` failed to render: {message}")]
    Failed { component: String, message: String },
}

/// Produces a composite component's output tree
pub trait Render {
    fn render(&self, component: &ComponentRef) -> Result<Node, RenderError>;
}

impl<F> Render for F
where
    F: Fn(&ComponentRef) -> Result<Node, RenderError>,
{
    fn render(&self, component: &ComponentRef) -> Result<Node, RenderError> {
        self(component)
    }
}

/// Renderer for trees that contain no composite components
#[derive(Debug, Default, Clone, Copy)]
pub struct NoComponents;

impl Render for NoComponents {
    fn render(&self, component: &ComponentRef) -> Result<Node, RenderError> {
        Err(RenderError::UnknownComponent(
            component.component.name().to_string(),
        ))
    }
}

/// Cache key: component identity plus props (and children) by value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    component: ComponentType,
    props: String,
}

impl RenderKey {
    pub fn of(component: &ComponentRef) -> Self {
        let props = serde_json::to_string(&(&component.props, &component.children))
            .unwrap_or_else(|_| format!("{:?}", (&component.props, &component.children)));
        Self {
            component: component.component.clone(),
            props,
        }
    }
}

#[derive(Debug, Clone)]
enum Expansion {
    Rendered(Rc<Node>),
    Failed,
}

/// Render cache and expansion stack for one tree evaluation
pub struct RenderPass<'r> {
    renderer: &'r dyn Render,
    cache: HashMap<RenderKey, Expansion>,
    active: Vec<RenderKey>,
    renders: usize,
}

impl<'r> RenderPass<'r> {
    pub fn new(renderer: &'r dyn Render) -> Self {
        Self {
            renderer,
            cache: HashMap::new(),
            active: Vec::new(),
            renders: 0,
        }
    }

    /// Number of times the renderer has been invoked in this pass
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Render a component, or return its cached output.
    /// Failed renders are cached too and yield `None`.
    fn expand_key(&mut self, key: &RenderKey, component: &ComponentRef) -> Option<Rc<Node>> {
        if let Some(cached) = self.cache.get(key) {
            log::trace!("render cache hit for `{}`", component.component);
            return match cached {
                Expansion::Rendered(node) => Some(Rc::clone(node)),
                Expansion::Failed => None,
            };
        }

        self.renders += 1;
        let expansion = match self.renderer.render(component) {
            Ok(node) => Expansion::Rendered(Rc::new(node)),
            Err(e) => {
                log::debug!("{}; treating it as having no content", e);
                Expansion::Failed
            }
        };
        self.cache.insert(key.clone(), expansion.clone());

        match expansion {
            Expansion::Rendered(node) => Some(node),
            Expansion::Failed => None,
        }
    }

    /// Start descending into a component's output.
    ///
    /// Returns `None` when the component cannot be rendered, is already being
    /// expanded further up this branch, or the branch is too deep. Every
    /// `Some` must be paired with a call to [`RenderPass::leave`].
    pub fn enter(&mut self, component: &ComponentRef) -> Option<Rc<Node>> {
        let key = RenderKey::of(component);
        if self.active.contains(&key) {
            log::warn!(
                "component `{}` renders itself with the same props; not descending again",
                component.component
            );
            return None;
        }
        if self.active.len() >= MAX_RENDER_DEPTH {
            log::warn!(
                "component nesting deeper than {} at `{}`; not descending further",
                MAX_RENDER_DEPTH,
                component.component
            );
            return None;
        }

        let output = self.expand_key(&key, component)?;
        self.active.push(key);
        Some(output)
    }

    /// Finish descending into the component most recently entered
    pub fn leave(&mut self) {
        self.active.pop();
    }

    /// Whether the element's rendered content exposes an accessible name
    pub fn has_accessible_name(&mut self, element: &Element) -> bool {
        match aria::has_own_name(element) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => log::debug!("ignoring unreadable naming attribute on <{}>: {}", element.tag, e),
        }
        self.any_contributes(&element.children)
    }

    fn any_contributes(&mut self, nodes: &[Node]) -> bool {
        nodes.iter().any(|node| self.contributes(node))
    }

    fn contributes(&mut self, node: &Node) -> bool {
        match node {
            Node::Empty => false,
            Node::Text(text) => !text.trim().is_empty(),
            Node::Number(_) => true,
            Node::Element(element) => self.has_accessible_name(element),
            Node::Fragment(nodes) => self.any_contributes(nodes),
            Node::Component(component) => match self.enter(component) {
                Some(output) => {
                    let named = self.contributes(&output);
                    self.leave();
                    named
                }
                None => false,
            },
        }
    }

    /// Collect the ids that named `<label htmlFor>` elements point at in
    /// the composed tree
    pub fn label_targets(&mut self, root: &Node) -> HashSet<String> {
        let mut targets = HashSet::new();
        self.collect_label_targets(root, &mut targets);
        targets
    }

    fn collect_label_targets(&mut self, node: &Node, targets: &mut HashSet<String>) {
        match node {
            Node::Element(element) => {
                if element.is("label") && self.has_accessible_name(element) {
                    for attr in ["htmlFor", "for"] {
                        if let Ok(Some(id)) = element.attr(attr) {
                            let id = id.trim();
                            if !id.is_empty() {
                                targets.insert(id.to_string());
                            }
                        }
                    }
                }
                for child in &element.children {
                    self.collect_label_targets(child, targets);
                }
            }
            Node::Fragment(nodes) => {
                for child in nodes {
                    self.collect_label_targets(child, targets);
                }
            }
            Node::Component(component) => {
                if let Some(output) = self.enter(component) {
                    self.collect_label_targets(&output, targets);
                    self.leave();
                }
            }
            Node::Empty | Node::Text(_) | Node::Number(_) => {}
        }
    }
}

/// Whether `element` exposes an accessible name, expanding components with
/// `render`. Uses a fresh render cache.
pub fn has_accessible_name(element: &Element, render: &dyn Render) -> bool {
    RenderPass::new(render).has_accessible_name(element)
}

/// What a label rule can see about the element under test
pub struct LabelContext<'a, 'r> {
    pass: &'a mut RenderPass<'r>,
    label_targets: &'a HashSet<String>,
    inside_named_label: bool,
}

impl<'a, 'r> LabelContext<'a, 'r> {
    pub fn new(
        pass: &'a mut RenderPass<'r>,
        label_targets: &'a HashSet<String>,
        inside_named_label: bool,
    ) -> Self {
        Self {
            pass,
            label_targets,
            inside_named_label,
        }
    }

    /// Resolve the element's name through the shared render pass
    pub fn has_accessible_name(&mut self, element: &Element) -> bool {
        self.pass.has_accessible_name(element)
    }

    /// A labelable control named by a `<label>`, either wrapping it or
    /// pointing at its `id`
    pub fn is_labelled(&self, element: &Element) -> bool {
        if !aria::is_labelable(element) {
            return false;
        }
        if self.inside_named_label {
            return true;
        }
        element
            .id()
            .is_some_and(|id| self.label_targets.contains(id.trim()))
    }
}
