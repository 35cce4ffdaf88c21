//! a11y-lint - accessibility checks for virtual UI element trees
//!
//! Inspects element descriptors (tag, props, children) as a host UI library
//! constructs and mounts them, and reports accessibility problems: missing
//! labels, missing keyboard handlers, missing or redundant alt text and
//! unknown `aria-*` attributes. Trees are never modified.
//!
//! # Architecture
//!
//! ```text
//! Host -> Monitor -> Evaluator -> RuleRegistry -> Rule
//!                         \-> RenderPass (accessible names) -> Render
//! ```
//!
//! Construction-time rules see one element at a time. Mount-time rules see
//! the composed tree; composite components are expanded through a
//! caller-supplied [`Render`] capability, once per distinct props value.
//!
//! # Embedding
//!
//! ```no_run
//! use a11y_lint::{A11y, Config, Interceptor, LogSink, NoComponents, Props};
//!
//! let interceptor = Interceptor::new();
//! let mut a11y = A11y::new();
//! a11y.activate(Box::new(interceptor.clone()), Config::new(), Box::new(LogSink))
//!     .expect("fresh interceptor");
//!
//! let img = interceptor.create("img", Props::new(), Vec::new()).expect("no filter");
//! interceptor.mount(&img.into(), &NoComponents).expect("no filter");
//! a11y.deactivate_all();
//! ```

pub mod aria;
pub mod components;
pub mod config;
pub mod diagnostic;
pub mod element;
pub mod engine;
pub mod host;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod rules;

// Re-export main types
pub use components::{ComponentLibrary, TreeDocument};
pub use config::{Config, CustomFilter, Device, FilterError, IncludeSourceNode};
pub use diagnostic::{Severity, SourceRef, Violation};
pub use element::{ComponentRef, ComponentType, Element, Node, PropValue, Props};
pub use engine::{EngineError, Evaluation, Evaluator, SuppressReason, Suppressed};
pub use host::{A11y, Host, HostError, Interceptor, LogSink, Monitor, RecordingSink, WarningSink};
pub use registry::RuleRegistry;
pub use resolver::{has_accessible_name, NoComponents, Render, RenderError, RenderPass};
pub use rule::{Rule, RuleScope};
