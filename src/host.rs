//! Host boundary
//!
//! A host UI library reports two events: element construction and mount
//! completion. A [`Monitor`] turns each event into an evaluation and forwards
//! the surviving violations to a [`WarningSink`]. Hosts receive the monitor
//! through [`Host::install`] and drop it again on [`Host::restore`].
//!
//! [`Interceptor`] is the reference host: the embedding library calls
//! [`Interceptor::create`] from its element factory and
//! [`Interceptor::mount`] once a tree is composed.

use crate::config::Config;
use crate::diagnostic::SourceRef;
use crate::element::{Element, Node, Props};
use crate::engine::{EngineError, Evaluation, Evaluator};
use crate::resolver::Render;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

/// Host installation error
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host `{0}` already has an active monitor")]
    AlreadyInstalled(String),
}

/// Receives one call per forwarded violation
pub trait WarningSink: Send + Sync {
    fn emit(&self, rule_id: &str, message: &str, source: Option<&SourceRef>);
}

impl<T: WarningSink + ?Sized> WarningSink for Arc<T> {
    fn emit(&self, rule_id: &str, message: &str, source: Option<&SourceRef>) {
        (**self).emit(rule_id, message, source)
    }
}

/// Default sink: writes every violation through `log::warn!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn emit(&self, rule_id: &str, message: &str, source: Option<&SourceRef>) {
        match source {
            Some(source) => log::warn!(target: "a11y", "[{}] {} {}", rule_id, message, source),
            None => log::warn!(target: "a11y", "[{}] {}", rule_id, message),
        }
    }
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub rule_id: String,
    pub message: String,
    pub source: Option<SourceRef>,
}

/// Sink that keeps every emission in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    emitted: Mutex<Vec<Emission>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions so far, in order
    pub fn emissions(&self) -> Vec<Emission> {
        self.lock().clone()
    }

    /// Emitted messages, in order
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Emitted rule ids, in order
    pub fn rule_ids(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.rule_id.clone()).collect()
    }

    /// Whether any emission came from the given rule
    pub fn saw(&self, rule_id: &str) -> bool {
        self.lock().iter().any(|e| e.rule_id == rule_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Emission>> {
        self.emitted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WarningSink for RecordingSink {
    fn emit(&self, rule_id: &str, message: &str, source: Option<&SourceRef>) {
        self.lock().push(Emission {
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            source: source.cloned(),
        });
    }
}

/// Evaluates host events and forwards violations to a sink
pub struct Monitor {
    evaluator: Evaluator,
    sink: Box<dyn WarningSink>,
}

impl Monitor {
    pub fn new(evaluator: Evaluator, sink: Box<dyn WarningSink>) -> Self {
        Self { evaluator, sink }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Element construction: run the tag and prop-combination rules
    pub fn on_create(&self, element: &Element) -> Result<Evaluation, EngineError> {
        let eval = self.evaluator.evaluate_element(element)?;
        self.forward(&eval);
        Ok(eval)
    }

    /// Mount completion: run the label rules over the composed tree
    pub fn on_mount(&self, root: &Node, render: &dyn Render) -> Result<Evaluation, EngineError> {
        let eval = self.evaluator.evaluate_tree(root, render)?;
        self.forward(&eval);
        Ok(eval)
    }

    fn forward(&self, eval: &Evaluation) {
        let prefix = &self.evaluator.config().warning_prefix;
        for violation in &eval.violations {
            let message = format!("{}{}", prefix, violation.message);
            self.sink
                .emit(&violation.rule_id, &message, violation.source.as_ref());
        }
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

/// A host library extension point
pub trait Host: Send {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Start routing construction and mount events to `monitor`
    fn install(&mut self, monitor: Arc<Monitor>) -> Result<(), HostError>;

    /// Stop routing events; calling it again has no effect
    fn restore(&mut self);
}

/// Reference host: a cloneable handle shared with the embedding library.
///
/// Without an installed monitor both entry points pass elements through
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct Interceptor {
    monitor: Arc<RwLock<Option<Arc<Monitor>>>>,
}

impl Interceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.current().is_some()
    }

    /// Element factory hook. Builds the element, evaluates it and returns it
    /// unchanged.
    pub fn create(&self, tag: &str, props: Props, children: Vec<Node>) -> Result<Element, EngineError> {
        let element = Element::from_parts(tag, props, children);
        self.created(&element)?;
        Ok(element)
    }

    /// Report an element that was built elsewhere
    pub fn created(&self, element: &Element) -> Result<Option<Evaluation>, EngineError> {
        match self.current() {
            Some(monitor) => monitor.on_create(element).map(Some),
            None => Ok(None),
        }
    }

    /// Mount hook
    pub fn mount(&self, root: &Node, render: &dyn Render) -> Result<Option<Evaluation>, EngineError> {
        match self.current() {
            Some(monitor) => monitor.on_mount(root, render).map(Some),
            None => Ok(None),
        }
    }

    fn current(&self) -> Option<Arc<Monitor>> {
        self.monitor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Host for Interceptor {
    fn name(&self) -> &str {
        "interceptor"
    }

    fn install(&mut self, monitor: Arc<Monitor>) -> Result<(), HostError> {
        let mut slot = self.monitor.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(HostError::AlreadyInstalled(self.name().to_string()));
        }
        *slot = Some(monitor);
        log::debug!("monitor installed on {}", self.name());
        Ok(())
    }

    fn restore(&mut self) {
        let previous = self
            .monitor
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            log::debug!("monitor removed from {}", self.name());
        }
    }
}

/// Activation handle. Restores every host on [`A11y::deactivate_all`] and
/// when dropped.
#[derive(Default)]
pub struct A11y {
    hosts: Vec<Box<dyn Host>>,
}

impl A11y {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a monitor over the built-in rules on `host`
    pub fn activate(
        &mut self,
        host: Box<dyn Host>,
        config: Config,
        sink: Box<dyn WarningSink>,
    ) -> Result<(), HostError> {
        self.activate_with(host, Evaluator::builtin(config), sink)
    }

    /// Install a monitor with a caller-built evaluator
    pub fn activate_with(
        &mut self,
        mut host: Box<dyn Host>,
        evaluator: Evaluator,
        sink: Box<dyn WarningSink>,
    ) -> Result<(), HostError> {
        let monitor = Arc::new(Monitor::new(evaluator, sink));
        host.install(monitor)?;
        log::info!("accessibility checks active on {}", host.name());
        self.hosts.push(host);
        Ok(())
    }

    /// Restore every activated host
    pub fn deactivate_all(&mut self) {
        for mut host in self.hosts.drain(..) {
            host.restore();
        }
    }

    /// Number of hosts currently activated
    pub fn active_hosts(&self) -> usize {
        self.hosts.len()
    }
}

impl Drop for A11y {
    fn drop(&mut self) {
        self.deactivate_all();
    }
}

impl std::fmt::Debug for A11y {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.hosts.iter().map(|h| h.name()).collect();
        f.debug_struct("A11y").field("hosts", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PropValue;
    use crate::resolver::NoComponents;
    use crate::rules::{render, tags};

    fn img_props(id: &str) -> Props {
        let mut props = Props::new();
        props.insert("id".to_string(), PropValue::from(id));
        props.insert("src".to_string(), PropValue::from("foo.jpg"));
        props
    }

    fn activated(config: Config) -> (A11y, Interceptor, Arc<RecordingSink>) {
        let interceptor = Interceptor::new();
        let sink = Arc::new(RecordingSink::new());
        let mut a11y = A11y::new();
        a11y.activate(Box::new(interceptor.clone()), config, Box::new(Arc::clone(&sink)))
            .unwrap();
        (a11y, interceptor, sink)
    }

    #[test]
    fn test_create_returns_element_unchanged() {
        let (_a11y, interceptor, sink) = activated(Config::new());
        let el = interceptor.create("img", img_props("foo"), Vec::new()).unwrap();

        assert_eq!(el.tag, "img");
        assert_eq!(el.props, img_props("foo"));
        assert_eq!(sink.rule_ids(), vec![tags::MISSING_ALT]);
    }

    #[test]
    fn test_warning_prefix() {
        let (_a11y, interceptor, sink) = activated(Config::new().with_warning_prefix("a11y-lint ERROR:"));
        interceptor.create("img", img_props("foo"), Vec::new()).unwrap();

        let messages = sink.messages();
        assert!(messages[0].starts_with("a11y-lint ERROR:You forgot an `alt`"));
    }

    #[test]
    fn test_mount_emits_source() {
        let config = Config::new().with_source_node(crate::config::IncludeSourceNode::AsString);
        let (_a11y, interceptor, sink) = activated(config);
        let tree: Node = Element::new("div").with_prop("role", "button").into();
        interceptor.mount(&tree, &NoComponents).unwrap();

        let emitted = sink.emissions();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].rule_id, render::NO_LABEL);
        assert_eq!(
            emitted[0].source,
            Some(SourceRef::Markup("<div role=\"button\"></div>".to_string()))
        );
    }

    #[test]
    fn test_install_twice_rejected() {
        let interceptor = Interceptor::new();
        let mut a11y = A11y::new();
        a11y.activate(Box::new(interceptor.clone()), Config::new(), Box::new(LogSink))
            .unwrap();
        let err = a11y
            .activate(Box::new(interceptor.clone()), Config::new(), Box::new(LogSink))
            .unwrap_err();
        assert!(matches!(err, HostError::AlreadyInstalled(_)));
        assert_eq!(a11y.active_hosts(), 1);
    }

    #[test]
    fn test_deactivate_all_is_idempotent() {
        let (mut a11y, interceptor, sink) = activated(Config::new());
        assert!(interceptor.is_installed());

        a11y.deactivate_all();
        a11y.deactivate_all();
        assert!(!interceptor.is_installed());
        assert_eq!(a11y.active_hosts(), 0);

        interceptor.create("img", img_props("foo"), Vec::new()).unwrap();
        assert!(sink.is_empty());
        assert_eq!(interceptor.mount(&Element::new("button").into(), &NoComponents).unwrap().map(|e| e.violations.len()), None);
    }

    #[test]
    fn test_drop_restores_host() {
        let (a11y, interceptor, _sink) = activated(Config::new());
        drop(a11y);
        assert!(!interceptor.is_installed());
    }

    #[test]
    fn test_reactivate_after_restore() {
        let (mut a11y, interceptor, _) = activated(Config::new());
        a11y.deactivate_all();

        let sink = Arc::new(RecordingSink::new());
        a11y.activate(Box::new(interceptor.clone()), Config::new(), Box::new(Arc::clone(&sink)))
            .unwrap();
        interceptor.create("img", img_props("bar"), Vec::new()).unwrap();
        assert!(sink.saw(tags::MISSING_ALT));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_log_sink_emits() {
        LogSink.emit("NO_LABEL", "m", None);
        LogSink.emit("NO_LABEL", "m", Some(&SourceRef::Markup("<a></a>".to_string())));
    }
}
