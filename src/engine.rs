//! Rule evaluator
//!
//! Runs registry rules against elements at construction time
//! ([`Evaluator::evaluate_element`]) and against composed trees at mount time
//! ([`Evaluator::evaluate_tree`]). Every failing rule goes through the same
//! filtering order: configured exclusions first, then the custom filter.
//! Suppressed violations are kept in the [`Evaluation`] so callers can tell
//! "filtered" apart from "not applicable".

use crate::config::{Config, FilterError, IncludeSourceNode};
use crate::diagnostic::{Severity, SourceRef, Violation};
use crate::element::{Element, Node};
use crate::registry::RuleRegistry;
use crate::resolver::{LabelContext, Render, RenderPass};
use crate::rule::{Check, Rule, RuleError, RuleScope};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Evaluation error surfaced to the host
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Why a violation was not forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Rule id listed in `exclude`
    Excluded,
    /// Custom filter returned `false`
    Filtered,
}

/// A violation that matched but was suppressed by configuration
#[derive(Debug, Clone)]
pub struct Suppressed {
    pub violation: Violation,
    pub reason: SuppressReason,
}

/// Result of an evaluation
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Violations to forward, in evaluation order
    pub violations: Vec<Violation>,

    /// Violations suppressed by exclusion or the custom filter
    pub suppressed: Vec<Suppressed>,

    /// Host elements visited
    pub elements_checked: usize,

    /// Rule evaluations skipped because an element was malformed
    pub rules_skipped: usize,

    /// Processing duration
    pub duration: Duration,
}

impl Evaluation {
    /// Total errors
    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    /// Total warnings
    pub fn warning_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_warning()).count()
    }

    /// Total info messages
    pub fn info_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Info)
            .count()
    }

    /// Check if result is clean (no violations)
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count() > 0 {
            2
        } else if self.warning_count() > 0 {
            1
        } else {
            0
        }
    }

    /// Whether a rule produced a forwarded violation
    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.violations.iter().any(|v| v.rule_id == rule_id)
    }

    /// Rule ids of the forwarded violations, in order
    pub fn rule_ids(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.rule_id.as_str()).collect()
    }

    /// Merge another evaluation into this one
    pub fn merge(&mut self, other: Evaluation) {
        self.violations.extend(other.violations);
        self.suppressed.extend(other.suppressed);
        self.elements_checked += other.elements_checked;
        self.rules_skipped += other.rules_skipped;
        self.duration += other.duration;
    }
}

/// Evaluates registry rules under one configuration
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<RuleRegistry>,
    config: Arc<Config>,
}

impl Evaluator {
    /// Create an evaluator over a registry and configuration
    pub fn new(registry: Arc<RuleRegistry>, config: Arc<Config>) -> Self {
        Self { registry, config }
    }

    /// Create an evaluator over the built-in rules
    pub fn builtin(config: Config) -> Self {
        Self::new(Arc::new(RuleRegistry::builtin()), Arc::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Construction-time checks: tag and prop-combination rules for one
    /// element, using only its own attributes
    pub fn evaluate_element(&self, element: &Element) -> Result<Evaluation, EngineError> {
        let start = Instant::now();
        let mut eval = Evaluation::default();
        self.check_element(element, &mut eval)?;
        eval.duration = start.elapsed();
        Ok(eval)
    }

    /// Mount-time checks: subtree label rules over the composed tree.
    ///
    /// Components are expanded through `render`, each distinct
    /// (type, props) at most once for this call.
    pub fn evaluate_tree(&self, root: &Node, render: &dyn Render) -> Result<Evaluation, EngineError> {
        let start = Instant::now();
        let mut eval = Evaluation::default();
        let mut pass = RenderPass::new(render);
        self.check_tree(root, &mut pass, &mut eval)?;
        eval.duration = start.elapsed();
        Ok(eval)
    }

    /// Both phases over a static tree: construction checks for every host
    /// element in document order, then the mount checks
    pub fn lint(&self, root: &Node, render: &dyn Render) -> Result<Evaluation, EngineError> {
        let start = Instant::now();
        let mut eval = Evaluation::default();
        let mut pass = RenderPass::new(render);
        self.construct(root, &mut pass, &mut eval)?;
        // The mount walk revisits the same host elements
        let visited = eval.elements_checked;
        self.check_tree(root, &mut pass, &mut eval)?;
        eval.elements_checked = visited;
        eval.duration = start.elapsed();
        Ok(eval)
    }

    fn check_element(&self, element: &Element, eval: &mut Evaluation) -> Result<(), EngineError> {
        eval.elements_checked += 1;

        for rule in self.registry.rules() {
            if rule.scope == RuleScope::SubtreeLabel || !self.applicable(rule, element) {
                continue;
            }
            let Check::Element(test) = rule.check else {
                continue;
            };
            self.settle(rule, element, test(element), eval)?;
        }

        Ok(())
    }

    fn construct(
        &self,
        node: &Node,
        pass: &mut RenderPass<'_>,
        eval: &mut Evaluation,
    ) -> Result<(), EngineError> {
        match node {
            Node::Element(element) => {
                self.check_element(element, eval)?;
                for child in &element.children {
                    self.construct(child, pass, eval)?;
                }
            }
            Node::Fragment(nodes) => {
                for child in nodes {
                    self.construct(child, pass, eval)?;
                }
            }
            Node::Component(component) => {
                if let Some(output) = pass.enter(component) {
                    let result = self.construct(&output, pass, eval);
                    pass.leave();
                    result?;
                }
            }
            Node::Empty | Node::Text(_) | Node::Number(_) => {}
        }
        Ok(())
    }

    fn check_tree(
        &self,
        root: &Node,
        pass: &mut RenderPass<'_>,
        eval: &mut Evaluation,
    ) -> Result<(), EngineError> {
        if !self.config.label_resolution {
            log::debug!("label resolution disabled; skipping mount-time rules");
            return Ok(());
        }

        let rules: Vec<&Rule> = self
            .registry
            .rules_for(RuleScope::SubtreeLabel)
            .filter(|r| r.applies_on(&self.config.device))
            .collect();
        if rules.is_empty() {
            return Ok(());
        }

        let label_targets = pass.label_targets(root);
        let mut walk = TreeWalk {
            evaluator: self,
            rules: rules.as_slice(),
            pass,
            label_targets: &label_targets,
            eval,
        };
        walk.visit(root, false)
    }

    fn applicable(&self, rule: &Rule, element: &Element) -> bool {
        rule.applies_to(&element.tag) && rule.applies_on(&self.config.device)
    }

    /// Turn a rule outcome into a recorded violation, suppression or skip
    fn settle(
        &self,
        rule: &Rule,
        element: &Element,
        outcome: Result<bool, RuleError>,
        eval: &mut Evaluation,
    ) -> Result<(), EngineError> {
        match outcome {
            Ok(true) => self.record(rule, element, eval),
            Ok(false) => Ok(()),
            Err(e) => {
                log::debug!("skipping {} on <{}>: {}", rule.id, element.tag, e);
                eval.rules_skipped += 1;
                Ok(())
            }
        }
    }

    fn record(&self, rule: &Rule, element: &Element, eval: &mut Evaluation) -> Result<(), EngineError> {
        let mut violation = Violation::new(&rule.id, rule.severity, &rule.message, &element.tag)
            .with_element_id(element.id());
        if self.config.include_source_node == IncludeSourceNode::AsString {
            violation = violation.with_source(SourceRef::Markup(element.to_string()));
        }

        if self.registry.is_excluded(&rule.id, &self.config) {
            eval.suppressed.push(Suppressed {
                violation,
                reason: SuppressReason::Excluded,
            });
            return Ok(());
        }

        if let Some(filter) = &self.config.filter {
            let keep = filter.allows(
                &violation.tag,
                violation.element_id.as_deref(),
                &violation.message,
            )?;
            if !keep {
                eval.suppressed.push(Suppressed {
                    violation,
                    reason: SuppressReason::Filtered,
                });
                return Ok(());
            }
        }

        eval.violations.push(violation);
        Ok(())
    }
}

/// Document-order walk of a composed tree for the label rules
struct TreeWalk<'e, 'p, 'r> {
    evaluator: &'e Evaluator,
    rules: &'e [&'e Rule],
    pass: &'p mut RenderPass<'r>,
    label_targets: &'e HashSet<String>,
    eval: &'e mut Evaluation,
}

impl TreeWalk<'_, '_, '_> {
    fn visit(&mut self, node: &Node, inside_named_label: bool) -> Result<(), EngineError> {
        match node {
            Node::Element(element) => {
                self.check(element, inside_named_label)?;
                let inside = inside_named_label
                    || (element.is("label") && self.pass.has_accessible_name(element));
                for child in &element.children {
                    self.visit(child, inside)?;
                }
            }
            Node::Fragment(nodes) => {
                for child in nodes {
                    self.visit(child, inside_named_label)?;
                }
            }
            Node::Component(component) => {
                if let Some(output) = self.pass.enter(component) {
                    let result = self.visit(&output, inside_named_label);
                    self.pass.leave();
                    result?;
                }
            }
            Node::Empty | Node::Text(_) | Node::Number(_) => {}
        }
        Ok(())
    }

    fn check(&mut self, element: &Element, inside_named_label: bool) -> Result<(), EngineError> {
        self.eval.elements_checked += 1;
        let rules = self.rules;

        for rule in rules {
            if !rule.applies_to(&element.tag) {
                continue;
            }
            let Check::Label(test) = rule.check else {
                continue;
            };
            let outcome = {
                let mut cx = LabelContext::new(&mut *self.pass, self.label_targets, inside_named_label);
                test(element, &mut cx)
            };
            self.evaluator.settle(rule, element, outcome, &mut *self.eval)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NoComponents;
    use crate::rules::{props, render, tags};

    fn evaluator(config: Config) -> Evaluator {
        Evaluator::builtin(config)
    }

    #[test]
    fn test_evaluation_exit_code() {
        let mut eval = Evaluation::default();
        assert_eq!(eval.exit_code(), 0);
        assert!(eval.is_clean());

        eval.violations
            .push(Violation::new("W", Severity::Warning, "m", "div"));
        assert_eq!(eval.exit_code(), 1);

        eval.violations
            .push(Violation::new("E", Severity::Error, "m", "div"));
        assert_eq!(eval.exit_code(), 2);
    }

    #[test]
    fn test_evaluation_merge() {
        let mut a = Evaluation {
            elements_checked: 1,
            ..Evaluation::default()
        };
        let b = Evaluation {
            elements_checked: 2,
            rules_skipped: 1,
            violations: vec![Violation::new("W", Severity::Warning, "m", "div")],
            ..Evaluation::default()
        };
        a.merge(b);
        assert_eq!(a.elements_checked, 3);
        assert_eq!(a.rules_skipped, 1);
        assert_eq!(a.warning_count(), 1);
    }

    #[test]
    fn test_registry_order_for_one_element() {
        let el = Element::new("span")
            .with_handler("onClick")
            .with_prop("role", "button");
        let eval = evaluator(Config::new()).evaluate_element(&el).unwrap();
        assert_eq!(
            eval.rule_ids(),
            vec![props::BUTTON_ROLE_SPACE, props::BUTTON_ROLE_ENTER, props::NO_TABINDEX]
        );
    }

    #[test]
    fn test_exclusion_recorded_as_suppressed() {
        let el = Element::new("img").with_prop("alt", "image of a cat");
        let eval = evaluator(Config::new().exclude(tags::REDUNDANT_ALT))
            .evaluate_element(&el)
            .unwrap();

        assert!(eval.is_clean());
        assert_eq!(eval.suppressed.len(), 1);
        assert_eq!(eval.suppressed[0].violation.rule_id, tags::REDUNDANT_ALT);
        assert_eq!(eval.suppressed[0].reason, SuppressReason::Excluded);
    }

    #[test]
    fn test_exclusion_runs_before_filter() {
        let el = Element::new("img");
        let config = Config::new()
            .exclude(tags::MISSING_ALT)
            .with_filter(|_, _, _| Err(FilterError::new("must not be called")));
        let eval = evaluator(config).evaluate_element(&el).unwrap();
        assert_eq!(eval.suppressed[0].reason, SuppressReason::Excluded);
    }

    #[test]
    fn test_filter_error_propagates() {
        let config = Config::new().with_filter(|_, _, _| Err(FilterError::new("broken")));
        let err = evaluator(config)
            .evaluate_element(&Element::new("img"))
            .unwrap_err();
        assert_eq!(err.to_string(), "filter predicate failed: broken");
    }

    #[test]
    fn test_filter_receives_tag_id_and_message() {
        let config = Config::new().with_filter(|tag, id, message| {
            Ok(tag == "img" && id == Some("bar") && message.contains("alt"))
        });
        let ev = evaluator(config);

        let foo = ev
            .evaluate_element(&Element::new("img").with_prop("id", "foo"))
            .unwrap();
        assert!(foo.is_clean());
        assert_eq!(foo.suppressed[0].reason, SuppressReason::Filtered);

        let bar = ev
            .evaluate_element(&Element::new("img").with_prop("id", "bar"))
            .unwrap();
        assert!(bar.has_rule(tags::MISSING_ALT));
    }

    #[test]
    fn test_malformed_attribute_skips_only_that_rule() {
        let el = Element::new("img").with_handler("alt").with_prop("aria-bogus", "x");
        let eval = evaluator(Config::new()).evaluate_element(&el).unwrap();

        assert_eq!(eval.rules_skipped, 1);
        assert!(!eval.has_rule(tags::MISSING_ALT));
        assert!(!eval.has_rule(tags::REDUNDANT_ALT));
        assert!(eval.has_rule(props::INVALID_ARIA_PROP));
    }

    #[test]
    fn test_source_node_as_string() {
        let config = Config::new().with_source_node(IncludeSourceNode::AsString);
        let tree: Node = Element::new("div").with_prop("role", "button").into();
        let eval = evaluator(config).evaluate_tree(&tree, &NoComponents).unwrap();

        let source = eval.violations[0].source.as_ref().unwrap();
        assert_eq!(
            source,
            &SourceRef::Markup("<div role=\"button\"></div>".to_string())
        );
    }

    #[test]
    fn test_label_resolution_disabled() {
        let tree: Node = Element::new("button").into();
        let eval = evaluator(Config::new().without_label_resolution())
            .evaluate_tree(&tree, &NoComponents)
            .unwrap();
        assert!(eval.is_clean());
        assert_eq!(eval.elements_checked, 0);
    }

    #[test]
    fn test_tree_document_order() {
        let tree: Node = Element::new("div")
            .with_child(Element::new("button").with_prop("id", "first"))
            .with_child(
                Element::new("span")
                    .with_child(Element::new("a").with_prop("id", "second")),
            )
            .with_child(Element::new("input").with_prop("id", "third"))
            .into();

        let eval = evaluator(Config::new()).evaluate_tree(&tree, &NoComponents).unwrap();
        let ids: Vec<_> = eval
            .violations
            .iter()
            .map(|v| v.element_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert!(eval.violations.iter().all(|v| v.rule_id == render::NO_LABEL));
    }

    #[test]
    fn test_label_for_association() {
        let labelled: Node = Element::new("div")
            .with_child(Element::new("label").with_prop("htmlFor", "username").with_child("Username"))
            .with_child(Element::new("input").with_prop("id", "username"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&labelled, &NoComponents).unwrap();
        assert!(!eval.has_rule(render::NO_LABEL));

        let mismatched: Node = Element::new("div")
            .with_child(Element::new("label").with_prop("htmlFor", "username").with_child("Username"))
            .with_child(Element::new("input").with_prop("id", "username-not"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&mismatched, &NoComponents).unwrap();
        assert!(eval.has_rule(render::NO_LABEL));
    }

    #[test]
    fn test_wrapping_label() {
        let wrapped: Node = Element::new("label")
            .with_child("Remember me")
            .with_child(Element::new("input").with_prop("type", "checkbox"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&wrapped, &NoComponents).unwrap();
        assert!(eval.is_clean());

        let empty_label: Node = Element::new("label")
            .with_child(Element::new("input").with_prop("type", "checkbox"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&empty_label, &NoComponents).unwrap();
        assert!(eval.has_rule(render::NO_LABEL));
    }

    #[test]
    fn test_label_names_only_form_controls() {
        let wrapped_link: Node = Element::new("label")
            .with_child("Accept the terms ")
            .with_child(Element::new("a").with_prop("href", "/terms"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&wrapped_link, &NoComponents).unwrap();
        assert_eq!(eval.rule_ids(), vec![render::NO_LABEL]);
        assert_eq!(eval.violations[0].tag, "a");

        let pointed_div: Node = Element::new("div")
            .with_child(Element::new("label").with_prop("htmlFor", "x").with_child("Open"))
            .with_child(Element::new("div").with_prop("id", "x").with_prop("role", "button"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&pointed_div, &NoComponents).unwrap();
        assert_eq!(eval.rule_ids(), vec![render::NO_LABEL]);
        assert_eq!(eval.violations[0].element_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_empty_label_for_does_not_name() {
        let tree: Node = Element::new("div")
            .with_child(Element::new("label").with_prop("htmlFor", "username"))
            .with_child(Element::new("input").with_prop("id", "username"))
            .into();
        let eval = evaluator(Config::new()).evaluate_tree(&tree, &NoComponents).unwrap();
        assert!(eval.has_rule(render::NO_LABEL));
    }

    #[test]
    fn test_lint_runs_both_phases() {
        let tree: Node = Element::new("div")
            .with_child(Element::new("img").with_prop("src", "a.png"))
            .with_child(Element::new("button"))
            .into();
        let eval = evaluator(Config::new()).lint(&tree, &NoComponents).unwrap();
        assert_eq!(eval.rule_ids(), vec![tags::MISSING_ALT, render::NO_LABEL]);
    }
}
