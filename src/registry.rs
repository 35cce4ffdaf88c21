//! Rule registry
//!
//! Holds rules in insertion order and hands them out by scope.

use crate::config::Config;
use crate::rule::{Rule, RuleScope};
use crate::rules;
use thiserror::Error;

/// Error registering a rule
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("rule `{0}` is already registered")]
    Duplicate(String),
}

/// Registered rules, grouped by evaluation scope
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in rule
    pub fn builtin() -> Self {
        Self {
            rules: rules::builtin_rules(),
        }
    }

    /// Register a rule. Ids must be unique.
    pub fn register(&mut self, rule: Rule) -> Result<(), RegistryError> {
        if self.get(&rule.id).is_some() {
            return Err(RegistryError::Duplicate(rule.id));
        }
        log::debug!("registered rule {} ({})", rule.id, rule.scope);
        self.rules.push(rule);
        Ok(())
    }

    /// Rules evaluated in the given scope, in registry order
    pub fn rules_for(&self, scope: RuleScope) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.scope == scope)
    }

    /// All rules in registry order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Whether the configuration suppresses a rule's violations
    pub fn is_excluded(&self, rule_id: &str, config: &Config) -> bool {
        config.is_excluded(rule_id)
    }

    /// Keep only the rules matching a predicate
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Rule) -> bool,
    {
        self.rules.retain(predicate);
    }

    /// Builder form of [`RuleRegistry::retain`]
    pub fn with_filter<F>(mut self, predicate: F) -> Self
    where
        F: FnMut(&Rule) -> bool,
    {
        self.retain(predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
