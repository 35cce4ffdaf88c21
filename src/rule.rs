//! Rule definition

use crate::config::Device;
use crate::diagnostic::Severity;
use crate::element::{AttrError, Element};
use crate::resolver::LabelContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How much of the tree a rule needs to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleScope {
    /// Checks one element's tag and attributes
    Tag,
    /// Checks combinations of attributes on one element
    PropCombination,
    /// Needs the fully composed subtree (mount time only)
    SubtreeLabel,
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleScope::Tag => write!(f, "tag"),
            RuleScope::PropCombination => write!(f, "prop-combination"),
            RuleScope::SubtreeLabel => write!(f, "subtree-label"),
        }
    }
}

impl std::str::FromStr for RuleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tag" | "tags" => Ok(RuleScope::Tag),
            "prop-combination" | "props" => Ok(RuleScope::PropCombination),
            "subtree-label" | "label" | "render" => Ok(RuleScope::SubtreeLabel),
            _ => Err(format!("Unknown scope: {}", s)),
        }
    }
}

/// A rule could not evaluate an element
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Attr(#[from] AttrError),

    #[error("malformed element: {0}")]
    Malformed(String),
}

/// Predicate over a single element's tag and props
pub type ElementTest = fn(&Element) -> Result<bool, RuleError>;

/// Predicate over an element inside a composed tree
pub type LabelTest = for<'a, 'r> fn(&Element, &mut LabelContext<'a, 'r>) -> Result<bool, RuleError>;

/// The predicate a rule evaluates. `Ok(true)` means the rule is violated.
#[derive(Clone, Copy)]
pub enum Check {
    Element(ElementTest),
    Label(LabelTest),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Element(_) => f.write_str("Check::Element(..)"),
            Check::Label(_) => f.write_str("Check::Label(..)"),
        }
    }
}

/// An accessibility rule
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    /// Unique rule identifier (e.g., "MISSING_ALT")
    pub id: String,

    /// Evaluation scope
    pub scope: RuleScope,

    /// Default severity level
    pub severity: Severity,

    /// Message emitted on violation
    pub message: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Host tags this rule targets (empty = every tag)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,

    /// Tags for categorization
    pub tags: Vec<String>,

    /// Documentation URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,

    /// Only meaningful for desktop keyboard input
    pub desktop_only: bool,

    #[serde(skip)]
    pub check: Check,
}

impl Rule {
    fn with_check(id: &str, scope: RuleScope, message: &str, check: Check) -> Self {
        Self {
            id: id.to_string(),
            scope,
            severity: Severity::Warning,
            message: message.to_string(),
            description: None,
            target: Vec::new(),
            tags: Vec::new(),
            docs: None,
            desktop_only: false,
            check,
        }
    }

    /// Create a tag-scoped rule targeting the given host tags
    pub fn tag(id: &str, tags: &[&str], message: &str, test: ElementTest) -> Self {
        let mut rule = Self::with_check(id, RuleScope::Tag, message, Check::Element(test));
        rule.target = tags.iter().map(|t| t.to_string()).collect();
        rule
    }

    /// Create a prop-combination rule
    pub fn props(id: &str, message: &str, test: ElementTest) -> Self {
        Self::with_check(id, RuleScope::PropCombination, message, Check::Element(test))
    }

    /// Create a subtree label rule
    pub fn label(id: &str, message: &str, test: LabelTest) -> Self {
        Self::with_check(id, RuleScope::SubtreeLabel, message, Check::Label(test))
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the description
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Set documentation URL
    pub fn with_docs(mut self, url: &str) -> Self {
        self.docs = Some(url.to_string());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Mark the rule as desktop-only keyboard guidance
    pub fn desktop_only(mut self) -> Self {
        self.desktop_only = true;
        self
    }

    /// Check if rule has the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check if this rule targets an element with the given tag name
    pub fn applies_to(&self, tag: &str) -> bool {
        self.target.is_empty() || self.target.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Check if this rule applies on the configured devices.
    /// Desktop keyboard rules do not apply once `mobile` is configured.
    pub fn applies_on(&self, devices: &[Device]) -> bool {
        !(self.desktop_only && devices.contains(&Device::Mobile))
    }
}
