//! Built-in accessibility rules
//!
//! Rules are grouped by the scope they evaluate in:
//! - [`tags`]: a single element's tag and attributes
//! - [`props`]: attribute combinations (click handling, `aria-*`)
//! - [`render`]: checks that need the composed subtree at mount time

pub mod props;
pub mod render;
pub mod tags;

use crate::rule::Rule;

/// Get all built-in rules in registry order
pub fn builtin_rules() -> Vec<Rule> {
    let mut rules = tags::rules();
    rules.extend(props::rules());
    rules.extend(render::rules());
    rules
}
