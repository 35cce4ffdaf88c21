//! Mount-time rules that need the composed subtree

use crate::aria;
use crate::diagnostic::Severity;
use crate::element::Element;
use crate::resolver::LabelContext;
use crate::rule::{Rule, RuleError};

pub const NO_LABEL: &str = "NO_LABEL";

/// Roles that remove an element's semantics
const PRESENTATIONAL_ROLES: &[&str] = &["presentation", "none"];

/// Get the subtree label rules
pub fn rules() -> Vec<Rule> {
    vec![Rule::label(
        NO_LABEL,
        "You have an unlabeled element or control. Add `aria-label` or `aria-labelledby` attribute, or put some text in the element.",
        unlabelled_control,
    )
    .with_severity(Severity::Error)
    .with_description(
        "Interactive elements need an accessible name: text content, image alt text, \
         `aria-label`, `aria-labelledby` or an associated `<label>`.",
    )
    .with_docs("https://www.w3.org/WAI/WCAG21/Understanding/name-role-value.html")
    .with_tag("labels")]
}

fn is_interactive(el: &Element) -> bool {
    aria::is_natively_interactive(el) || el.has("role") || el.has("onClick")
}

fn unlabelled_control(el: &Element, cx: &mut LabelContext<'_, '_>) -> Result<bool, RuleError> {
    if !is_interactive(el) || aria::is_hidden_input(el) || aria::is_aria_hidden(el)? {
        return Ok(false);
    }
    if let Some(role) = el.attr("role")? {
        if PRESENTATIONAL_ROLES.iter().any(|r| role.trim().eq_ignore_ascii_case(r)) {
            return Ok(false);
        }
    }
    if cx.is_labelled(el) {
        return Ok(false);
    }
    Ok(!cx.has_accessible_name(el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{NoComponents, RenderPass};
    use std::collections::HashSet;

    fn check(el: &Element) -> bool {
        let mut pass = RenderPass::new(&NoComponents);
        let targets = HashSet::new();
        let mut cx = LabelContext::new(&mut pass, &targets, false);
        unlabelled_control(el, &mut cx).unwrap()
    }

    #[test]
    fn test_interactive_without_label() {
        assert!(check(&Element::new("button")));
        assert!(check(&Element::new("a")));
        assert!(check(&Element::new("a").with_prop("href", "/foo")));
        assert!(check(&Element::new("a").with_prop("tabIndex", "0")));
        assert!(check(&Element::new("span").with_prop("role", "button")));
        assert!(check(&Element::new("input").with_prop("type", "text")));
        assert!(check(&Element::new("div").with_handler("onClick")));
    }

    #[test]
    fn test_exemptions() {
        assert!(!check(&Element::new("div")));
        assert!(!check(&Element::new("img").with_prop("role", "presentation")));
        assert!(!check(&Element::new("img").with_prop("role", "none")));
        assert!(!check(&Element::new("button").with_prop("aria-hidden", "true")));
        assert!(!check(&Element::new("input").with_prop("type", "hidden")));
        assert!(check(&Element::new("button").with_prop("aria-hidden", "false")));
    }

    #[test]
    fn test_named() {
        assert!(!check(&Element::new("a").with_child("foo")));
        assert!(!check(&Element::new("button").with_prop("aria-label", "foo")));
        assert!(!check(&Element::new("button").with_prop("aria-labelledby", "foo")));
    }

    #[test]
    fn test_wrapped_in_named_label() {
        let mut pass = RenderPass::new(&NoComponents);
        let targets = HashSet::new();
        let mut cx = LabelContext::new(&mut pass, &targets, true);
        let input = Element::new("input").with_prop("type", "checkbox");
        assert!(!unlabelled_control(&input, &mut cx).unwrap());
    }
}
