//! Attribute-combination rules: click handling and `aria-*` usage
//!
//! Every click/keyboard rule treats `aria-hidden="true"` as a blanket
//! exemption: a hidden element is presentational for assistive technology.

use crate::aria;
use crate::element::Element;
use crate::rule::{Rule, RuleError};

pub const BUTTON_ROLE_SPACE: &str = "BUTTON_ROLE_SPACE";
pub const BUTTON_ROLE_ENTER: &str = "BUTTON_ROLE_ENTER";
pub const NO_ROLE: &str = "NO_ROLE";
pub const NO_TABINDEX: &str = "NO_TABINDEX";
pub const TABINDEX_REQUIRED_WHEN_ARIA_HIDDEN: &str = "TABINDEX_REQUIRED_WHEN_ARIA_HIDDEN";
pub const INVALID_ARIA_PROP: &str = "INVALID_ARIA_PROP";

/// Get the prop-combination rules
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::props(
            BUTTON_ROLE_SPACE,
            "You have `role=\"button\"` but did not define an `onKeyDown` handler. Add it, and have the \"Space\" key do the same thing as an `onClick` handler.",
            button_role_without_keydown,
        )
        .desktop_only()
        .with_description("Native buttons activate on Space; elements posing as buttons must too.")
        .with_docs("https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Roles/button_role")
        .with_tag("keyboard"),

        Rule::props(
            BUTTON_ROLE_ENTER,
            "You have `role=\"button\"` but did not define an `onKeyDown` handler. Add it, and have the \"Enter\" key do the same thing as an `onClick` handler.",
            button_role_without_keydown,
        )
        .desktop_only()
        .with_description("Native buttons activate on Enter; elements posing as buttons must too.")
        .with_docs("https://developer.mozilla.org/en-US/docs/Web/Accessibility/ARIA/Roles/button_role")
        .with_tag("keyboard"),

        Rule::props(
            NO_ROLE,
            "You have a click handler on a non-interactive element but no `role` DOM property. It will be unclear what this element is supposed to do to a screen-reader user. http://www.w3.org/TR/wai-aria/roles#role_definitions",
            click_without_role,
        )
        .with_description("Give clickable elements a role so assistive technology can announce them.")
        .with_docs("https://www.w3.org/TR/wai-aria-1.2/#role_definitions")
        .with_tag("aria"),

        Rule::props(
            NO_TABINDEX,
            "You have a click handler on a non-interactive element but no `tabIndex` DOM property. The element will not be navigable or interactive by keyboard users. http://www.w3.org/TR/wai-aria-practices/#focus_tabindex",
            click_without_tabindex,
        )
        .with_description("Elements that are not focusable by default need `tabIndex` to be reachable by keyboard.")
        .with_docs("https://developer.mozilla.org/en-US/docs/Web/HTML/Global_attributes/tabindex")
        .with_tag("keyboard"),

        Rule::props(
            TABINDEX_REQUIRED_WHEN_ARIA_HIDDEN,
            "You have `aria-hidden=\"true\"` applied to an interactive element but have not removed it from the tab flow. This could result in a hidden tab stop for users of screen readers.",
            hidden_but_focusable,
        )
        .with_description("Focusable elements hidden from assistive technology must set `tabIndex=\"-1\"`.")
        .with_docs("https://www.w3.org/TR/wai-aria-1.2/#aria-hidden")
        .with_tag("aria"),

        Rule::props(
            INVALID_ARIA_PROP,
            "You have an `aria-*` attribute that is not a WAI-ARIA state or property. Assistive technology will ignore it. https://www.w3.org/TR/wai-aria-1.2/#state_prop_def",
            unknown_aria_prop,
        )
        .with_description("Misspelled `aria-*` attributes are silently ignored by browsers.")
        .with_docs("https://www.w3.org/TR/wai-aria-1.2/#state_prop_def")
        .with_tag("aria"),
    ]
}

fn button_role_without_keydown(el: &Element) -> Result<bool, RuleError> {
    if !el.has("onClick") || aria::is_aria_hidden(el)? {
        return Ok(false);
    }
    Ok(el.attr_is("role", "button")? && !el.has("onKeyDown"))
}

fn click_without_role(el: &Element) -> Result<bool, RuleError> {
    if !el.has("onClick") || aria::is_aria_hidden(el)? {
        return Ok(false);
    }
    Ok(!el.has("role") && !aria::is_natively_interactive(el))
}

fn click_without_tabindex(el: &Element) -> Result<bool, RuleError> {
    if !el.has("onClick") || aria::is_aria_hidden(el)? {
        return Ok(false);
    }
    Ok(!el.has("tabIndex") && !aria::is_natively_focusable(el))
}

fn hidden_but_focusable(el: &Element) -> Result<bool, RuleError> {
    if !aria::is_aria_hidden(el)? {
        return Ok(false);
    }
    Ok(aria::is_focusable(el)? && !el.attr_is("tabIndex", "-1")?)
}

fn unknown_aria_prop(el: &Element) -> Result<bool, RuleError> {
    Ok(el
        .props
        .keys()
        .any(|name| name.starts_with("aria-") && !aria::is_aria_property(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clickable(tag: &str) -> Element {
        Element::new(tag).with_handler("onClick")
    }

    #[test]
    fn test_button_role_requires_keydown() {
        let span = clickable("span").with_prop("role", "button");
        assert!(button_role_without_keydown(&span).unwrap());
        assert!(!button_role_without_keydown(&span.clone().with_handler("onKeyDown")).unwrap());
        assert!(!button_role_without_keydown(&span.with_prop("aria-hidden", "true")).unwrap());
        assert!(!button_role_without_keydown(&clickable("span").with_prop("role", "link")).unwrap());
    }

    #[test]
    fn test_click_without_role() {
        assert!(click_without_role(&clickable("div")).unwrap());
        assert!(!click_without_role(&clickable("div").with_prop("role", "button")).unwrap());
        assert!(!click_without_role(&clickable("a").with_prop("aria-hidden", "true")).unwrap());
        assert!(!click_without_role(&clickable("button")).unwrap());
        assert!(!click_without_role(&Element::new("div")).unwrap());
    }

    #[test]
    fn test_click_without_tabindex() {
        assert!(click_without_tabindex(&clickable("div")).unwrap());
        assert!(!click_without_tabindex(&clickable("div").with_prop("tabIndex", "0")).unwrap());
        assert!(!click_without_tabindex(&clickable("div").with_prop("tabIndex", 0)).unwrap());
        assert!(!click_without_tabindex(&clickable("a").with_prop("href", "foo")).unwrap());
        assert!(!click_without_tabindex(&clickable("button")).unwrap());
        assert!(click_without_tabindex(&clickable("a")).unwrap());
    }

    #[test]
    fn test_hidden_but_focusable() {
        let hidden = |tag: &str| Element::new(tag).with_prop("aria-hidden", "true");

        assert!(hidden_but_focusable(&hidden("a").with_prop("href", "/foo")).unwrap());
        assert!(hidden_but_focusable(&hidden("a").with_prop("tabIndex", "0")).unwrap());
        assert!(!hidden_but_focusable(&hidden("a")).unwrap());
        assert!(!hidden_but_focusable(&hidden("a").with_prop("tabIndex", "-1")).unwrap());
        assert!(!hidden_but_focusable(&hidden("a").with_prop("href", "/x").with_prop("tabIndex", -1)).unwrap());
        assert!(!hidden_but_focusable(&hidden("div")).unwrap());
        assert!(hidden_but_focusable(&Element::new("button").with_prop("aria-hidden", true)).unwrap());

        let visible = Element::new("a")
            .with_prop("aria-hidden", "false")
            .with_prop("tabIndex", "-1");
        assert!(!hidden_but_focusable(&visible).unwrap());
        let visible = Element::new("a").with_prop("aria-hidden", "false").with_prop("href", "/x");
        assert!(!hidden_but_focusable(&visible).unwrap());
    }

    #[test]
    fn test_unknown_aria_prop() {
        assert!(unknown_aria_prop(&Element::new("div").with_prop("aria-labeledby", "x")).unwrap());
        assert!(!unknown_aria_prop(&Element::new("div").with_prop("aria-labelledby", "x")).unwrap());
        assert!(!unknown_aria_prop(&Element::new("div").with_prop("data-aria", "x")).unwrap());
    }

    #[test]
    fn test_malformed_aria_hidden() {
        let el = clickable("div").with_handler("aria-hidden");
        assert!(click_without_role(&el).is_err());
        assert!(hidden_but_focusable(&el).is_err());
    }
}
