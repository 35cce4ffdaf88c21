//! Element classification shared by the rules and the name resolver

use crate::element::{AttrError, Element};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Host tags that users can interact with without any ARIA role
pub const INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Form controls a `<label>` can name
pub const LABELABLE_TAGS: &[&str] = &[
    "button", "input", "meter", "output", "progress", "select", "textarea",
];

/// `input` types whose `value` is announced as the control's name
const VALUE_LABELLED_INPUTS: &[&str] = &["submit", "reset", "button"];

/// WAI-ARIA 1.2 states and properties
static ARIA_PROPERTIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aria-activedescendant",
        "aria-atomic",
        "aria-autocomplete",
        "aria-braillelabel",
        "aria-brailleroledescription",
        "aria-busy",
        "aria-checked",
        "aria-colcount",
        "aria-colindex",
        "aria-colindextext",
        "aria-colspan",
        "aria-controls",
        "aria-current",
        "aria-describedby",
        "aria-description",
        "aria-details",
        "aria-disabled",
        "aria-dropeffect",
        "aria-errormessage",
        "aria-expanded",
        "aria-flowto",
        "aria-grabbed",
        "aria-haspopup",
        "aria-hidden",
        "aria-invalid",
        "aria-keyshortcuts",
        "aria-label",
        "aria-labelledby",
        "aria-level",
        "aria-live",
        "aria-modal",
        "aria-multiline",
        "aria-multiselectable",
        "aria-orientation",
        "aria-owns",
        "aria-placeholder",
        "aria-posinset",
        "aria-pressed",
        "aria-readonly",
        "aria-relevant",
        "aria-required",
        "aria-roledescription",
        "aria-rowcount",
        "aria-rowindex",
        "aria-rowindextext",
        "aria-rowspan",
        "aria-selected",
        "aria-setsize",
        "aria-sort",
        "aria-valuemax",
        "aria-valuemin",
        "aria-valuenow",
        "aria-valuetext",
    ]
    .into_iter()
    .collect()
});

/// Check if an attribute name is a known ARIA state or property
pub fn is_aria_property(name: &str) -> bool {
    ARIA_PROPERTIES.contains(name)
}

fn input_type_is(el: &Element, ty: &str) -> bool {
    el.is("input")
        && el
            .attr("type")
            .ok()
            .flatten()
            .is_some_and(|t| t.eq_ignore_ascii_case(ty))
}

/// `img`, or an image button
pub fn is_image(el: &Element) -> bool {
    el.is("img") || input_type_is(el, "image")
}

/// `<input type="hidden">`
pub fn is_hidden_input(el: &Element) -> bool {
    input_type_is(el, "hidden")
}

/// Interactive by tag alone
pub fn is_natively_interactive(el: &Element) -> bool {
    INTERACTIVE_TAGS.iter().any(|t| el.is(t)) && !is_hidden_input(el)
}

/// Can take its name from a `<label>`
pub fn is_labelable(el: &Element) -> bool {
    LABELABLE_TAGS.iter().any(|t| el.is(t)) && !is_hidden_input(el)
}

/// Reachable with the Tab key without an explicit `tabIndex`
pub fn is_natively_focusable(el: &Element) -> bool {
    if el.is("a") {
        return el.has("href");
    }
    is_natively_interactive(el)
}

/// The explicit `tabIndex`, when it parses as an integer
pub fn tab_index(el: &Element) -> Result<Option<i64>, AttrError> {
    Ok(el
        .attr("tabIndex")?
        .and_then(|v| v.trim().parse::<i64>().ok()))
}

/// Natively focusable or given a non-negative `tabIndex`
pub fn is_focusable(el: &Element) -> Result<bool, AttrError> {
    if is_natively_focusable(el) {
        return Ok(true);
    }
    Ok(tab_index(el)?.is_some_and(|i| i >= 0))
}

/// `aria-hidden="true"`; `"false"` is not hidden
pub fn is_aria_hidden(el: &Element) -> Result<bool, AttrError> {
    el.attr_is("aria-hidden", "true")
}

/// Name carried by the element's own attributes, ignoring its content
pub fn has_own_name(el: &Element) -> Result<bool, AttrError> {
    if el.attr_non_empty("aria-label")? || el.attr_non_empty("aria-labelledby")? {
        return Ok(true);
    }
    if is_image(el) && el.attr_non_empty("alt")? {
        return Ok(true);
    }
    if VALUE_LABELLED_INPUTS.iter().any(|t| input_type_is(el, t)) && el.attr_non_empty("value")? {
        return Ok(true);
    }
    Ok(false)
}
