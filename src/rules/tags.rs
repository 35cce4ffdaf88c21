//! Tag-scoped rules for images and anchors

use crate::aria;
use crate::diagnostic::Severity;
use crate::element::Element;
use crate::rule::{Rule, RuleError};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MISSING_ALT: &str = "MISSING_ALT";
pub const REDUNDANT_ALT: &str = "REDUNDANT_ALT";
pub const HASH_HREF_NEEDS_BUTTON: &str = "HASH_HREF_NEEDS_BUTTON";
pub const TABINDEX_NEEDS_BUTTON: &str = "TABINDEX_NEEDS_BUTTON";

static REDUNDANT_ALT_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)image|picture").expect("valid regex"));

/// Get the tag-scoped rules
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::tag(
            MISSING_ALT,
            &["img", "input"],
            "You forgot an `alt` DOM property on an image. Screen-reader users will not know what it is.",
            missing_alt,
        )
        .with_severity(Severity::Error)
        .with_description(
            "Images need an `alt` attribute. Use `alt=\"\"` for purely decorative images.",
        )
        .with_docs("https://www.w3.org/WAI/tutorials/images/")
        .with_tag("images"),

        Rule::tag(
            REDUNDANT_ALT,
            &["img"],
            "Screen-readers already announce `img` tags as an image, you don't need to use the words \"image\" or \"picture\" in the description.",
            redundant_alt,
        )
        .with_description("Alt text describes the image content, not the fact that it is an image.")
        .with_docs("https://www.w3.org/WAI/tutorials/images/tips/")
        .with_tag("images"),

        Rule::tag(
            HASH_HREF_NEEDS_BUTTON,
            &["a"],
            "You have an anchor with `href=\"#\"`. It does not navigate anywhere; use a `<button>` for actions.",
            hash_href,
        )
        .with_description("Placeholder links are announced as links but behave like buttons.")
        .with_docs("https://developer.mozilla.org/en-US/docs/Web/HTML/Element/a#onclick_events")
        .with_tag("anchors"),

        Rule::tag(
            TABINDEX_NEEDS_BUTTON,
            &["a"],
            "You have an anchor with a `tabIndex` and no `href`. Use a `<button>` instead of making a placeholder link tabbable.",
            tabbable_placeholder,
        )
        .with_description("An anchor without `href` is not a link; a button already has focus and key handling.")
        .with_docs("https://developer.mozilla.org/en-US/docs/Web/HTML/Element/button")
        .with_tag("anchors"),
    ]
}

fn missing_alt(el: &Element) -> Result<bool, RuleError> {
    Ok(aria::is_image(el) && !el.has("alt"))
}

fn redundant_alt(el: &Element) -> Result<bool, RuleError> {
    Ok(el
        .attr("alt")?
        .is_some_and(|alt| REDUNDANT_ALT_WORDS.is_match(&alt)))
}

fn hash_href(el: &Element) -> Result<bool, RuleError> {
    Ok(el.attr_is("href", "#")?)
}

fn tabbable_placeholder(el: &Element) -> Result<bool, RuleError> {
    Ok(el.has("tabIndex") && !el.has("href"))
}
