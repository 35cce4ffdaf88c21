//! Property tests for name resolution and evaluation

use a11y_lint::rules::{props, render, tags};
use a11y_lint::{
    has_accessible_name, ComponentLibrary, ComponentRef, Config, Element, Evaluator, Node,
};
use proptest::prelude::*;

fn library() -> ComponentLibrary {
    ComponentLibrary::new()
        .with("Named", Element::new("span").with_child("label"))
        .with("Blank", Element::new("div"))
        .with("Loop", Element::new("div").with_child(ComponentRef::new("Loop")))
        .with("Slot", Element::new("span").with_child("{{children}}"))
}

/// Content made of text, images and components only
fn arb_content() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        Just(Node::Empty),
        "[ a-z]{0,4}".prop_map(Node::Text),
        proptest::option::of("[ a-z]{0,3}").prop_map(|alt| {
            let img = Element::new("img").with_prop("src", "#");
            match alt {
                Some(alt) => img.with_prop("alt", alt).into(),
                None => img.into(),
            }
        }),
        prop_oneof![Just("Named"), Just("Blank"), Just("Loop"), Just("Missing")]
            .prop_map(|name| Node::Component(ComponentRef::new(name))),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|children| {
                Node::Element(Element::from_parts("span", Default::default(), children))
            }),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Node::Fragment),
            prop::collection::vec(inner, 0..3).prop_map(|children| {
                let mut slot = ComponentRef::new("Slot");
                slot.children = children;
                Node::Component(slot)
            }),
        ]
    })
}

/// Reference answer computed directly from the generated shape
fn oracle(node: &Node) -> bool {
    match node {
        Node::Empty => false,
        Node::Text(text) => !text.trim().is_empty(),
        Node::Number(_) => true,
        Node::Element(el) if el.is("img") => el
            .attr("alt")
            .ok()
            .flatten()
            .is_some_and(|alt| !alt.trim().is_empty()),
        Node::Element(el) => el.children.iter().any(oracle),
        Node::Fragment(nodes) => nodes.iter().any(oracle),
        Node::Component(c) => match c.component.name() {
            "Named" => true,
            "Slot" => c.children.iter().any(oracle),
            _ => false,
        },
    }
}

/// Small documents mixing controls, images and components
fn arb_tree() -> impl Strategy<Value = Node> {
    let tag = prop_oneof![
        Just("div"),
        Just("span"),
        Just("button"),
        Just("a"),
        Just("img"),
        Just("input"),
        Just("label"),
    ];
    let attr = prop_oneof![
        Just(("href", "#")),
        Just(("href", "/home")),
        Just(("tabIndex", "0")),
        Just(("tabIndex", "-1")),
        Just(("role", "button")),
        Just(("alt", "image of a cat")),
        Just(("alt", "")),
        Just(("aria-hidden", "true")),
        Just(("aria-label", "Close")),
        Just(("aria-lable", "Typo")),
        Just(("id", "bar")),
    ];
    let element = (tag, prop::collection::vec(attr, 0..3), any::<bool>()).prop_map(
        |(tag, attrs, clickable)| {
            let mut el = Element::new(tag);
            for (name, value) in attrs {
                el = el.with_prop(name, value);
            }
            if clickable {
                el = el.with_handler("onClick");
            }
            el
        },
    );

    let leaf = prop_oneof![
        element.clone().prop_map(Node::from),
        arb_content(),
    ];
    leaf.prop_recursive(3, 24, 4, move |inner| {
        (element.clone(), prop::collection::vec(inner, 0..4)).prop_map(|(mut el, children)| {
            el.children = children;
            Node::Element(el)
        })
    })
}

proptest! {
    #[test]
    fn name_resolution_matches_oracle(content in arb_content()) {
        let button = Element::new("button").with_child(content.clone());
        prop_assert_eq!(has_accessible_name(&button, &library()), oracle(&content));
    }

    #[test]
    fn lint_is_idempotent(tree in arb_tree()) {
        let evaluator = Evaluator::builtin(Config::new());
        let lib = library();
        let first = evaluator.lint(&tree, &lib).unwrap();
        let second = evaluator.lint(&tree, &lib).unwrap();
        prop_assert_eq!(first.violations, second.violations);
    }

    #[test]
    fn exclusion_only_removes(tree in arb_tree(), rule in prop_oneof![
        Just(tags::MISSING_ALT),
        Just(tags::REDUNDANT_ALT),
        Just(props::NO_ROLE),
        Just(props::INVALID_ARIA_PROP),
        Just(render::NO_LABEL),
    ]) {
        let lib = library();
        let base = Evaluator::builtin(Config::new()).lint(&tree, &lib).unwrap();
        let excluded = Evaluator::builtin(Config::new().exclude(rule)).lint(&tree, &lib).unwrap();

        let expected: Vec<_> = base
            .violations
            .iter()
            .filter(|v| v.rule_id != rule)
            .cloned()
            .collect();
        prop_assert_eq!(&excluded.violations, &expected);
        prop_assert_eq!(
            excluded.suppressed.len(),
            base.violations.len() - expected.len()
        );
    }
}
