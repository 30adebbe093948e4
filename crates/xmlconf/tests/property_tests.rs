//! Property-based tests for the XML codec
//!
//! These tests use proptest to verify:
//! 1. tree -> container -> tree reproduces the tree
//! 2. write -> read reproduces the tree
//! 3. loads(dumps(container)) reproduces containers that came from XML

use proptest::prelude::*;
use xmlconf::xml::{read_tree, write_tree};
use xmlconf::{container_to_tree, dumps, loads, tree_to_container, Element, SpecialKeys};

fn tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// Text without surrounding whitespace, so stripping leaves it unchanged
fn text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9&<>'\"]([a-zA-Z0-9 &<>'\"]{0,10}[a-zA-Z0-9&<>'\"])?")
}

fn attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-z][a-z0-9]{0,4}", "[ -~]{0,8}", 0..4)
        .prop_map(|attrs| attrs.into_iter().collect())
}

fn build(tag: String, attrs: Vec<(String, String)>, text: Option<String>) -> Element {
    let mut element = Element::new(tag);
    for (name, value) in attrs {
        element.set(name, value);
    }
    element.text = text;
    element
}

fn element() -> impl Strategy<Value = Element> {
    let leaf = (tag(), attributes(), text()).prop_map(|(tag, attrs, text)| build(tag, attrs, text));
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            tag(),
            attributes(),
            text(),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(tag, attrs, text, children)| {
                let mut element = build(tag, attrs, text);
                element.children = children;
                element
            })
    })
}

proptest! {
    #[test]
    fn tree_container_tree_roundtrip(root in element()) {
        let keys = SpecialKeys::default();
        let data = tree_to_container(Some(&root), &keys);
        let back = container_to_tree(&data, &keys).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, Some(root));
    }

    #[test]
    fn write_read_roundtrip(root in element()) {
        let mut buf = Vec::new();
        write_tree(&root, &mut buf).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = read_tree(&buf).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, root);
    }

    #[test]
    fn dumps_loads_roundtrip(root in element()) {
        let data = tree_to_container(Some(&root), &SpecialKeys::default());
        let bytes = dumps(&data).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = loads(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, data);
    }

    #[test]
    fn garbage_never_panics(input in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = loads(&input);
    }
}
