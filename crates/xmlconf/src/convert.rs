//! Conversion between element trees and generic containers
//!
//! A node `<tag a="1">text<child/></tag>` is represented as
//!
//! ```text
//! {"tag": {"@attrs": {"a": "1"}, "@text": "text", "@children": [{"child": {}}]}}
//! ```
//!
//! where `@` is the configurable prefix. Each `@children` item is the full
//! tag-keyed container of that child, not just its inner content.

use tracing::warn;

use crate::config::{SpecialKeys, MAX_DEPTH};
use crate::error::{Error, Result};
use crate::value::{Container, Scalar, Value};
use crate::xml::model::Element;

/// Convert an element tree to a container. `None` yields an empty container.
///
/// Recursion follows the element nesting; trees produced by the reader are
/// bounded by [`MAX_DEPTH`].
pub fn tree_to_container(root: Option<&Element>, keys: &SpecialKeys) -> Container {
    let mut tree = Container::new();
    let Some(root) = root else {
        return tree;
    };

    let mut inner = Container::new();
    if !root.attributes.is_empty() {
        let attrs: Container = root
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        inner.insert(keys.attrs.as_str(), attrs);
    }

    if let Some(text) = root.text.as_deref().map(str::trim) {
        if !text.is_empty() {
            inner.insert(keys.text.as_str(), text);
        }
    }

    if !root.children.is_empty() {
        let children: Vec<Value> = root
            .children
            .iter()
            .map(|child| Value::Mapping(tree_to_container(Some(child), keys)))
            .collect();
        inner.insert(keys.children.as_str(), children);
    }

    tree.insert(root.tag.as_str(), inner);
    tree
}

/// Build an element tree from a container.
///
/// The root is the first key that is not one of the special keys; entries
/// after it are ignored. Returns `None` when there is no such key, and
/// [`Error::DepthLimit`] when children nest deeper than [`MAX_DEPTH`].
pub fn container_to_tree(container: &Container, keys: &SpecialKeys) -> Result<Option<Element>> {
    for (index, (key, value)) in container.iter().enumerate() {
        if is_special(key, keys) {
            warn!(key = %key, "special key has no element to apply to at top level, skipped");
            continue;
        }

        let mut root = Element::new(key.as_str());
        fill_element(&mut root, value, keys, 1)?;

        let dropped = container.len().saturating_sub(index + 1);
        if dropped > 0 {
            warn!(root = %key, dropped, "only the first root element is kept");
        }
        return Ok(Some(root));
    }
    Ok(None)
}

/// Apply the container `value` to `parent`. Anything but a mapping is a leaf
/// whose content the caller has already consumed.
fn fill_element(
    parent: &mut Element,
    value: &Value,
    keys: &SpecialKeys,
    depth: usize,
) -> Result<()> {
    let Value::Mapping(container) = value else {
        return Ok(());
    };

    for (key, value) in container {
        if *key == keys.attrs {
            set_attributes(parent, value);
        } else if *key == keys.text {
            set_text(parent, value);
        } else if *key == keys.children {
            append_children(parent, value, keys, depth)?;
        } else {
            // A tag key below the root ends this node; its element is not attached.
            warn!(
                parent = %parent.tag,
                key = %key,
                "nested tag key outside of a children sequence, dropping it and the remaining entries"
            );
            return Ok(());
        }
    }
    Ok(())
}

fn set_attributes(parent: &mut Element, value: &Value) {
    let Value::Mapping(attrs) = value else {
        warn!(element = %parent.tag, "attributes value is not a mapping, skipped");
        return;
    };
    for (name, value) in attrs {
        match value {
            Value::Scalar(scalar) => parent.set(name.as_str(), scalar.to_text()),
            _ => warn!(element = %parent.tag, attribute = %name, "non-scalar attribute value, skipped"),
        }
    }
}

fn set_text(parent: &mut Element, value: &Value) {
    match value {
        Value::Scalar(Scalar::Null) => parent.text = None,
        Value::Scalar(scalar) => parent.text = Some(scalar.to_text()),
        _ => warn!(element = %parent.tag, "non-scalar text value, skipped"),
    }
}

fn append_children(
    parent: &mut Element,
    value: &Value,
    keys: &SpecialKeys,
    depth: usize,
) -> Result<()> {
    let Value::Sequence(children) = value else {
        warn!(element = %parent.tag, "children value is not a sequence, skipped");
        return Ok(());
    };
    for child in children {
        let Value::Mapping(child) = child else {
            warn!(element = %parent.tag, "child entry is not a mapping, skipped");
            continue;
        };
        for (tag, value) in child {
            if depth >= MAX_DEPTH {
                return Err(Error::DepthLimit { limit: MAX_DEPTH });
            }
            let mut element = Element::new(tag.as_str());
            fill_element(&mut element, value, keys, depth + 1)?;
            parent.append(element);
        }
    }
    Ok(())
}

fn is_special(key: &str, keys: &SpecialKeys) -> bool {
    key == keys.attrs || key == keys.text || key == keys.children
}
