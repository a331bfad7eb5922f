//! Context reducer.
//!
//! Runs once per node after its children are attached and does not recurse.
//! Keeps payloads small for downstream consumers by dropping empty
//! collections and truncating long text. Identity fields are never touched.

use serde_json::Value;

use crate::annotated::AnnotatedNode;
use crate::config::ReductionPolicy;

/// Appended to text that was truncated.
pub const ELLIPSIS: &str = "...";

/// Reduce a single annotated node in place.
pub fn reduce(node: &mut AnnotatedNode, policy: &ReductionPolicy) {
    if policy.strip_empty {
        strip_empty(node);
    }
    if let Some(limit) = policy.max_text_length {
        if let Some(text) = node.characters.as_mut() {
            truncate(text, limit);
        }
    }
}

fn strip_empty(node: &mut AnnotatedNode) {
    fn none_if_empty<T>(slot: &mut Option<Vec<T>>) {
        if slot.as_ref().is_some_and(Vec::is_empty) {
            *slot = None;
        }
    }

    if node.css_styles.as_ref().is_some_and(|s| s.is_empty()) {
        node.css_styles = None;
    }
    none_if_empty(&mut node.design_tokens);
    none_if_empty(&mut node.variants);
    none_if_empty(&mut node.interactions);
    none_if_empty(&mut node.children);
    node.extra.retain(|_, value| match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });
}

/// Cut `text` to `limit` characters plus [`ELLIPSIS`] when it is longer.
pub fn truncate(text: &mut String, limit: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(limit) {
        text.truncate(byte_index);
        text.push_str(ELLIPSIS);
    }
}
