//! Variant detection for components and instances.

use std::collections::BTreeMap;

use crate::annotated::{ComponentVariant, VariantState};
use crate::node::Node;

fn properties(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Detect variants; `None` for nodes that are not components or instances.
///
/// Every component gets a `default` variant; `hover` and `disabled` are added
/// when the name mentions them.
#[must_use]
pub fn detect_variants(node: &Node) -> Option<Vec<ComponentVariant>> {
    if !node.node_type.is_component_like() {
        return None;
    }

    let name = node.name.to_lowercase();
    let mut variants = vec![ComponentVariant {
        name: "default".to_string(),
        properties: BTreeMap::new(),
        state: VariantState::Default,
    }];

    if name.contains("hover") {
        variants.push(ComponentVariant {
            name: "hover".to_string(),
            properties: properties(&[("opacity", "0.8")]),
            state: VariantState::Hover,
        });
    }
    if name.contains("disabled") {
        variants.push(ComponentVariant {
            name: "disabled".to_string(),
            properties: properties(&[("opacity", "0.5"), ("cursor", "not-allowed")]),
            state: VariantState::Disabled,
        });
    }

    Some(variants)
}
