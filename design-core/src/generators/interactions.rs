//! Interaction-state synthesis.
//!
//! These are illustrative defaults keyed off the semantic role, not read
//! from prototype data in the document.

use std::collections::BTreeMap;

use crate::annotated::{
    AnimationTiming, InteractionState, InteractionTrigger, SemanticInfo, SemanticRole,
};

fn timing(duration_ms: u32, easing: &str) -> Option<AnimationTiming> {
    Some(AnimationTiming {
        duration_ms,
        easing: easing.to_string(),
    })
}

fn changes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Interaction states for a semantic role.
#[must_use]
pub fn synthesize_interactions(semantic: Option<&SemanticInfo>) -> Vec<InteractionState> {
    match semantic.map(|s| s.role) {
        Some(SemanticRole::Button) => vec![
            InteractionState {
                trigger: InteractionTrigger::Hover,
                changes: changes(&[("opacity", "0.8")]),
                animation: timing(200, "ease"),
            },
            InteractionState {
                trigger: InteractionTrigger::Click,
                changes: changes(&[("transform", "scale(0.95)")]),
                animation: timing(100, "ease-in-out"),
            },
        ],
        Some(SemanticRole::Input) => vec![InteractionState {
            trigger: InteractionTrigger::Focus,
            changes: changes(&[
                ("border-color", "rgb(0, 122, 255)"),
                ("box-shadow", "0px 0px 0px 3px rgba(0, 122, 255, 0.1)"),
            ]),
            animation: timing(200, "ease"),
        }],
        _ => Vec::new(),
    }
}
