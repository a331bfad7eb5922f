//! Property generators.
//!
//! Each generator is a pure function of a node and its traversal context.
//! Generators never fail: missing optional fields simply produce no
//! annotation. [`run_generators`] applies the enabled ones in a fixed order,
//! because accessibility and interaction synthesis read the semantic role
//! computed earlier in the same pass.

pub mod accessibility;
pub mod interactions;
pub mod layout;
pub mod semantic;
pub mod style;
pub mod tokens;
pub mod variants;

use crate::annotated::AnnotatedNode;
use crate::config::RuleConfiguration;
use crate::node::Node;
use crate::walker::TraversalContext;

/// Run every enabled generator against `node`, filling `annotated`.
///
/// Order: style, semantic role, accessibility, tokens, variants,
/// interaction states, layout context.
pub fn run_generators(
    annotated: &mut AnnotatedNode,
    node: &Node,
    ctx: &TraversalContext,
    config: &RuleConfiguration,
) {
    let toggles = &config.optimizations;

    if toggles.generate_styles {
        annotated.css_styles = Some(style::derive_styles(node));
    }
    if toggles.infer_semantics {
        annotated.semantic = semantic::infer_semantics(node);
    }
    if toggles.generate_accessibility {
        annotated.accessibility = Some(accessibility::generate_accessibility(
            node,
            annotated.semantic.as_ref(),
        ));
    }
    if toggles.extract_tokens {
        let profile = config.frameworks.active_profile();
        annotated.design_tokens = Some(tokens::extract_tokens(node, &profile));
    }
    if toggles.detect_variants {
        annotated.variants = variants::detect_variants(node);
    }
    if toggles.synthesize_interactions {
        annotated.interactions = Some(interactions::synthesize_interactions(
            annotated.semantic.as_ref(),
        ));
    }
    if toggles.compute_layout_context {
        annotated.layout_context = Some(layout::layout_context(ctx));
    }
}

/// Format a document-unit number for style output, rounded to 2 decimals.
#[must_use]
pub fn css_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.abs() < f64::EPSILON {
        // no "-0"
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Format a length in `px`.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{}px", css_number(value))
}
