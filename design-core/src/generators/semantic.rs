//! Semantic-role inference.
//!
//! Best-effort classification from naming conventions and node shape. The
//! rules are an ordered table and the first match wins; misclassifications
//! are expected and can be corrected with custom rules.

use crate::annotated::{SemanticInfo, SemanticRole};
use crate::node::{Node, NodeType, PaintKind};

/// Name keywords (matched case-insensitively as substrings), in precedence order.
pub const KEYWORD_ROLES: [(&[&str], SemanticRole, &str); 3] = [
    (&["button", "btn"], SemanticRole::Button, "interactive"),
    (&["input", "field", "textbox"], SemanticRole::Input, "data-entry"),
    (&["nav", "menu", "header"], SemanticRole::Navigation, "navigation"),
];

/// Font-size thresholds for text hierarchy levels 1-5; smaller is level 6.
pub const HIERARCHY_THRESHOLDS: [(f64, u8); 5] = [(32.0, 1), (24.0, 2), (20.0, 3), (18.0, 4), (16.0, 5)];

/// Text hierarchy level for a font size.
#[must_use]
pub fn text_hierarchy(font_size: f64) -> u8 {
    HIERARCHY_THRESHOLDS
        .iter()
        .find(|(min, _)| font_size >= *min)
        .map_or(6, |(_, level)| *level)
}

/// Infer a semantic role for a node, or `None` when nothing matches.
#[must_use]
pub fn infer_semantics(node: &Node) -> Option<SemanticInfo> {
    let name = node.name.to_lowercase();

    if let Some((_, role, purpose)) = KEYWORD_ROLES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| name.contains(*k)))
    {
        return Some(SemanticInfo {
            role: *role,
            purpose: Some((*purpose).to_string()),
            hierarchy: None,
        });
    }

    if node.node_type == NodeType::Text {
        return Some(SemanticInfo {
            role: SemanticRole::Text,
            purpose: Some("content".to_string()),
            hierarchy: node
                .style
                .as_ref()
                .and_then(|s| s.font_size)
                .map(text_hierarchy),
        });
    }

    if node
        .fills
        .iter()
        .any(|p| p.visible && p.kind == PaintKind::Image)
    {
        return Some(SemanticInfo {
            role: SemanticRole::Image,
            purpose: Some("media".to_string()),
            hierarchy: None,
        });
    }

    if node.node_type == NodeType::Frame && !node.children().is_empty() {
        return Some(SemanticInfo {
            role: SemanticRole::Container,
            purpose: Some("layout".to_string()),
            hierarchy: None,
        });
    }

    None
}
