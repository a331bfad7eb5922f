//! Accessibility metadata derived from the node name and semantic role.

use crate::annotated::{AccessibilityInfo, SemanticInfo, SemanticRole};
use crate::node::Node;

/// Default layer names the design tool assigns to new shapes.
pub const AUTO_NAME_PREFIXES: [&str; 9] = [
    "Rectangle", "Ellipse", "Frame", "Group", "Vector", "Line", "Polygon", "Star", "Image",
];

/// Whether a layer name starts with a default shape name ("Rectangle",
/// "Ellipse 12", "Rectangle Promo").
///
/// The prefix must end at a word boundary, so "Framework" is not a match.
#[must_use]
pub fn is_auto_generated_name(name: &str) -> bool {
    AUTO_NAME_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
    })
}

/// Build accessibility metadata for a node.
///
/// Images with a generated name get an empty alt text, marking them decorative.
#[must_use]
pub fn generate_accessibility(node: &Node, semantic: Option<&SemanticInfo>) -> AccessibilityInfo {
    let name = node.name.trim();
    let label = (!name.is_empty() && !is_auto_generated_name(name)).then(|| name.to_string());

    let mut info = AccessibilityInfo {
        label,
        ..AccessibilityInfo::default()
    };

    match semantic.map(|s| s.role) {
        Some(SemanticRole::Button) => {
            info.role = Some("button".to_string());
            info.focusable = true;
            info.tab_index = Some(0);
        }
        Some(SemanticRole::Input) => {
            info.role = Some("textbox".to_string());
            info.focusable = true;
            info.tab_index = Some(0);
        }
        Some(SemanticRole::Navigation) => {
            info.role = Some("navigation".to_string());
        }
        Some(SemanticRole::Image) => {
            info.role = Some("img".to_string());
            info.alt_text = Some(info.label.clone().unwrap_or_default());
        }
        Some(SemanticRole::Text | SemanticRole::Container) | None => {}
    }

    info
}
