//! Design-token extraction.
//!
//! Tokens are advisory and not deduplicated across the tree.

use crate::annotated::{DesignToken, TokenKind};
use crate::config::FrameworkProfile;
use crate::node::{Node, NodeType, PaintKind};

use super::px;
use super::style::{color_to_css, padding_shorthand};

/// Extract color, typography and spacing tokens from a node.
#[must_use]
pub fn extract_tokens(node: &Node, profile: &FrameworkProfile) -> Vec<DesignToken> {
    let name = |parts: &[&str]| {
        let mut joined = vec![node.name.as_str()];
        joined.extend_from_slice(parts);
        let base = profile.naming.join(&joined);
        match &profile.token_prefix {
            Some(prefix) => format!("{prefix}{base}"),
            None => base,
        }
    };
    let is_text = node.node_type == NodeType::Text;
    let mut tokens = Vec::new();

    for (index, fill) in node.fills.iter().enumerate() {
        if fill.kind != PaintKind::Solid {
            continue;
        }
        if let Some(color) = &fill.color {
            let index = index.to_string();
            tokens.push(DesignToken {
                name: name(&[index.as_str(), "fill"]),
                value: color_to_css(color),
                kind: TokenKind::Color,
                category: if is_text { "text" } else { "background" }.to_string(),
            });
        }
    }

    if is_text {
        if let Some(style) = &node.style {
            if let Some(size) = style.font_size {
                tokens.push(DesignToken {
                    name: name(&["font", "size"]),
                    value: px(size),
                    kind: TokenKind::Typography,
                    category: "font-size".to_string(),
                });
            }
            if let Some(line_height) = style.line_height_px {
                tokens.push(DesignToken {
                    name: name(&["line", "height"]),
                    value: px(line_height),
                    kind: TokenKind::Typography,
                    category: "line-height".to_string(),
                });
            }
        }
    }

    let any_padding = [
        node.padding_top,
        node.padding_right,
        node.padding_bottom,
        node.padding_left,
    ]
    .iter()
    .any(|side| side.is_some_and(|v| v.abs() > f64::EPSILON));
    if any_padding {
        if let Some(padding) = padding_shorthand(node) {
            tokens.push(DesignToken {
                name: name(&["padding"]),
                value: padding,
                kind: TokenKind::Spacing,
                category: "padding".to_string(),
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConvention;
    use crate::node::{Color, Paint, TypeStyle};

    fn solid(r: f64) -> Paint {
        Paint::solid(Color {
            r,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        })
    }

    #[test]
    fn test_one_color_token_per_solid_fill() {
        let mut node = Node::new("1", "Primary Button", NodeType::Instance);
        node.fills = vec![
            solid(1.0),
            Paint {
                kind: PaintKind::GradientLinear,
                visible: true,
                color: None,
                opacity: None,
            },
            solid(0.0),
        ];

        let tokens = extract_tokens(&node, &FrameworkProfile::default());

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "primary-button-0-fill");
        assert_eq!(tokens[0].value, "rgb(255, 0, 0)");
        assert_eq!(tokens[0].kind, TokenKind::Color);
        assert_eq!(tokens[0].category, "background");
        assert_eq!(tokens[1].name, "primary-button-2-fill");
    }

    #[test]
    fn test_text_typography_tokens() {
        let mut node = Node::new("1", "Body", NodeType::Text);
        node.style = Some(TypeStyle {
            font_size: Some(16.0),
            line_height_px: Some(24.0),
            ..TypeStyle::default()
        });
        node.fills = vec![solid(0.0)];

        let tokens = extract_tokens(&node, &FrameworkProfile::default());
        let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["body-0-fill", "body-font-size", "body-line-height"]);
        assert_eq!(tokens[0].category, "text");
        assert_eq!(tokens[1].value, "16px");
        assert_eq!(tokens[2].kind, TokenKind::Typography);
    }

    #[test]
    fn test_padding_token_only_when_non_zero() {
        let mut node = Node::new("1", "Card", NodeType::Frame);
        node.padding_left = Some(0.0);
        assert!(extract_tokens(&node, &FrameworkProfile::default()).is_empty());

        node.padding_top = Some(12.0);
        let tokens = extract_tokens(&node, &FrameworkProfile::default());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Spacing);
        assert_eq!(tokens[0].value, "12px 0px 0px 0px");
    }

    #[test]
    fn test_profile_naming_and_prefix() {
        let mut node = Node::new("1", "Primary Button", NodeType::Instance);
        node.fills = vec![solid(1.0)];
        let profile = FrameworkProfile {
            naming: NamingConvention::Camel,
            token_prefix: Some("ds.".to_string()),
        };

        let tokens = extract_tokens(&node, &profile);
        assert_eq!(tokens[0].name, "ds.primaryButton0Fill");
    }
}
