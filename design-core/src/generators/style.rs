//! Style derivation: geometry, auto layout, paints, typography and shadows
//! translated to CSS-like declarations.

use crate::annotated::StyleMap;
use crate::node::{AxisAlign, Color, EffectKind, LayoutMode, Node, NodeType};

use super::{css_number, px};

/// Shadow color used when an effect carries none.
pub const DEFAULT_SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.25)";

/// Auto-layout alignment translation table.
const ALIGNMENT_TABLE: [(AxisAlign, &str); 5] = [
    (AxisAlign::Min, "start"),
    (AxisAlign::Center, "center"),
    (AxisAlign::Max, "end"),
    (AxisAlign::SpaceBetween, "space-between"),
    (AxisAlign::Baseline, "baseline"),
];

/// Translate an axis alignment.
#[must_use]
pub fn alignment(align: AxisAlign) -> &'static str {
    ALIGNMENT_TABLE
        .iter()
        .find(|(a, _)| *a == align)
        .map_or("start", |(_, css)| *css)
}

/// Convert a 0-1 color to `rgb(...)` when opaque, `rgba(...)` otherwise.
///
/// Channels are scaled by 255 and rounded; alpha is passed through as is.
#[must_use]
pub fn color_to_css(color: &Color) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let (r, g, b) = (channel(color.r), channel(color.g), channel(color.b));

    if (color.a - 1.0).abs() < f64::EPSILON {
        format!("rgb({r}, {g}, {b})")
    } else {
        format!("rgba({r}, {g}, {b}, {})", color.a)
    }
}

/// Padding shorthand (top right bottom left) if any padding field is set.
#[must_use]
pub fn padding_shorthand(node: &Node) -> Option<String> {
    let sides = [
        node.padding_top,
        node.padding_right,
        node.padding_bottom,
        node.padding_left,
    ];
    if sides.iter().all(Option::is_none) {
        return None;
    }
    Some(
        sides
            .iter()
            .map(|side| px(side.unwrap_or(0.0)))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Comma-separated list of visible drop shadows.
#[must_use]
pub fn box_shadow(node: &Node) -> Option<String> {
    let shadows: Vec<String> = node
        .effects
        .iter()
        .filter(|e| e.visible && e.kind == EffectKind::DropShadow)
        .map(|e| {
            let (x, y) = e.offset.map_or((0.0, 0.0), |o| (o.x, o.y));
            let color = e
                .color
                .as_ref()
                .map_or_else(|| DEFAULT_SHADOW_COLOR.to_string(), color_to_css);
            format!("{} {} {} {} {color}", px(x), px(y), px(e.radius), px(e.spread))
        })
        .collect();

    (!shadows.is_empty()).then(|| shadows.join(", "))
}

/// Derive style declarations for a node.
#[must_use]
pub fn derive_styles(node: &Node) -> StyleMap {
    let mut styles = StyleMap::new();

    if let Some(bounds) = &node.absolute_bounding_box {
        styles.insert("width", px(bounds.width));
        styles.insert("height", px(bounds.height));
    }

    if let Some(mode @ (LayoutMode::Horizontal | LayoutMode::Vertical)) = node.layout_mode {
        styles.insert("display", "flex");
        styles.insert(
            "flex-direction",
            if mode == LayoutMode::Horizontal {
                "row"
            } else {
                "column"
            },
        );
        if let Some(align) = node.primary_axis_align_items {
            styles.insert("justify-content", alignment(align));
        }
        if let Some(align) = node.counter_axis_align_items {
            styles.insert("align-items", alignment(align));
        }
        if let Some(gap) = node.item_spacing {
            styles.insert("gap", px(gap));
        }
    }

    if let Some(padding) = padding_shorthand(node) {
        styles.insert("padding", padding);
    }

    let is_text = node.node_type == NodeType::Text;
    if !is_text {
        if let Some(fill) = node.first_solid_fill() {
            styles.insert("background-color", color_to_css(&fill));
        }
    }

    if let Some(radius) = node.corner_radius {
        styles.insert("border-radius", px(radius));
    }
    if let Some(opacity) = node.opacity {
        styles.insert("opacity", css_number(opacity));
    }

    if is_text {
        if let Some(style) = &node.style {
            if let Some(family) = &style.font_family {
                styles.insert("font-family", family.clone());
            }
            if let Some(size) = style.font_size {
                styles.insert("font-size", px(size));
            }
            if let Some(weight) = style.font_weight {
                styles.insert("font-weight", css_number(weight));
            }
            if let Some(line_height) = style.line_height_px {
                styles.insert("line-height", px(line_height));
            }
            if let Some(spacing) = style.letter_spacing {
                styles.insert("letter-spacing", px(spacing));
            }
            if let Some(align) = &style.text_align_horizontal {
                let css = match align.as_str() {
                    "CENTER" => "center",
                    "RIGHT" => "right",
                    "JUSTIFIED" => "justify",
                    _ => "left",
                };
                styles.insert("text-align", css);
            }
        }
        if let Some(fill) = node.first_solid_fill() {
            styles.insert("color", color_to_css(&fill));
        }
    }

    if let Some(shadow) = box_shadow(node) {
        styles.insert("box-shadow", shadow);
    }

    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Bounds, Effect, Paint, TypeStyle, Vector2};

    fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    fn shadow(visible: bool, color: Option<Color>) -> Effect {
        Effect {
            kind: EffectKind::DropShadow,
            visible,
            color,
            offset: Some(Vector2 { x: 0.0, y: 4.0 }),
            radius: 8.0,
            spread: 0.0,
        }
    }

    #[test]
    fn test_color_opaque_white() {
        assert_eq!(
            color_to_css(&rgba(1.0, 1.0, 1.0, 1.0)),
            "rgb(255, 255, 255)"
        );
    }

    #[test]
    fn test_color_translucent_keeps_alpha() {
        assert_eq!(
            color_to_css(&rgba(1.0, 1.0, 1.0, 0.5)),
            "rgba(255, 255, 255, 0.5)"
        );
        assert_eq!(
            color_to_css(&rgba(0.2, 0.4, 0.6, 0.123)),
            "rgba(51, 102, 153, 0.123)"
        );
    }

    #[test]
    fn test_color_rounds_channels() {
        // 0.5 * 255 = 127.5 rounds away from zero
        assert_eq!(color_to_css(&rgba(0.5, 0.0, 0.0, 1.0)), "rgb(128, 0, 0)");
    }

    #[test]
    fn test_alignment_table() {
        assert_eq!(alignment(AxisAlign::Min), "start");
        assert_eq!(alignment(AxisAlign::Center), "center");
        assert_eq!(alignment(AxisAlign::Max), "end");
        assert_eq!(alignment(AxisAlign::SpaceBetween), "space-between");
    }

    #[test]
    fn test_frame_with_auto_layout() {
        let mut node = Node::new("1", "Row", NodeType::Frame)
            .with_bounds(Bounds::new(0.0, 0.0, 320.0, 48.0));
        node.layout_mode = Some(LayoutMode::Horizontal);
        node.primary_axis_align_items = Some(AxisAlign::SpaceBetween);
        node.counter_axis_align_items = Some(AxisAlign::Center);
        node.item_spacing = Some(8.0);
        node.padding_top = Some(4.0);
        node.padding_left = Some(16.0);
        node.fills = vec![Paint::solid(rgba(1.0, 1.0, 1.0, 1.0))];
        node.corner_radius = Some(6.0);

        let styles = derive_styles(&node);

        assert_eq!(
            styles.keys().collect::<Vec<_>>(),
            vec![
                "width",
                "height",
                "display",
                "flex-direction",
                "justify-content",
                "align-items",
                "gap",
                "padding",
                "background-color",
                "border-radius",
            ]
        );
        assert_eq!(styles.get("flex-direction"), Some("row"));
        assert_eq!(styles.get("justify-content"), Some("space-between"));
        assert_eq!(styles.get("padding"), Some("4px 0px 0px 16px"));
        assert_eq!(styles.get("background-color"), Some("rgb(255, 255, 255)"));
    }

    #[test]
    fn test_layout_none_emits_no_flex() {
        let mut node = Node::new("1", "Box", NodeType::Frame);
        node.layout_mode = Some(LayoutMode::None);
        node.item_spacing = Some(10.0);

        let styles = derive_styles(&node);
        assert!(styles.get("display").is_none());
        assert!(styles.get("gap").is_none());
    }

    #[test]
    fn test_text_node_maps_typography_and_foreground() {
        let mut node = Node::new("1", "Heading", NodeType::Text);
        node.style = Some(TypeStyle {
            font_family: Some("Inter".to_string()),
            font_weight: Some(700.0),
            font_size: Some(24.0),
            line_height_px: Some(32.0),
            letter_spacing: Some(-0.5),
            text_align_horizontal: Some("CENTER".to_string()),
        });
        node.fills = vec![Paint::solid(rgba(0.0, 0.0, 0.0, 1.0))];

        let styles = derive_styles(&node);

        assert_eq!(styles.get("font-family"), Some("Inter"));
        assert_eq!(styles.get("font-size"), Some("24px"));
        assert_eq!(styles.get("font-weight"), Some("700"));
        assert_eq!(styles.get("line-height"), Some("32px"));
        assert_eq!(styles.get("letter-spacing"), Some("-0.5px"));
        assert_eq!(styles.get("text-align"), Some("center"));
        assert_eq!(styles.get("color"), Some("rgb(0, 0, 0)"));
        assert!(styles.get("background-color").is_none());
    }

    #[test]
    fn test_shadows_filter_hidden_and_default_color() {
        let mut node = Node::new("1", "Card", NodeType::Frame);
        node.effects = vec![
            shadow(true, None),
            shadow(false, Some(rgba(1.0, 0.0, 0.0, 1.0))),
            shadow(true, Some(rgba(0.0, 0.0, 0.0, 0.1))),
            Effect {
                kind: EffectKind::LayerBlur,
                visible: true,
                color: None,
                offset: None,
                radius: 4.0,
                spread: 0.0,
            },
        ];

        let styles = derive_styles(&node);
        assert_eq!(
            styles.get("box-shadow"),
            Some("0px 4px 8px 0px rgba(0, 0, 0, 0.25), 0px 4px 8px 0px rgba(0, 0, 0, 0.1)")
        );
    }

    #[test]
    fn test_bare_node_produces_empty_styles() {
        let styles = derive_styles(&Node::new("1", "Thing", NodeType::Other));
        assert!(styles.is_empty());
    }
}
