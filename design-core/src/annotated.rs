//! Annotated design tree - a node plus derived presentation and semantic metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::{Bounds, LayoutMode, Node, NodeType};
use crate::DesignResult;

/// Fields a rule merge may never overwrite.
const PROTECTED_FIELDS: [&str; 4] = ["id", "name", "type", "children"];

/// Style declarations in insertion order.
///
/// Inserting an existing key replaces its value in place. Values are always
/// strings; deserializing any other JSON value fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct StyleMap(Map<String, Value>);

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a declaration.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    /// Look up a declaration.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl TryFrom<Map<String, Value>> for StyleMap {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        match map.iter().find(|(_, v)| !v.is_string()) {
            Some((key, _)) => Err(format!("style {key:?} must be a string")),
            None => Ok(Self(map)),
        }
    }
}

/// Inferred semantic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticRole {
    /// Clickable control.
    Button,
    /// Data entry control.
    Input,
    /// Navigation region.
    Navigation,
    /// Text content.
    Text,
    /// Layout container.
    Container,
    /// Image or media.
    Image,
}

/// Best-effort semantic classification of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticInfo {
    /// Role.
    pub role: SemanticRole,
    /// Purpose tag (`interactive`, `data-entry`, `layout`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Text hierarchy level 1-6 for text roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<u8>,
}

/// Accessibility metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityInfo {
    /// Accessible label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// ARIA-style role token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Whether the element takes keyboard focus.
    #[serde(default)]
    pub focusable: bool,
    /// Tab order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
    /// Alternative text for image roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// Design token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Color value.
    Color,
    /// Font metric.
    Typography,
    /// Padding or gap.
    Spacing,
}

/// A design token extracted from a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignToken {
    /// Token name.
    pub name: String,
    /// Token value as a style string.
    pub value: String,
    /// Token kind.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Category within the kind (`background`, `font-size`, `padding`, ...).
    pub category: String,
}

/// Variant state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantState {
    /// Resting state.
    Default,
    /// Pointer over.
    Hover,
    /// Disabled.
    Disabled,
}

/// A component variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVariant {
    /// Variant name.
    pub name: String,
    /// Property overrides for this variant.
    pub properties: BTreeMap<String, String>,
    /// State tag.
    pub state: VariantState,
}

/// What triggers an interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionTrigger {
    /// Pointer over.
    Hover,
    /// Press.
    Click,
    /// Keyboard focus.
    Focus,
}

/// Transition timing for an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationTiming {
    /// Duration in milliseconds.
    pub duration_ms: u32,
    /// Easing function name.
    pub easing: String,
}

/// A synthesized interaction state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    /// Trigger.
    pub trigger: InteractionTrigger,
    /// Style changes applied while the state is active.
    pub changes: BTreeMap<String, String>,
    /// Transition timing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationTiming>,
}

/// Where a node sits among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    /// First of several.
    First,
    /// Last of several.
    Last,
    /// Sole child (or root).
    Only,
    /// Neither first nor last.
    Middle,
}

impl SiblingPosition {
    /// Classify an index among `count` siblings.
    #[must_use]
    pub const fn from_index(index: usize, count: usize) -> Self {
        if count <= 1 {
            Self::Only
        } else if index == 0 {
            Self::First
        } else if index + 1 == count {
            Self::Last
        } else {
            Self::Middle
        }
    }
}

/// Summary of a node's placement in its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutContext {
    /// Parent node type, absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<NodeType>,
    /// Number of children the parent has.
    pub sibling_count: usize,
    /// Position among siblings.
    pub position: SiblingPosition,
    /// Flex order when the parent uses auto layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex_order: Option<usize>,
}

/// A node enriched with derived metadata.
///
/// Optional collections distinguish "generator did not run" (`None`) from
/// "generator ran and found nothing" (`Some(empty)`); the context reducer
/// collapses the latter to `None` when stripping is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedNode {
    /// Source node id.
    pub id: String,
    /// Source node name.
    pub name: String,
    /// Source node type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Set on minimal stubs (filtered, too deep or failed nodes).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stub: bool,
    /// Source bounding box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Source layout mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,
    /// Source text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    /// Derived style declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_styles: Option<StyleMap>,
    /// Semantic classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticInfo>,
    /// Accessibility metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityInfo>,
    /// Extracted design tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_tokens: Option<Vec<DesignToken>>,
    /// Component variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ComponentVariant>>,
    /// Interaction states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Vec<InteractionState>>,
    /// Placement summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_context: Option<LayoutContext>,
    /// Fields merged in by rules that have no typed slot.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Annotated children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AnnotatedNode>>,
}

impl AnnotatedNode {
    /// Annotation shell for a node: identity plus copied source fields.
    #[must_use]
    pub fn shell(node: &Node) -> Self {
        Self {
            stub: false,
            bounds: node.absolute_bounding_box,
            layout_mode: node.layout_mode,
            characters: node.characters.clone(),
            ..Self::stub(node)
        }
    }

    /// Minimal stub carrying only identity fields.
    #[must_use]
    pub fn stub(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type,
            stub: true,
            bounds: None,
            layout_mode: None,
            characters: None,
            css_styles: None,
            semantic: None,
            accessibility: None,
            design_tokens: None,
            variants: None,
            interactions: None,
            layout_context: None,
            extra: serde_json::Map::new(),
            children: None,
        }
    }

    /// Children as a slice (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[AnnotatedNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Number of nodes in this subtree, including stubs.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }

    /// Shallow-merge JSON fields into the annotation.
    ///
    /// Known fields are replaced with the merged value (and must still
    /// deserialize to their typed slot); unknown keys land in [`Self::extra`].
    /// Identity fields and children are never touched.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when a merged value does not fit its
    /// typed field. The annotation is left unchanged in that case.
    pub fn merge_fields(
        &mut self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> DesignResult<()> {
        let children = self.children.take();
        let merged = serde_json::to_value(&*self).and_then(|mut value| {
            if let Some(object) = value.as_object_mut() {
                for (key, field) in fields {
                    if !PROTECTED_FIELDS.contains(&key.as_str()) {
                        object.insert(key.clone(), field.clone());
                    }
                }
            }
            serde_json::from_value::<Self>(value)
        });
        match merged {
            Ok(mut updated) => {
                updated.children = children;
                *self = updated;
                Ok(())
            }
            Err(e) => {
                self.children = children;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AnnotatedNode {
        AnnotatedNode::shell(&Node::new("1:1", "Card", NodeType::Frame))
    }

    #[test]
    fn test_style_map_preserves_insertion_order() {
        let mut styles = StyleMap::new();
        styles.insert("width", "10px");
        styles.insert("height", "20px");
        styles.insert("background-color", "rgb(0, 0, 0)");
        styles.insert("width", "12px");

        assert_eq!(
            styles.keys().collect::<Vec<_>>(),
            vec!["width", "height", "background-color"]
        );
        assert_eq!(styles.get("width"), Some("12px"));

        let json = serde_json::to_string(&styles).expect("serialize");
        assert_eq!(
            json,
            r#"{"width":"12px","height":"20px","background-color":"rgb(0, 0, 0)"}"#
        );
        let back: StyleMap = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, styles);
    }

    #[test]
    fn test_style_map_rejects_non_string_values() {
        let result = serde_json::from_str::<StyleMap>(r#"{"width":"10px","opacity":0.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sibling_position_from_index() {
        assert_eq!(SiblingPosition::from_index(0, 1), SiblingPosition::Only);
        assert_eq!(SiblingPosition::from_index(0, 3), SiblingPosition::First);
        assert_eq!(SiblingPosition::from_index(1, 3), SiblingPosition::Middle);
        assert_eq!(SiblingPosition::from_index(2, 3), SiblingPosition::Last);
    }

    #[test]
    fn test_stub_serializes_identity_only() {
        let stub = AnnotatedNode::stub(&Node::new("7", "Hidden", NodeType::Text));
        let value = serde_json::to_value(&stub).expect("serialize");
        assert_eq!(
            value,
            json!({ "id": "7", "name": "Hidden", "type": "TEXT", "stub": true })
        );
    }

    #[test]
    fn test_merge_fields_unknown_keys_go_to_extra() {
        let mut node = sample();
        let fields = json!({ "componentHint": "Card", "priority": 3 });
        node.merge_fields(fields.as_object().expect("object"))
            .expect("merge");

        assert_eq!(node.extra["componentHint"], "Card");
        assert_eq!(node.extra["priority"], 3);
    }

    #[test]
    fn test_merge_fields_replaces_typed_field() {
        let mut node = sample();
        let fields = json!({ "semantic": { "role": "button", "purpose": "cta" } });
        node.merge_fields(fields.as_object().expect("object"))
            .expect("merge");

        let semantic = node.semantic.expect("semantic set");
        assert_eq!(semantic.role, SemanticRole::Button);
        assert_eq!(semantic.purpose.as_deref(), Some("cta"));
        assert!(node.extra.is_empty());
    }

    #[test]
    fn test_merge_fields_protects_identity() {
        let mut node = sample();
        let fields = json!({ "id": "other", "name": "Renamed", "type": "TEXT" });
        node.merge_fields(fields.as_object().expect("object"))
            .expect("merge");

        assert_eq!(node.id, "1:1");
        assert_eq!(node.name, "Card");
        assert_eq!(node.node_type, NodeType::Frame);
    }

    #[test]
    fn test_merge_fields_rejects_mistyped_value() {
        let mut node = sample();
        let before = node.clone();
        let fields = json!({ "semantic": "not an object" });

        assert!(node
            .merge_fields(fields.as_object().expect("object"))
            .is_err());
        assert_eq!(node, before);
    }

    #[test]
    fn test_node_count_includes_stubs() {
        let mut root = sample();
        root.children = Some(vec![
            sample(),
            AnnotatedNode::stub(&Node::new("2", "x", NodeType::Vector)),
        ]);
        assert_eq!(root.node_count(), 3);
    }
}
