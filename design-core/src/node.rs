//! Raw design-tree nodes as delivered by the fetch layer.
//!
//! Field names follow the design tool's JSON (camelCase), so a fetched
//! document deserializes directly into [`Node`].

use serde::{Deserialize, Serialize};

use crate::{DesignError, DesignResult};

/// The kind of a design node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Root of the file.
    Document,
    /// A page.
    #[serde(alias = "PAGE")]
    Canvas,
    /// Layout container (frames, groups, sections).
    #[serde(alias = "GROUP", alias = "SECTION")]
    Frame,
    /// Text layer.
    Text,
    /// Vector or primitive shape.
    #[serde(
        alias = "RECTANGLE",
        alias = "ELLIPSE",
        alias = "LINE",
        alias = "STAR",
        alias = "POLYGON",
        alias = "BOOLEAN_OPERATION"
    )]
    Vector,
    /// Main component definition.
    #[serde(alias = "COMPONENT_SET")]
    Component,
    /// Placed instance of a component.
    Instance,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl NodeType {
    /// Whether this is a component or a component instance.
    #[must_use]
    pub const fn is_component_like(self) -> bool {
        matches!(self, Self::Component | Self::Instance)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Document => "DOCUMENT",
            Self::Canvas => "CANVAS",
            Self::Frame => "FRAME",
            Self::Text => "TEXT",
            Self::Vector => "VECTOR",
            Self::Component => "COMPONENT",
            Self::Instance => "INSTANCE",
            Self::Other => "OTHER",
        };
        f.write_str(tag)
    }
}

/// Axis-aligned bounding box in document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Create a bounding box.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Euclidean distance from a point to the box center.
    #[must_use]
    pub fn distance_to_center(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.center();
        (x - cx).hypot(y - cy)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Auto-layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    /// No auto layout.
    None,
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

/// Alignment along an auto-layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisAlign {
    /// Start of the axis.
    Min,
    /// Centered.
    Center,
    /// End of the axis.
    Max,
    /// Distributed with space between items.
    SpaceBetween,
    /// Text baseline (counter axis only).
    Baseline,
}

/// RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

fn visible_by_default() -> bool {
    true
}

/// Paint type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    /// Flat color.
    Solid,
    /// Linear gradient.
    GradientLinear,
    /// Radial gradient.
    GradientRadial,
    /// Angular gradient.
    GradientAngular,
    /// Diamond gradient.
    GradientDiamond,
    /// Bitmap image.
    Image,
    /// Any other paint.
    #[serde(other)]
    Other,
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    /// Paint type.
    #[serde(rename = "type")]
    pub kind: PaintKind,
    /// Whether the paint is shown.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Color for solid paints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Paint opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Paint {
    /// Create a visible solid paint.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintKind::Solid,
            visible: true,
            color: Some(color),
            opacity: None,
        }
    }
}

/// Effect type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    /// Outer drop shadow.
    DropShadow,
    /// Inner shadow.
    InnerShadow,
    /// Layer blur.
    LayerBlur,
    /// Background blur.
    BackgroundBlur,
    /// Any other effect.
    #[serde(other)]
    Other,
}

/// 2D offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

/// Visual effect (shadow, blur).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect type.
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Whether the effect is shown.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Shadow color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Shadow offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vector2>,
    /// Blur radius.
    #[serde(default)]
    pub radius: f64,
    /// Shadow spread.
    #[serde(default)]
    pub spread: f64,
}

/// Typography of a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Numeric font weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<f64>,
    /// Font size in document units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Line height in document units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height_px: Option<f64>,
    /// Letter spacing in document units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Horizontal alignment tag (`LEFT`, `CENTER`, `RIGHT`, `JUSTIFIED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<String>,
}

/// A node of the raw design tree.
///
/// A node owns its children and never points back at its parent; parent
/// context is handed down during traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Identifier, unique within the tree.
    pub id: String,
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Visibility flag.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Lock flag.
    #[serde(default)]
    pub locked: bool,
    /// Absolute bounding box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_bounding_box: Option<Bounds>,
    /// Auto-layout direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,
    /// Alignment along the layout direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_axis_align_items: Option<AxisAlign>,
    /// Alignment across the layout direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_axis_align_items: Option<AxisAlign>,
    /// Gap between auto-layout children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_spacing: Option<f64>,
    /// Left padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<f64>,
    /// Right padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<f64>,
    /// Top padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,
    /// Bottom padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<f64>,
    /// Fills, bottom-most first. Text fills for text nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Paint>,
    /// Strokes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<Paint>,
    /// Effects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    /// Typography for text nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TypeStyle>,
    /// Uniform corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Layer opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Text content of text nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    /// Children, absent for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create a bare node with the given identity.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            visible: true,
            locked: false,
            absolute_bounding_box: None,
            layout_mode: None,
            primary_axis_align_items: None,
            counter_axis_align_items: None,
            item_spacing: None,
            padding_left: None,
            padding_right: None,
            padding_top: None,
            padding_bottom: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            effects: Vec::new(),
            style: None,
            corner_radius: None,
            opacity: None,
            characters: None,
            children: None,
        }
    }

    /// Set the bounding box.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.absolute_bounding_box = Some(bounds);
        self
    }

    /// Set the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }

    /// Children as a slice (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether auto layout is active.
    #[must_use]
    pub fn has_auto_layout(&self) -> bool {
        matches!(
            self.layout_mode,
            Some(LayoutMode::Horizontal | LayoutMode::Vertical)
        )
    }

    /// Whether this node or any descendant carries text content.
    #[must_use]
    pub fn has_text_content(&self) -> bool {
        self.characters.as_deref().is_some_and(|c| !c.is_empty())
            || self.children().iter().any(Node::has_text_content)
    }

    /// First visible solid fill color.
    #[must_use]
    pub fn first_solid_fill(&self) -> Option<Color> {
        self.fills
            .iter()
            .find(|p| p.visible && p.kind == PaintKind::Solid)
            .and_then(|p| p.color)
    }

    /// Check the node's own data is usable for annotation.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidNode`] for an empty id and
    /// [`DesignError::InvalidGeometry`] for non-finite or negative bounds.
    pub fn validate(&self) -> DesignResult<()> {
        if self.id.trim().is_empty() {
            return Err(DesignError::InvalidNode(format!(
                "node named {:?} has an empty id",
                self.name
            )));
        }
        if let Some(bounds) = &self.absolute_bounding_box {
            if !bounds.is_finite() {
                return Err(DesignError::InvalidGeometry {
                    id: self.id.clone(),
                    reason: "bounding box has non-finite values".to_string(),
                });
            }
            if bounds.width < 0.0 || bounds.height < 0.0 {
                return Err(DesignError::InvalidGeometry {
                    id: self.id.clone(),
                    reason: format!("negative size {}x{}", bounds.width, bounds.height),
                });
            }
        }
        Ok(())
    }
}
