//! Spatial comment matching.
//!
//! Designer comments are pinned to document coordinates or reference a node
//! directly. Each comment is resolved against a flattened, pre-order index
//! of the annotated tree's bounding boxes.

use serde::{Deserialize, Serialize};

use crate::annotated::AnnotatedNode;
use crate::node::{Bounds, NodeType};

/// Comments whose point lies outside every box still match a box whose
/// center is at most this far away.
pub const PROXIMITY_THRESHOLD: f64 = 100.0;

/// Target reported for comments that match nothing.
pub const UNASSIGNED_TARGET: &str = "apply to relevant element";

/// Separator between ancestor names in [`BoundsEntry::path`].
pub const PATH_SEPARATOR: &str = " > ";

/// A document coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A designer comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Comment text.
    pub message: String,
    /// Author handle.
    #[serde(default)]
    pub author: String,
    /// Pinned coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Directly referenced node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl CommentRecord {
    /// Comment pinned at a point.
    pub fn at(message: impl Into<String>, author: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            message: message.into(),
            author: author.into(),
            position: Some(Point::new(x, y)),
            node_id: None,
        }
    }

    /// Comment attached to a node.
    pub fn on_node(
        message: impl Into<String>,
        author: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            author: author.into(),
            position: None,
            node_id: Some(node_id.into()),
        }
    }
}

/// One node in the bounds index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsEntry {
    /// Node id.
    pub id: String,
    /// Node name.
    pub name: String,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Bounding box; absent entries are only reachable by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Ancestor names down to this node, joined by [`PATH_SEPARATOR`].
    pub path: String,
}

/// Flattened node bounds in depth-first pre-order.
///
/// Built per matching call and not cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsIndex {
    entries: Vec<BoundsEntry>,
}

impl BoundsIndex {
    /// Flatten an annotated tree.
    #[must_use]
    pub fn from_tree(root: &AnnotatedNode) -> Self {
        fn visit(node: &AnnotatedNode, parent_path: Option<&str>, entries: &mut Vec<BoundsEntry>) {
            let path = match parent_path {
                Some(parent) => format!("{parent}{PATH_SEPARATOR}{}", node.name),
                None => node.name.clone(),
            };
            entries.push(BoundsEntry {
                id: node.id.clone(),
                name: node.name.clone(),
                node_type: node.node_type,
                bounds: node.bounds,
                path: path.clone(),
            });
            for child in node.children() {
                visit(child, Some(&path), entries);
            }
        }

        let mut entries = Vec::new();
        visit(root, None, &mut entries);
        Self { entries }
    }

    /// Build from pre-flattened entries, kept in the given order.
    #[must_use]
    pub fn from_entries(entries: Vec<BoundsEntry>) -> Self {
        Self { entries }
    }

    /// Entries in pre-order.
    #[must_use]
    pub fn entries(&self) -> &[BoundsEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by node id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BoundsEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Nearest entry to `point`, with how it matched and its distance.
    ///
    /// Boxes containing the point win over boxes merely within
    /// [`PROXIMITY_THRESHOLD`]. Among candidates the smallest distance to
    /// the box center wins; ties go to the earlier entry.
    #[must_use]
    pub fn nearest(&self, point: Point) -> Option<(&BoundsEntry, MatchKind, f64)> {
        let with_distance = || {
            self.entries.iter().filter_map(|entry| {
                entry
                    .bounds
                    .map(|b| (entry, b, b.distance_to_center(point.x, point.y)))
            })
        };

        let contained = with_distance()
            .filter(|(_, b, _)| b.contains(point.x, point.y))
            .map(|(entry, _, distance)| (entry, distance));
        if let Some((entry, distance)) = closest(contained) {
            return Some((entry, MatchKind::Contained, distance));
        }

        let nearby = with_distance()
            .filter(|(_, _, distance)| *distance <= PROXIMITY_THRESHOLD)
            .map(|(entry, _, distance)| (entry, distance));
        closest(nearby).map(|(entry, distance)| (entry, MatchKind::Proximity, distance))
    }
}

fn closest<'a>(
    candidates: impl Iterator<Item = (&'a BoundsEntry, f64)>,
) -> Option<(&'a BoundsEntry, f64)> {
    candidates.fold(None, |best, (entry, distance)| match best {
        Some((_, best_distance)) if best_distance <= distance => best,
        _ => Some((entry, distance)),
    })
}

/// How a comment was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The comment referenced the node id.
    Direct,
    /// The comment point lies inside the node's box.
    Contained,
    /// The node's box center is within the proximity threshold.
    Proximity,
    /// Nothing matched.
    Unassigned,
}

/// A comment resolved to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInstruction {
    /// Comment text.
    pub instruction: String,
    /// Matched node name, or the unassigned placeholder.
    pub target: String,
    /// Comment author.
    pub author: String,
    /// Comment coordinate, if it had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Matched node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Matched node path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// How the comment was resolved.
    pub match_kind: MatchKind,
    /// Distance from the point to the matched box center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Resolve every comment against `index`.
///
/// Output order follows input order and every comment appears exactly once.
/// A direct node reference wins when the id is in the index; an unknown id
/// falls back to the comment's coordinate.
#[must_use]
pub fn match_comments(index: &BoundsIndex, comments: &[CommentRecord]) -> Vec<CommentInstruction> {
    comments
        .iter()
        .map(|comment| {
            let instruction = |entry: Option<&BoundsEntry>, kind, distance| CommentInstruction {
                instruction: comment.message.clone(),
                target: entry.map_or_else(|| UNASSIGNED_TARGET.to_string(), |e| e.name.clone()),
                author: comment.author.clone(),
                position: comment.position,
                node_id: entry.map(|e| e.id.clone()),
                path: entry.map(|e| e.path.clone()),
                match_kind: kind,
                distance,
            };

            if let Some(entry) = comment.node_id.as_deref().and_then(|id| index.get(id)) {
                return instruction(Some(entry), MatchKind::Direct, None);
            }
            if let Some(id) = &comment.node_id {
                tracing::debug!("Comment references unknown node {id}; matching by position");
            }

            match comment.position.and_then(|point| index.nearest(point)) {
                Some((entry, kind, distance)) => instruction(Some(entry), kind, Some(distance)),
                None => instruction(None, MatchKind::Unassigned, None),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn entry(id: &str, bounds: Option<Bounds>) -> BoundsEntry {
        BoundsEntry {
            id: id.to_string(),
            name: format!("Node {id}"),
            node_type: NodeType::Frame,
            bounds,
            path: format!("Node {id}"),
        }
    }

    fn boxed(id: &str, x: f64, y: f64, w: f64, h: f64) -> BoundsEntry {
        entry(id, Some(Bounds::new(x, y, w, h)))
    }

    #[test]
    fn test_index_is_preorder_with_paths() {
        let tree = Node::new("1", "Screen", NodeType::Frame).with_children(vec![
            Node::new("2", "Header", NodeType::Frame)
                .with_children(vec![Node::new("3", "Logo", NodeType::Vector)]),
            Node::new("4", "Body", NodeType::Frame),
        ]);
        let annotated = crate::walker::TreeWalker::new(&crate::RuleConfiguration::default())
            .annotate(&tree)
            .root;

        let index = BoundsIndex::from_tree(&annotated);
        let ids: Vec<_> = index.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(index.entries()[2].path, "Screen > Header > Logo");
        assert_eq!(index.entries()[3].path, "Screen > Body");
    }

    #[test]
    fn test_containing_box_wins_over_nearer_center() {
        let index = BoundsIndex::from_entries(vec![
            boxed("big", 0.0, 0.0, 200.0, 200.0),
            boxed("near", 60.0, 0.0, 10.0, 10.0),
        ]);
        // inside "big" only; "near" has the closer center but does not contain it
        let (entry, kind, _) = index.nearest(Point::new(50.0, 5.0)).expect("match");
        assert_eq!(entry.id, "big");
        assert_eq!(kind, MatchKind::Contained);
    }

    #[test]
    fn test_innermost_box_by_center_distance() {
        let index = BoundsIndex::from_entries(vec![
            boxed("page", 0.0, 0.0, 1000.0, 1000.0),
            boxed("button", 100.0, 50.0, 20.0, 20.0),
        ]);
        let (entry, kind, distance) = index.nearest(Point::new(105.0, 52.0)).expect("match");
        assert_eq!(entry.id, "button");
        assert_eq!(kind, MatchKind::Contained);
        assert!(distance < 10.0);
    }

    #[test]
    fn test_proximity_prefers_nearer_box() {
        let index = BoundsIndex::from_entries(vec![
            boxed("far", 150.0, 50.0, 20.0, 20.0),
            boxed("near", 100.0, 50.0, 20.0, 20.0),
        ]);
        let (entry, kind, _) = index.nearest(Point::new(95.0, 52.0)).expect("match");
        assert_eq!(entry.id, "near");
        assert_eq!(kind, MatchKind::Proximity);
    }

    #[test]
    fn test_ties_keep_preorder() {
        let index = BoundsIndex::from_entries(vec![
            boxed("first", 0.0, 0.0, 10.0, 10.0),
            boxed("second", 0.0, 0.0, 10.0, 10.0),
        ]);
        let (entry, _, _) = index.nearest(Point::new(3.0, 3.0)).expect("match");
        assert_eq!(entry.id, "first");
    }

    #[test]
    fn test_proximity_threshold_is_inclusive() {
        // center (5, 5); point exactly 100 away
        let index = BoundsIndex::from_entries(vec![boxed("a", 0.0, 0.0, 10.0, 10.0)]);
        assert!(index.nearest(Point::new(105.0, 5.0)).is_some());
        assert!(index.nearest(Point::new(105.5, 5.0)).is_none());
    }

    #[test]
    fn test_entries_without_bounds_are_id_only() {
        let index = BoundsIndex::from_entries(vec![entry("stub", None)]);
        assert!(index.nearest(Point::new(0.0, 0.0)).is_none());

        let out = match_comments(&index, &[CommentRecord::on_node("Fix", "ana", "stub")]);
        assert_eq!(out[0].match_kind, MatchKind::Direct);
        assert_eq!(out[0].target, "Node stub");
    }

    #[test]
    fn test_direct_reference_beats_coordinates() {
        let index = BoundsIndex::from_entries(vec![
            boxed("here", 0.0, 0.0, 50.0, 50.0),
            boxed("there", 500.0, 500.0, 50.0, 50.0),
        ]);
        let comment = CommentRecord {
            position: Some(Point::new(10.0, 10.0)),
            ..CommentRecord::on_node("Make bold", "lee", "there")
        };

        let out = match_comments(&index, &[comment]);
        assert_eq!(out[0].node_id.as_deref(), Some("there"));
        assert_eq!(out[0].match_kind, MatchKind::Direct);
        assert_eq!(out[0].distance, None);
    }

    #[test]
    fn test_unknown_reference_falls_back_to_position() {
        let index = BoundsIndex::from_entries(vec![boxed("here", 0.0, 0.0, 50.0, 50.0)]);
        let comment = CommentRecord {
            position: Some(Point::new(10.0, 10.0)),
            ..CommentRecord::on_node("Tweak", "lee", "gone")
        };

        let out = match_comments(&index, &[comment]);
        assert_eq!(out[0].node_id.as_deref(), Some("here"));
        assert_eq!(out[0].match_kind, MatchKind::Contained);
    }

    #[test]
    fn test_every_comment_is_reported_in_order() {
        let index = BoundsIndex::from_entries(vec![boxed("a", 0.0, 0.0, 10.0, 10.0)]);
        let comments = vec![
            CommentRecord::at("lost", "kim", 5000.0, 5000.0),
            CommentRecord::at("found", "kim", 5.0, 5.0),
            CommentRecord {
                message: "floating".to_string(),
                author: "kim".to_string(),
                position: None,
                node_id: None,
            },
        ];

        let out = match_comments(&index, &comments);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].instruction, "lost");
        assert_eq!(out[0].target, UNASSIGNED_TARGET);
        assert_eq!(out[0].match_kind, MatchKind::Unassigned);
        assert_eq!(out[0].position, Some(Point::new(5000.0, 5000.0)));
        assert_eq!(out[1].target, "Node a");
        assert_eq!(out[2].match_kind, MatchKind::Unassigned);
        assert_eq!(out[2].position, None);
    }
}
