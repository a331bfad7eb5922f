//! Node inclusion filter.

use crate::config::NodeFilterConfig;
use crate::node::Node;

/// Decide whether a node receives a full annotation.
///
/// A node is excluded when it is hidden (unless hidden nodes are permitted),
/// locked (unless locked nodes are permitted), its type is in the exclude
/// set, or a non-empty include set does not contain its type.
#[must_use]
pub fn include(node: &Node, filter: &NodeFilterConfig) -> bool {
    if !node.visible && !filter.include_hidden {
        return false;
    }
    if node.locked && !filter.include_locked {
        return false;
    }
    if filter.exclude_types.contains(&node.node_type) {
        return false;
    }
    filter.include_types.is_empty() || filter.include_types.contains(&node.node_type)
}

/// Copy of `root` in which every excluded node is cut down to a leaf.
///
/// Excluded nodes stay in place (the annotated tree keeps a stub for them)
/// but lose their subtrees; an excluded root becomes a lone leaf. Applying
/// this twice with the same filter yields the same tree.
#[must_use]
pub fn prune(root: &Node, filter: &NodeFilterConfig) -> Node {
    let mut pruned = root.clone();
    pruned.children = root
        .children
        .as_ref()
        .filter(|_| include(root, filter))
        .map(|children| children.iter().map(|child| prune(child, filter)).collect());
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    fn node(node_type: NodeType) -> Node {
        Node::new("1", "node", node_type)
    }

    #[test]
    fn test_default_filter_includes_visible_nodes() {
        let filter = NodeFilterConfig::default();
        assert!(include(&node(NodeType::Frame), &filter));
        assert!(include(&node(NodeType::Text), &filter));
    }

    #[test]
    fn test_hidden_nodes_need_permission() {
        let mut hidden = node(NodeType::Frame);
        hidden.visible = false;

        assert!(!include(&hidden, &NodeFilterConfig::default()));
        let permissive = NodeFilterConfig {
            include_hidden: true,
            ..NodeFilterConfig::default()
        };
        assert!(include(&hidden, &permissive));
    }

    #[test]
    fn test_locked_nodes_follow_flag() {
        let mut locked = node(NodeType::Frame);
        locked.locked = true;

        assert!(include(&locked, &NodeFilterConfig::default()));
        let strict = NodeFilterConfig {
            include_locked: false,
            ..NodeFilterConfig::default()
        };
        assert!(!include(&locked, &strict));
    }

    #[test]
    fn test_type_sets() {
        let filter = NodeFilterConfig {
            include_types: vec![NodeType::Frame, NodeType::Text],
            exclude_types: vec![NodeType::Text],
            ..NodeFilterConfig::default()
        };

        assert!(include(&node(NodeType::Frame), &filter));
        assert!(!include(&node(NodeType::Text), &filter), "exclude wins");
        assert!(!include(&node(NodeType::Vector), &filter), "not in include set");
    }

    #[test]
    fn test_include_is_pure() {
        let filter = NodeFilterConfig::default();
        let n = node(NodeType::Instance);
        assert_eq!(include(&n, &filter), include(&n, &filter));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let mut hidden = Node::new("3", "Hidden", NodeType::Frame)
            .with_children(vec![Node::new("5", "Inside", NodeType::Text)]);
        hidden.visible = false;
        let tree = Node::new("1", "Root", NodeType::Frame).with_children(vec![
            Node::new("2", "Shown", NodeType::Frame).with_children(vec![hidden.clone()]),
            hidden,
            Node::new("4", "Shape", NodeType::Vector),
        ]);
        let filter = NodeFilterConfig {
            exclude_types: vec![NodeType::Vector],
            ..NodeFilterConfig::default()
        };

        let once = prune(&tree, &filter);
        let twice = prune(&once, &filter);

        assert_eq!(once, twice);
        assert_eq!(once.children().len(), 3, "excluded nodes stay as leaves");
        assert_eq!(once.children()[0].children().len(), 1);
        assert!(once.children()[1].children.is_none());
        assert!(once.children()[0].children()[0].children.is_none());
    }

    #[test]
    fn test_prune_excluded_root_is_a_leaf() {
        let mut root = Node::new("1", "Root", NodeType::Frame)
            .with_children(vec![Node::new("2", "Child", NodeType::Text)]);
        root.visible = false;

        let pruned = prune(&root, &NodeFilterConfig::default());
        assert!(pruned.children.is_none());
        assert_eq!(pruned.id, "1");
    }
}
