//! Layout-context summary from the traversal context.

use crate::annotated::{LayoutContext, SiblingPosition};
use crate::walker::TraversalContext;

/// Summarize where a node sits in its parent.
#[must_use]
pub fn layout_context(ctx: &TraversalContext) -> LayoutContext {
    let parent = ctx.parent.as_ref();
    LayoutContext {
        parent_type: parent.map(|p| p.node_type),
        sibling_count: ctx.sibling_count,
        position: SiblingPosition::from_index(ctx.index, ctx.sibling_count),
        flex_order: parent
            .is_some_and(|p| p.has_auto_layout)
            .then_some(ctx.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LayoutMode, Node, NodeType};

    #[test]
    fn test_root_context() {
        let ctx = layout_context(&TraversalContext::root());
        assert_eq!(ctx.parent_type, None);
        assert_eq!(ctx.sibling_count, 1);
        assert_eq!(ctx.position, SiblingPosition::Only);
        assert_eq!(ctx.flex_order, None);
    }

    #[test]
    fn test_child_of_auto_layout_gets_flex_order() {
        let mut parent = Node::new("1", "Row", NodeType::Frame);
        parent.layout_mode = Some(LayoutMode::Horizontal);
        let root = TraversalContext::root();

        let ctx = layout_context(&root.child(&parent, 2, 3));
        assert_eq!(ctx.parent_type, Some(NodeType::Frame));
        assert_eq!(ctx.position, SiblingPosition::Last);
        assert_eq!(ctx.flex_order, Some(2));

        let plain = Node::new("2", "Stack", NodeType::Frame);
        let ctx = layout_context(&root.child(&plain, 1, 3));
        assert_eq!(ctx.position, SiblingPosition::Middle);
        assert_eq!(ctx.flex_order, None);
    }
}
