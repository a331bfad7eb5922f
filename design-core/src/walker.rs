//! Tree walker.
//!
//! Drives one traversal: depth limit, node filter, generators, custom rules,
//! children, then context reduction. Context flows down as an explicit
//! [`TraversalContext`] value; stats accumulate in a single record owned by
//! the traversal.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::annotated::AnnotatedNode;
use crate::config::RuleConfiguration;
use crate::filter;
use crate::generators::run_generators;
use crate::node::{Node, NodeType};
use crate::reducer;
use crate::rules::RuleEngine;
use crate::stats::ProcessingStats;

/// What a child knows about its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentSummary {
    /// Parent id.
    pub id: String,
    /// Parent type.
    pub node_type: NodeType,
    /// Whether the parent lays its children out automatically.
    pub has_auto_layout: bool,
}

/// Position of a node in the tree during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalContext {
    /// Depth, root = 0.
    pub depth: usize,
    /// Index among siblings.
    pub index: usize,
    /// Number of siblings including this node.
    pub sibling_count: usize,
    /// Parent summary, absent for the root.
    pub parent: Option<ParentSummary>,
}

impl TraversalContext {
    /// Context of the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            depth: 0,
            index: 0,
            sibling_count: 1,
            parent: None,
        }
    }

    /// Context for child `index` of `count` under `parent`.
    #[must_use]
    pub fn child(&self, parent: &Node, index: usize, count: usize) -> Self {
        Self {
            depth: self.depth + 1,
            index,
            sibling_count: count,
            parent: Some(ParentSummary {
                id: parent.id.clone(),
                node_type: parent.node_type,
                has_auto_layout: parent.has_auto_layout(),
            }),
        }
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::root()
    }
}

/// Output of one traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationResult {
    /// Annotated tree, same shape as the filtered input.
    pub root: AnnotatedNode,
    /// Counters and messages for this run.
    pub stats: ProcessingStats,
}

/// Walks a node tree against one configuration snapshot.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    config: &'a RuleConfiguration,
    rules: RuleEngine<'a>,
}

impl<'a> TreeWalker<'a> {
    /// Prepare a walker; custom rules are compiled once here.
    #[must_use]
    pub fn new(config: &'a RuleConfiguration) -> Self {
        Self {
            config,
            rules: RuleEngine::new(&config.custom_rules),
        }
    }

    /// Annotate `root`.
    ///
    /// Never fails: per-node problems become stubs and are reported in the
    /// returned stats.
    #[must_use]
    pub fn annotate(&self, root: &Node) -> AnnotationResult {
        let started = Instant::now();
        let mut stats = ProcessingStats::new();
        for warning in self.rules.warnings() {
            stats.warn(warning.clone());
        }

        let annotated = self.walk(root, &TraversalContext::root(), &mut stats);

        stats.processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            "Annotated {} ({} seen, {} processed, {} stubbed, {} rules applied, {} errors) in {}ms",
            root.id,
            stats.nodes_seen,
            stats.nodes_processed,
            stats.nodes_stubbed,
            stats.rules_applied,
            stats.errors.len(),
            stats.processing_time_ms
        );

        AnnotationResult {
            root: annotated,
            stats,
        }
    }

    fn walk(&self, node: &Node, ctx: &TraversalContext, stats: &mut ProcessingStats) -> AnnotatedNode {
        stats.nodes_seen += 1;

        if ctx.depth > self.config.max_depth {
            stats.warn(format!(
                "Max depth {} exceeded at node {} ({})",
                self.config.max_depth, node.id, node.name
            ));
            return self.stub_subtree(node, stats);
        }

        if !filter::include(node, &self.config.node_filter) {
            tracing::debug!("Node {} excluded by filter", node.id);
            stats.nodes_filtered += 1;
            stats.nodes_stubbed += 1;
            return AnnotatedNode::stub(node);
        }

        let mut annotated = match self.annotate_node(node, ctx, stats) {
            Ok(annotated) => annotated,
            Err(message) => {
                stats.error(format!("node {}: {message}", node.id));
                stats.nodes_stubbed += 1;
                return AnnotatedNode::stub(node);
            }
        };
        stats.nodes_processed += 1;

        if let Some(children) = &node.children {
            let count = children.len();
            annotated.children = Some(
                children
                    .iter()
                    .enumerate()
                    .map(|(index, child)| self.walk(child, &ctx.child(node, index, count), stats))
                    .collect(),
            );
        }

        reducer::reduce(&mut annotated, &self.config.reduction);
        annotated
    }

    /// Stub `node` and everything below it, keeping the input shape.
    ///
    /// Filter-excluded descendants stay leaves, as they do above the depth limit.
    fn stub_subtree(&self, node: &Node, stats: &mut ProcessingStats) -> AnnotatedNode {
        stats.nodes_stubbed += 1;
        let mut stub = AnnotatedNode::stub(node);

        if !filter::include(node, &self.config.node_filter) {
            stats.nodes_filtered += 1;
            return stub;
        }

        stub.children = node.children.as_ref().map(|children| {
            children
                .iter()
                .map(|child| {
                    stats.nodes_seen += 1;
                    self.stub_subtree(child, stats)
                })
                .collect()
        });
        stub
    }

    /// Annotate one node without its children.
    fn annotate_node(
        &self,
        node: &Node,
        ctx: &TraversalContext,
        stats: &mut ProcessingStats,
    ) -> Result<AnnotatedNode, String> {
        node.validate().map_err(|e| e.to_string())?;

        let mut annotated = catch_unwind(AssertUnwindSafe(|| {
            let mut annotated = AnnotatedNode::shell(node);
            run_generators(&mut annotated, node, ctx, self.config);
            annotated
        }))
        .map_err(|panic| {
            panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "annotation panicked".to_string())
        })?;

        if self.rules.apply(&mut annotated, node, ctx, stats) {
            stats.nodes_enhanced += 1;
        }
        Ok(annotated)
    }
}
