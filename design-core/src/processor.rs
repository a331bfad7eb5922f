//! Processing session over an immutable configuration snapshot.

use std::sync::Arc;

use serde_json::Value;

use crate::annotated::AnnotatedNode;
use crate::comments::{self, BoundsIndex, CommentInstruction, CommentRecord};
use crate::config::RuleConfiguration;
use crate::error::{ConfigError, DesignResult};
use crate::node::Node;
use crate::walker::{AnnotationResult, TreeWalker};

/// Annotates trees and matches comments against one configuration snapshot.
///
/// Reconfiguring swaps in a new snapshot; a traversal that already holds
/// the previous one keeps reading it unchanged.
#[derive(Debug, Clone, Default)]
pub struct DesignProcessor {
    config: Arc<RuleConfiguration>,
}

impl DesignProcessor {
    /// Processor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor with defaults layered with the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(RuleConfiguration::from_env())
    }

    /// Processor with an explicit configuration.
    #[must_use]
    pub fn with_config(config: RuleConfiguration) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<RuleConfiguration> {
        Arc::clone(&self.config)
    }

    /// Replace the snapshot with the current one merged with `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the merged configuration is invalid; the
    /// current snapshot is kept in that case.
    pub fn reconfigure(&mut self, overrides: &Value) -> Result<(), ConfigError> {
        let next = self.config.merged(overrides)?;
        self.config = Arc::new(next);
        tracing::info!("Configuration replaced");
        Ok(())
    }

    /// Replace the snapshot outright.
    pub fn set_config(&mut self, config: RuleConfiguration) {
        self.config = Arc::new(config);
    }

    /// Annotate a tree with the current snapshot.
    #[must_use]
    pub fn process(&self, root: &Node) -> AnnotationResult {
        let config = self.config();
        TreeWalker::new(&config).annotate(root)
    }

    /// Annotate a tree with per-call overrides on top of the current snapshot.
    ///
    /// The processor's own snapshot is not changed.
    ///
    /// # Errors
    ///
    /// Returns an error when the overrides do not produce a valid
    /// configuration.
    pub fn process_with(&self, root: &Node, overrides: &Value) -> DesignResult<AnnotationResult> {
        let config = self.config.merged(overrides)?;
        Ok(TreeWalker::new(&config).annotate(root))
    }

    /// Match comments against an annotated tree.
    #[must_use]
    pub fn match_comments(
        &self,
        root: &AnnotatedNode,
        comments: &[CommentRecord],
    ) -> Vec<CommentInstruction> {
        let index = BoundsIndex::from_tree(root);
        tracing::debug!(
            "Matching {} comments against {} nodes",
            comments.len(),
            index.len()
        );
        comments::match_comments(&index, comments)
    }
}
