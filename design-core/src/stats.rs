//! Per-traversal counters.

use serde::{Deserialize, Serialize};

/// Counters and messages collected during one traversal.
///
/// Owned by a single traversal and returned with its result; never shared
/// between concurrent runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    /// Nodes visited, including stubs.
    pub nodes_seen: usize,
    /// Nodes that received a full annotation.
    pub nodes_processed: usize,
    /// Nodes changed by at least one custom rule.
    pub nodes_enhanced: usize,
    /// Nodes stubbed because the filter excluded them.
    pub nodes_filtered: usize,
    /// Stubs emitted for any reason (filter, depth or error).
    pub nodes_stubbed: usize,
    /// Successful custom-rule applications.
    pub rules_applied: usize,
    /// Wall-clock traversal time.
    pub processing_time_ms: u64,
    /// Per-node failures, each naming the node.
    pub errors: Vec<String>,
    /// Non-fatal notices such as depth truncation.
    pub warnings: Vec<String>,
}

impl ProcessingStats {
    /// Create empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter and clear messages.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a per-node error.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.errors.push(message);
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Whether the traversal finished without per-node errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = ProcessingStats::new();
        stats.nodes_seen = 5;
        stats.nodes_processed = 4;
        stats.rules_applied = 2;
        stats.error("node 1: bad");
        stats.warn("depth");

        assert!(!stats.is_clean());
        stats.reset();
        assert_eq!(stats, ProcessingStats::default());
        assert!(stats.is_clean());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ProcessingStats::new()).expect("serialize");
        assert!(json.get("nodesSeen").is_some());
        assert!(json.get("nodesProcessed").is_some());
        assert!(json.get("processingTimeMs").is_some());
    }
}
