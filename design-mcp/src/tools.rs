//! MCP tools for annotation and comment matching.

use design_core::{
    match_comments, BoundsIndex, CommentRecord, Node, RuleConfiguration, TreeWalker,
};
use serde::{Deserialize, Serialize};

use crate::ToolResponse;

/// Parameters for the `annotate_design` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateParams {
    /// Raw node tree.
    pub document: Node,
    /// Per-call configuration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<serde_json::Value>,
}

/// Parameters for the `match_comments` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCommentsParams {
    /// Raw node tree the comments were made on.
    pub document: Node,
    /// Comments to resolve.
    pub comments: Vec<CommentRecord>,
    /// Per-call configuration overrides used while annotating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<serde_json::Value>,
}

/// Parameters for the `update_rules` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRulesParams {
    /// Overrides merged into the active configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<serde_json::Value>,
    /// Start from the built-in defaults instead of the active configuration.
    #[serde(default)]
    pub reset: bool,
}

fn effective_config(
    base: &RuleConfiguration,
    overrides: Option<&serde_json::Value>,
) -> Result<Option<RuleConfiguration>, ToolResponse> {
    overrides
        .map(|o| base.merged(o))
        .transpose()
        .map_err(|e| ToolResponse::error(format!("Invalid overrides: {e}")))
}

/// Execute the `annotate_design` tool against a configuration snapshot.
pub fn annotate_design(config: &RuleConfiguration, params: &AnnotateParams) -> ToolResponse {
    let merged = match effective_config(config, params.overrides.as_ref()) {
        Ok(merged) => merged,
        Err(response) => return response,
    };
    let config = merged.as_ref().unwrap_or(config);

    tracing::info!("Annotating document {}", params.document.id);
    let result = TreeWalker::new(config).annotate(&params.document);

    match serde_json::to_value(&result) {
        Ok(data) => ToolResponse::success(data),
        Err(e) => ToolResponse::error(format!("Failed to serialize annotation: {e}")),
    }
}

/// Execute the `match_comments` tool against a configuration snapshot.
pub fn match_comments_tool(config: &RuleConfiguration, params: &MatchCommentsParams) -> ToolResponse {
    let merged = match effective_config(config, params.overrides.as_ref()) {
        Ok(merged) => merged,
        Err(response) => return response,
    };
    let config = merged.as_ref().unwrap_or(config);

    let annotated = TreeWalker::new(config).annotate(&params.document);
    let index = BoundsIndex::from_tree(&annotated.root);
    tracing::info!(
        "Matching {} comments against {} nodes of {}",
        params.comments.len(),
        index.len(),
        params.document.id
    );
    let instructions = match_comments(&index, &params.comments);

    ToolResponse::success(serde_json::json!({
        "instructions": instructions,
        "total": instructions.len(),
        "unassigned": instructions
            .iter()
            .filter(|i| i.node_id.is_none())
            .count()
    }))
}

/// Serialize a configuration snapshot for `get_rules`.
pub fn describe_rules(config: &RuleConfiguration) -> ToolResponse {
    match serde_json::to_value(config) {
        Ok(data) => ToolResponse::success(data),
        Err(e) => ToolResponse::error(format!("Failed to serialize configuration: {e}")),
    }
}

/// Compute the next snapshot for `update_rules`.
///
/// # Errors
///
/// Returns an error response when the overrides are invalid.
pub fn next_rules(
    current: &RuleConfiguration,
    params: &UpdateRulesParams,
) -> Result<RuleConfiguration, ToolResponse> {
    let base = if params.reset {
        RuleConfiguration::default()
    } else {
        current.clone()
    };
    Ok(effective_config(&base, params.overrides.as_ref())?.unwrap_or(base))
}
