//! MCP server for the annotation engine.
//!
//! Implements JSON-RPC 2.0 protocol for MCP tool calls and resource access.

use std::sync::Arc;

use design_core::RuleConfiguration;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::resources;
use crate::tools::{
    annotate_design, describe_rules, match_comments_tool, next_rules, AnnotateParams,
    MatchCommentsParams, UpdateRulesParams,
};
use crate::ToolResponse;

/// JSON-RPC error code for unparseable requests.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC error code for unknown methods.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Error code for failed tool calls.
pub const TOOL_ERROR: i32 = -32000;
/// Error code for unknown resources.
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request ID (matches request).
    pub id: serde_json::Value,
    /// Result (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error (on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Additional data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Input schema (JSON Schema).
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// MCP resource definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Resource URI.
    pub uri: String,
    /// Resource name.
    pub name: String,
    /// Resource description.
    pub description: String,
    /// MIME type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// MCP server for the annotation engine.
///
/// Holds the active configuration snapshot. Tool calls clone the `Arc`
/// and release the lock before traversing, so `update_rules` never
/// changes a traversal already in flight.
#[derive(Debug)]
pub struct DesignMcpServer {
    config: RwLock<Arc<RuleConfiguration>>,
}

impl DesignMcpServer {
    /// Create a server with the given startup configuration.
    #[must_use]
    pub fn new(config: RuleConfiguration) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// Current configuration snapshot.
    pub async fn config(&self) -> Arc<RuleConfiguration> {
        Arc::clone(&*self.config.read().await)
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("MCP request: {} (id {})", request.method, request.id);

        match request.method.as_str() {
            // MCP standard methods
            "initialize" => Self::handle_initialize(request.id),
            "tools/list" => Self::handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, &request.params).await,
            "resources/list" => Self::handle_resources_list(request.id),
            "resources/read" => self.handle_resources_read(request.id, &request.params).await,

            // Unknown method
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(id: serde_json::Value) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {
                    "name": "design-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {},
                    "resources": {}
                }
            }),
        )
    }

    fn handle_tools_list(id: serde_json::Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, serde_json::json!({ "tools": get_available_tools() }))
    }

    async fn handle_tools_call(
        &self,
        id: serde_json::Value,
        params: &serde_json::Value,
    ) -> JsonRpcResponse {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let arguments = params.get("arguments").cloned().unwrap_or_default();

        let result = match name {
            "annotate_design" => self.call_annotate(arguments).await,
            "match_comments" => self.call_match_comments(arguments).await,
            "get_rules" => {
                let config = self.config().await;
                describe_rules(&config)
            }
            "update_rules" => self.call_update_rules(arguments).await,
            _ => ToolResponse::error(format!("Unknown tool: {name}")),
        };

        if result.success {
            JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": serde_json::to_string_pretty(&result.data).unwrap_or_default()
                    }]
                }),
            )
        } else {
            JsonRpcResponse::error(id, TOOL_ERROR, result.error.unwrap_or_default())
        }
    }

    async fn call_annotate(&self, arguments: serde_json::Value) -> ToolResponse {
        let params: AnnotateParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => return ToolResponse::error(format!("Invalid parameters: {e}")),
        };
        let config = self.config().await;
        annotate_design(&config, &params)
    }

    async fn call_match_comments(&self, arguments: serde_json::Value) -> ToolResponse {
        let params: MatchCommentsParams = match serde_json::from_value(arguments) {
            Ok(p) => p,
            Err(e) => return ToolResponse::error(format!("Invalid parameters: {e}")),
        };
        let config = self.config().await;
        match_comments_tool(&config, &params)
    }

    async fn call_update_rules(&self, arguments: serde_json::Value) -> ToolResponse {
        let params: UpdateRulesParams = if arguments.is_null() {
            UpdateRulesParams::default()
        } else {
            match serde_json::from_value(arguments) {
                Ok(p) => p,
                Err(e) => return ToolResponse::error(format!("Invalid parameters: {e}")),
            }
        };

        let mut config = self.config.write().await;
        let next = match next_rules(&config, &params) {
            Ok(next) => next,
            Err(response) => return response,
        };
        *config = Arc::new(next);
        tracing::info!(
            "Rule configuration {} (maxDepth {}, {} custom rules)",
            if params.reset { "reset" } else { "updated" },
            config.max_depth,
            config.custom_rules.len()
        );

        describe_rules(&config)
    }

    fn handle_resources_list(id: serde_json::Value) -> JsonRpcResponse {
        let resource_list: Vec<Resource> = resources::list_resources()
            .into_iter()
            .map(|uri| {
                let (name, description) = if uri.ends_with("/current") {
                    ("Current Rules", "The active rule configuration")
                } else {
                    ("Default Rules", "The built-in default rule configuration")
                };
                Resource {
                    uri,
                    name: name.to_string(),
                    description: description.to_string(),
                    mime_type: "application/json".to_string(),
                }
            })
            .collect();

        JsonRpcResponse::success(id, serde_json::json!({ "resources": resource_list }))
    }

    async fn handle_resources_read(
        &self,
        id: serde_json::Value,
        params: &serde_json::Value,
    ) -> JsonRpcResponse {
        let uri = params
            .get("uri")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let config = self.config().await;
        match resources::get_resource(uri, &config) {
            Ok(content) => JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": "application/json",
                        "text": content.into_text()
                    }]
                }),
            ),
            Err(e) => JsonRpcResponse::error(id, RESOURCE_NOT_FOUND, e),
        }
    }
}

impl Default for DesignMcpServer {
    fn default() -> Self {
        Self::new(RuleConfiguration::default())
    }
}

/// Get the list of available MCP tools.
fn get_available_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "annotate_design".to_string(),
            description: "Annotate a design node tree with styles, semantics, accessibility, tokens and layout context".to_string(),
            input_schema: annotate_tool_schema(),
        },
        Tool {
            name: "match_comments".to_string(),
            description: "Resolve designer comments to the nodes they refer to".to_string(),
            input_schema: match_comments_tool_schema(),
        },
        Tool {
            name: "get_rules".to_string(),
            description: "Return the active rule configuration".to_string(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        },
        Tool {
            name: "update_rules".to_string(),
            description: "Merge overrides into the active rule configuration, or reset it to defaults"
                .to_string(),
            input_schema: update_rules_tool_schema(),
        },
    ]
}

/// Schema for the design node tree argument.
fn document_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "description": "Root node of the design tree",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "type": { "type": "string" },
            "children": { "type": "array", "items": { "type": "object" } }
        },
        "required": ["id", "type"]
    })
}

/// Schema for configuration overrides.
fn overrides_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "description": "Configuration overrides (maxDepth, nodeFilter, optimizations, frameworks, customRules, reduction)"
    })
}

/// Schema for `annotate_design` tool.
fn annotate_tool_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "document": document_schema(),
            "overrides": overrides_schema()
        },
        "required": ["document"]
    })
}

/// Schema for `match_comments` tool.
fn match_comments_tool_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "document": document_schema(),
            "comments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "author": { "type": "string" },
                        "position": {
                            "type": "object",
                            "properties": {
                                "x": { "type": "number" },
                                "y": { "type": "number" }
                            },
                            "required": ["x", "y"]
                        },
                        "nodeId": { "type": "string" }
                    },
                    "required": ["message"]
                }
            },
            "overrides": overrides_schema()
        },
        "required": ["document", "comments"]
    })
}

/// Schema for `update_rules` tool.
fn update_rules_tool_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "overrides": overrides_schema(),
            "reset": { "type": "boolean", "default": false }
        }
    })
}
