//! # Design MCP
//!
//! MCP (Model Context Protocol) tools and resources for the design-tree
//! annotation engine.
//!
//! ## MCP Resources
//!
//! - `design://rules/current` - The active rule configuration
//! - `design://rules/default` - The built-in default configuration
//!
//! ## MCP Tools
//!
//! - `annotate_design` - Annotate a node tree
//! - `match_comments` - Resolve designer comments to nodes
//! - `get_rules` - Read the active rule configuration
//! - `update_rules` - Merge overrides into, or reset, the active configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod resources;
pub mod server;
pub mod tools;

// Re-export key types for convenience
pub use config::{load_configuration, ConfigLoadError};
pub use server::{DesignMcpServer, JsonRpcRequest, JsonRpcResponse};

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments for the stdio server.
#[derive(Debug, Clone, Parser)]
#[command(name = "design-mcp")]
#[command(about = "Design-tree annotation engine over MCP (JSON-RPC on stdio)")]
#[command(version)]
pub struct CliArgs {
    /// JSON file with configuration overrides, layered over the environment
    #[arg(long, env = "DESIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

/// MCP tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Result data (if successful).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// MCP resource content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ResourceContent {
    /// Text content (UTF-8).
    Text(String),
    /// JSON content.
    Json(serde_json::Value),
}

impl ResourceContent {
    /// Render as the text body of a `resources/read` response.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Json(v) => serde_json::to_string_pretty(&v).unwrap_or_default(),
            Self::Text(s) => s,
        }
    }
}
