//! Design MCP - JSON-RPC over stdio
//!
//! Reads one JSON-RPC request per line on stdin and writes one response per
//! line on stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use design_mcp::server::PARSE_ERROR;
use design_mcp::{load_configuration, CliArgs, DesignMcpServer, JsonRpcRequest, JsonRpcResponse};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber with optional JSON output.
///
/// Set `RUST_LOG_FORMAT=json` for structured JSON logs.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,design_mcp=debug,design_core=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = load_configuration(args.config.as_deref(), std::env::vars())
        .context("failed to load configuration")?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    tracing::info!(
        "design-mcp {} ready (maxDepth {}, {} custom rules)",
        env!("CARGO_PKG_VERSION"),
        config.max_depth,
        config.custom_rules.len()
    );

    let server = DesignMcpServer::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => {
                tracing::warn!("Unparseable request: {e}");
                JsonRpcResponse::error(serde_json::Value::Null, PARSE_ERROR, format!("Parse error: {e}"))
            }
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
