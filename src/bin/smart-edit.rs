//! smart-edit -- MCP server exposing the fuzzy edit tools over stdio.
//!
//! Usage: smart-edit [--workspace <path>] [--max-read-bytes <n>]

use anyhow::{Context, Result};
use smart_edit::server::ServerConfig;

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .skip_while(|a| *a != flag)
        .nth(1)
        .cloned()
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = ServerConfig::default();

    if let Some(workspace) = flag_value(&args, "--workspace") {
        config.workspace = workspace.into();
    }
    config.workspace = config
        .workspace
        .canonicalize()
        .with_context(|| format!("invalid workspace {}", config.workspace.display()))?;

    if let Some(limit) = flag_value(&args, "--max-read-bytes") {
        config.max_read_bytes = limit
            .parse()
            .with_context(|| format!("invalid --max-read-bytes value: {limit}"))?;
    }

    smart_edit::run_mcp_server(&config)
}
