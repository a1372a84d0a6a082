//! Tool router: registers and dispatches MCP tool calls.
//!
//! Each tool parses its JSON arguments, runs one orchestrator operation
//! against the workspace, and returns the report as a [`ToolCallResult`].

pub mod edit;
pub mod edit_lines;
pub mod list;
pub mod read;
pub mod write;

use anyhow::Result;
use tracing::debug;

use crate::host::dispatch::SerialCommitter;
use crate::host::fs::LocalFs;
use crate::server::{ServerConfig, ToolCallResult, ToolDefinition};

/// What a tool needs from the host: lookup/reading, serialized commits,
/// and the read limit.
pub struct ToolContext {
    pub fs: LocalFs,
    pub committer: SerialCommitter<LocalFs>,
    pub max_read_bytes: u64,
}

/// Dispatches MCP tool calls to implementations.
pub struct ToolRouter {
    ctx: ToolContext,
}

impl ToolRouter {
    /// Build a router rooted at `config.workspace`. Spawns the commit thread.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let fs = LocalFs::new(&config.workspace);
        let committer = SerialCommitter::spawn(fs.clone())?;
        Ok(Self {
            ctx: ToolContext {
                fs,
                committer,
                max_read_bytes: config.max_read_bytes,
            },
        })
    }

    /// All tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            edit::tool_definition(),
            edit_lines::tool_definition(),
            read::tool_definition(),
            write::tool_definition(),
            list::tool_definition(),
        ]
    }

    /// Call a tool by name.
    ///
    /// Unknown tools produce an error result rather than an `Err`; `Err` is
    /// reserved for malformed arguments.
    pub fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        debug!(tool = name, "dispatching tool call");

        match name {
            "edit" => edit::execute(&self.ctx, arguments),
            "edit_lines" => edit_lines::execute(&self.ctx, arguments),
            "read" => read::execute(&self.ctx, arguments),
            "write" => write::execute(&self.ctx, arguments),
            "list" => list::execute(&self.ctx, arguments),
            _ => Ok(ToolCallResult::text(format!("Unknown tool: {name}"), true)),
        }
    }
}
