//! `list` tool: entries of one workspace directory.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::file_edit::list_directory;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Directory to list. Defaults to the workspace root.
    #[serde(default = "workspace_root")]
    pub path: String,
}

fn workspace_root() -> String {
    ".".to_owned()
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list".to_owned(),
        description: "List a directory: subdirectories first, then files with their sizes."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (default: workspace root)"
                }
            }
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: ListParams =
        serde_json::from_value(arguments).context("invalid list parameters")?;

    Ok(match list_directory(&params.path, &ctx.fs) {
        Ok(text) => ToolCallResult::text(text, false),
        Err(e) => ToolCallResult::text(format!("Error: {e}"), true),
    })
}
