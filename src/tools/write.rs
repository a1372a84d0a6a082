//! `write` tool: create a file or directory, or replace a file in full.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::file_edit::{create_directory, write_file};
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteParams {
    pub file_path: String,
    /// Full new content. Required unless `is_directory` is set.
    #[serde(default)]
    pub content: Option<String>,
    /// Create a directory (and missing parents) instead of a file.
    #[serde(default)]
    pub is_directory: bool,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "write".to_owned(),
        description: "Write content to a file, creating it and any parent directories if needed. \
            Overwrites existing content. With isDirectory, creates a directory instead."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the file or directory to create"
                },
                "content": {
                    "type": "string",
                    "description": "Full content of the file"
                },
                "isDirectory": {
                    "type": "boolean",
                    "description": "Create a directory (default: false)",
                    "default": false
                }
            },
            "required": ["filePath"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: WriteParams =
        serde_json::from_value(arguments).context("invalid write parameters")?;

    if params.is_directory {
        if params.content.is_some() {
            return Ok(ToolCallResult::text(
                "Error: content cannot be combined with isDirectory",
                true,
            ));
        }
        return Ok(
            match create_directory(&params.file_path, &ctx.fs, &ctx.fs) {
                Ok(_) => ToolCallResult::text(format!("Directory ready: {}", params.file_path), false),
                Err(e) => ToolCallResult::text(format!("Error: {e}"), true),
            },
        );
    }

    let Some(content) = params.content else {
        return Ok(ToolCallResult::text(
            "Error: content is required unless isDirectory is set",
            true,
        ));
    };

    let report = write_file(&params.file_path, &content, &ctx.fs, &ctx.fs, &ctx.committer);
    Ok(ToolCallResult::text(report.to_string(), !report.success))
}
