//! `read` tool: file content with `"<n> | "` line numbers.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::file_edit::read_file;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    pub file_path: String,
    /// First line to return (1-based). Defaults to the start of the file.
    #[serde(default)]
    pub start_line: Option<usize>,
    /// Last line to return (1-based, inclusive). Defaults to the end of the file.
    #[serde(default)]
    pub end_line: Option<usize>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "read".to_owned(),
        description: "Read a text file with 1-based line numbers, optionally limited to a line \
            range. Large and binary files are refused."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": { "type": "string", "description": "Path to the file to read" },
                "startLine": { "type": "integer", "minimum": 1 },
                "endLine": { "type": "integer", "minimum": 1 }
            },
            "required": ["filePath"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: ReadParams =
        serde_json::from_value(arguments).context("invalid read parameters")?;

    let range = match (params.start_line, params.end_line) {
        (None, None) => None,
        (start, end) => Some((start.unwrap_or(1), end.unwrap_or(usize::MAX))),
    };

    Ok(
        match read_file(&params.file_path, range, ctx.max_read_bytes, &ctx.fs) {
            Ok(text) => ToolCallResult::text(text, false),
            Err(e) => ToolCallResult::text(format!("Error: {e}"), true),
        },
    )
}
