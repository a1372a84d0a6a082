//! `edit_lines` tool: replace an explicit line range.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::file_edit::edit_file_by_lines;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLinesParams {
    pub file_path: String,
    /// First line to replace (1-based).
    pub start_line: usize,
    /// Last line to replace (1-based, inclusive).
    pub end_line: usize,
    pub new_string: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "edit_lines".to_owned(),
        description: "Replace lines startLine..=endLine (1-based) of a file with newString. \
            Line numbers match the ones printed by the read tool."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": { "type": "string", "description": "Path to the file to edit" },
                "startLine": { "type": "integer", "minimum": 1 },
                "endLine": { "type": "integer", "minimum": 1 },
                "newString": { "type": "string", "description": "Replacement text" }
            },
            "required": ["filePath", "startLine", "endLine", "newString"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: EditLinesParams =
        serde_json::from_value(arguments).context("invalid edit_lines parameters")?;

    let report = edit_file_by_lines(
        &params.file_path,
        params.start_line,
        params.end_line,
        &params.new_string,
        &ctx.fs,
        &ctx.committer,
    );

    Ok(ToolCallResult::text(report.to_string(), !report.success))
}
