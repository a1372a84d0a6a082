//! `edit` tool: fuzzy search-and-replace inside one file.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::file_edit::edit_file_by_search;
use crate::server::{ToolCallResult, ToolDefinition};

/// Parameters for the edit tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParams {
    /// Path to the file (workspace-relative or absolute).
    pub file_path: String,
    /// The text to find.
    pub old_string: String,
    /// The replacement text.
    pub new_string: String,
    /// Replace every occurrence instead of requiring a unique one.
    #[serde(default)]
    pub replace_all: bool,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "edit".to_owned(),
        description: "Replace old_string with new_string in a file. old_string may differ from the \
            file in indentation, whitespace or escaping; it must identify exactly one location \
            unless replaceAll is set. On failure, re-read the file and retry with more context."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the file to edit"
                },
                "oldString": {
                    "type": "string",
                    "description": "The text to replace"
                },
                "newString": {
                    "type": "string",
                    "description": "The replacement text (must differ from oldString)"
                },
                "replaceAll": {
                    "type": "boolean",
                    "description": "Replace all occurrences (default: false)",
                    "default": false
                }
            },
            "required": ["filePath", "oldString", "newString"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: EditParams =
        serde_json::from_value(arguments).context("invalid edit parameters")?;

    let report = edit_file_by_search(
        &params.file_path,
        &params.old_string,
        &params.new_string,
        params.replace_all,
        &ctx.fs,
        &ctx.committer,
    );

    Ok(ToolCallResult::text(report.to_string(), !report.success))
}
