//! MCP server: JSON-RPC 2.0 over newline-delimited stdio.
//!
//! One request per line in, one response per line out. Notifications get no
//! response. The loop ends when the input closes.
//!
//! Supported methods: `initialize`, `notifications/initialized`,
//! `tools/list`, `tools/call`, `ping`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::tools::ToolRouter;

/// Largest accepted request line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Default cap on files handed to the `read` tool (1 MiB).
pub const DEFAULT_MAX_READ_BYTES: u64 = 1024 * 1024;

const PROTOCOL_VERSION: &str = "2025-06-18";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: &impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0".to_owned(),
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => {
                error!(error = %e, "failed to serialize result");
                Self::failure(id, INTERNAL_ERROR, format!("failed to serialize result: {e}"))
            }
        }
    }

    fn failure(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP payloads
// ---------------------------------------------------------------------------

/// A tool as advertised by `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One content block of a tool result.
#[derive(Debug, Serialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Result of `tools/call`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// A single text block.
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text: text.into(),
            }],
            is_error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root that every tool path is resolved against and confined to.
    pub workspace: PathBuf,
    /// Files larger than this are refused by the `read` tool.
    pub max_read_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct McpServer {
    router: ToolRouter,
}

impl McpServer {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            router: ToolRouter::new(config)?,
        })
    }

    /// Handle one raw request line. `None` means nothing should be written
    /// back (blank line or notification).
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!(raw = line, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                return Some(JsonRpcResponse::failure(
                    None,
                    PARSE_ERROR,
                    format!("parse error: {e}"),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            warn!(version = request.jsonrpc, "unsupported JSON-RPC version");
            return Some(JsonRpcResponse::failure(
                request.id,
                INVALID_REQUEST,
                format!(
                    "invalid request: jsonrpc must be \"2.0\", got \"{}\"",
                    request.jsonrpc
                ),
            ));
        }

        let response = self.dispatch(&request);
        if request.id.is_none() {
            debug!(method = request.method, "notification handled");
            return None;
        }
        response
    }

    fn dispatch(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => Some(JsonRpcResponse::success(
                id,
                &serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )),
            "notifications/initialized" => {
                info!("client initialized");
                None
            }
            "tools/list" => Some(JsonRpcResponse::success(
                id,
                &serde_json::json!({ "tools": self.router.list_tools() }),
            )),
            "tools/call" => Some(self.call_tool(id, &request.params)),
            "ping" => Some(JsonRpcResponse::success(id, &serde_json::json!({}))),
            other => {
                warn!(method = other, "unknown method");
                Some(JsonRpcResponse::failure(
                    id,
                    METHOD_NOT_FOUND,
                    format!("method not found: {other}"),
                ))
            }
        }
    }

    fn call_tool(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let params: ToolCallParams = match serde_json::from_value(params.clone()) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    format!("invalid tools/call params: {e}"),
                );
            }
        };

        let result = self
            .router
            .call_tool(&params.name, params.arguments)
            .unwrap_or_else(|e| {
                error!(tool = params.name, error = %e, "tool call failed");
                ToolCallResult::text(format!("Error: {e:#}"), true)
            });
        JsonRpcResponse::success(id, &result)
    }

    /// Serve requests from `input` until it closes, writing responses to
    /// `output`.
    pub fn serve(&self, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            match read_line_limited(input, &mut line, MAX_LINE_BYTES) {
                Ok(0) => {
                    info!("input closed, shutting down");
                    return Ok(());
                }
                Ok(_) => {}
                Err(LineError::TooLong) => {
                    warn!(limit = MAX_LINE_BYTES, "request line too long");
                    let response = JsonRpcResponse::failure(
                        None,
                        INVALID_REQUEST,
                        format!("request exceeds {MAX_LINE_BYTES} bytes"),
                    );
                    write_response(output, &response)?;
                    continue;
                }
                Err(LineError::Io(e)) => return Err(e).context("failed to read request"),
            }

            if let Some(response) = self.handle_line(&line) {
                write_response(output, &response)?;
            }
        }
    }
}

/// Run the MCP server on stdin/stdout.
pub fn run_mcp_server(config: &ServerConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        max_read_bytes = config.max_read_bytes,
        "smart-edit MCP server starting"
    );

    let server = McpServer::new(config)?;
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout().lock();
    server.serve(&mut input, &mut output)?;

    info!("smart-edit MCP server stopped");
    Ok(())
}

fn write_response(out: &mut impl Write, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response).context("failed to serialize response")?;
    debug!(response = json, "sending response");
    out.write_all(json.as_bytes())
        .and_then(|()| out.write_all(b"\n"))
        .and_then(|()| out.flush())
        .context("failed to write response")
}

#[derive(Debug)]
enum LineError {
    TooLong,
    Io(std::io::Error),
}

/// Read one `\n`-terminated line of UTF-8 into `buf`. Returns bytes consumed
/// (0 at end of input). An overlong line is consumed through its newline and
/// reported as [`LineError::TooLong`].
fn read_line_limited(
    reader: &mut impl BufRead,
    buf: &mut String,
    max_bytes: usize,
) -> Result<usize, LineError> {
    let mut bytes = Vec::new();
    let mut overflow = false;
    loop {
        let available = reader.fill_buf().map_err(LineError::Io)?;
        if available.is_empty() {
            break;
        }
        let (take, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        if !overflow {
            if bytes.len() + take > max_bytes {
                overflow = true;
                bytes.clear();
            } else {
                bytes.extend_from_slice(&available[..take]);
            }
        }
        reader.consume(take);
        if done {
            break;
        }
    }

    if overflow {
        return Err(LineError::TooLong);
    }
    let read = bytes.len();
    let text = String::from_utf8(bytes).map_err(|e| {
        LineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    buf.push_str(&text);
    Ok(read)
}
