//! MCP protocol integration tests.
//!
//! Drives the JSON-RPC 2.0 server in-process: single lines through
//! `handle_line`, and whole sessions through `serve` over in-memory buffers.

use serde_json::{json, Value};
use smart_edit::server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, ServerConfig};
use smart_edit::tools::ToolRouter;

fn config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        workspace: dir.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

fn server(dir: &tempfile::TempDir) -> McpServer {
    McpServer::new(&config(dir)).expect("server")
}

fn respond(server: &McpServer, request: &Value) -> Value {
    let response = server
        .handle_line(&request.to_string())
        .expect("request with id gets a response");
    serde_json::to_value(&response).expect("serialize response")
}

fn call(server: &McpServer, id: u64, tool: &str, arguments: Value) -> (String, bool) {
    let response = respond(
        server,
        &json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": tool, "arguments": arguments }
        }),
    );
    let result = &response["result"];
    let text = result["content"][0]["text"]
        .as_str()
        .expect("text content")
        .to_owned();
    (text, result["isError"].as_bool().unwrap_or(false))
}

#[test]
fn test_json_rpc_request_parsing() {
    let req: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": { "protocolVersion": "2025-06-18", "capabilities": {} }
    }))
    .expect("should parse initialize request");

    assert_eq!(req.method, "initialize");
    assert_eq!(req.id, Some(json!(1)));
}

#[test]
fn test_json_rpc_error_response_skips_result() {
    let resp = JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id: Some(json!(2)),
        result: None,
        error: Some(JsonRpcError {
            code: -32601,
            message: "method not found".to_owned(),
        }),
    };

    let json_str = serde_json::to_string(&resp).expect("should serialize");
    assert!(json_str.contains("-32601"));
    assert!(!json_str.contains("result"));
}

#[test]
fn test_initialize_reports_server_info() {
    let dir = tempfile::tempdir().expect("tempdir");
    let response = respond(
        &server(&dir),
        &json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
    );

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(response["result"]["serverInfo"]["name"], "smart-edit");
}

#[test]
fn test_protocol_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = server(&dir);

    let unknown = respond(&server, &json!({ "jsonrpc": "2.0", "id": 1, "method": "nope" }));
    assert_eq!(unknown["error"]["code"], -32601);

    let version = respond(&server, &json!({ "jsonrpc": "1.0", "id": 2, "method": "ping" }));
    assert_eq!(version["error"]["code"], -32600);

    let garbage = server.handle_line("{not json").expect("parse error response");
    assert_eq!(garbage.error.expect("error").code, -32700);

    let bad_params = respond(
        &server,
        &json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": { "arguments": {} } }),
    );
    assert_eq!(bad_params["error"]["code"], -32602);
}

#[test]
fn test_notifications_and_blank_lines_are_silent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = server(&dir);

    assert!(server.handle_line("   ").is_none());
    let note = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    assert!(server.handle_line(&note.to_string()).is_none());
}

#[test]
fn test_tool_definitions_complete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = ToolRouter::new(&config(&dir)).expect("router");

    let tools = router.list_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["edit", "edit_lines", "read", "write", "list"]);

    for tool in &tools {
        assert!(!tool.description.is_empty(), "tool {} missing description", tool.name);
        assert!(tool.input_schema.is_object(), "tool {} missing input_schema", tool.name);
    }
}

#[test]
fn test_tool_call_unknown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = ToolRouter::new(&config(&dir)).expect("router");

    let result = router
        .call_tool("nonexistent_tool", json!({}))
        .expect("should not error");

    assert!(result.is_error);
    assert!(result.content[0].text.contains("Unknown tool"));
}

#[test]
fn test_malformed_arguments_become_error_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (text, is_error) = call(&server(&dir), 1, "edit", json!({ "filePath": "a.txt" }));

    assert!(is_error);
    assert!(text.contains("invalid edit parameters"));
}

#[test]
fn test_read_edit_read_cycle() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("main.py"),
        "def greet():\n    print('hi')\n\ndef main():\n    greet()\n",
    )
    .expect("seed");
    let server = server(&dir);

    let (listing, is_error) = call(
        &server,
        1,
        "read",
        json!({ "filePath": "main.py", "startLine": 1, "endLine": 2 }),
    );
    assert!(!is_error, "{listing}");
    assert_eq!(listing, "1 | def greet():\n2 |     print('hi')\n");

    // Indentation dropped by the caller.
    let (report, is_error) = call(
        &server,
        2,
        "edit",
        json!({
            "filePath": "main.py",
            "oldString": "def greet():\nprint('hi')",
            "newString": "def greet():\n    print('hello')"
        }),
    );
    assert!(!is_error, "{report}");
    assert!(report.starts_with("Updated main.py"));

    let (report, is_error) = call(
        &server,
        3,
        "edit_lines",
        json!({ "filePath": "main.py", "startLine": 5, "endLine": 5, "newString": "    greet()\n    greet()" }),
    );
    assert!(!is_error, "{report}");

    assert_eq!(
        std::fs::read_to_string(dir.path().join("main.py")).expect("read back"),
        "def greet():\n    print('hello')\n\ndef main():\n    greet()\n    greet()\n"
    );
}

#[test]
fn test_failed_edit_is_error_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.txt"), "x = 1\nx = 1\n").expect("seed");
    let server = server(&dir);

    let (text, is_error) = call(
        &server,
        1,
        "edit",
        json!({ "filePath": "a.txt", "oldString": "x = 1", "newString": "x = 2" }),
    );
    assert!(is_error);
    assert!(text.contains("found 2 matches"));

    let (text, is_error) = call(&server, 2, "read", json!({ "filePath": "missing.txt" }));
    assert!(is_error);
    assert!(text.contains("file not found"));
}

#[test]
fn test_serve_session_over_buffers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = server(&dir);

    let session = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }).to_string(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string(),
        json!({ "jsonrpc": "2.0", "id": 3, "method": "ping" }).to_string(),
    ]
    .join("\n");
    let mut input = session.as_bytes();
    let mut output = Vec::new();

    server.serve(&mut input, &mut output).expect("serve");

    let responses: Vec<Value> = String::from_utf8(output)
        .expect("utf-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    let ids: Vec<&Value> = responses.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3)]);
    assert_eq!(
        responses[1]["result"]["tools"].as_array().map(Vec::len),
        Some(5)
    );
}

#[test]
fn test_write_then_list_then_edit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = server(&dir);

    let (report, is_error) = call(
        &server,
        1,
        "write",
        json!({ "filePath": "pkg/mod.rs", "content": "pub fn one() -> u8 {\n    1\n}\n" }),
    );
    assert!(!is_error, "{report}");
    assert!(report.contains("new file"));

    let (report, is_error) = call(&server, 2, "write", json!({ "filePath": "pkg/empty", "isDirectory": true }));
    assert!(!is_error, "{report}");

    let (listing, is_error) = call(&server, 3, "list", json!({ "path": "pkg" }));
    assert!(!is_error, "{listing}");
    assert_eq!(listing, "Directory pkg (2 entries)\nempty/\nmod.rs (29 bytes)\n");

    let (report, is_error) = call(
        &server,
        4,
        "edit",
        json!({ "filePath": "pkg/mod.rs", "oldString": "1\n}", "newString": "2\n}" }),
    );
    assert!(!is_error, "{report}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("pkg/mod.rs")).expect("read back"),
        "pub fn one() -> u8 {\n    2\n}\n"
    );
}

#[test]
fn test_write_and_list_refuse_bad_targets() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.txt"), "a").expect("seed");
    let server = server(&dir);

    let (text, is_error) = call(&server, 1, "write", json!({ "filePath": "../escape.txt", "content": "x" }));
    assert!(is_error);
    assert!(text.contains("outside the workspace"));
    assert!(!dir.path().join("../escape.txt").exists());

    let (text, is_error) = call(&server, 2, "write", json!({ "filePath": "b.txt" }));
    assert!(is_error);
    assert!(text.contains("content is required"));

    let (text, is_error) = call(&server, 3, "list", json!({ "path": "a.txt" }));
    assert!(is_error);
    assert!(text.contains("not a directory"));

    let (listing, is_error) = call(&server, 4, "list", json!({}));
    assert!(!is_error, "{listing}");
    assert!(listing.contains("a.txt (1 bytes)"));
}

#[test]
fn test_edit_with_empty_old_string_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.rs"), "fn main() {}\n").expect("seed");
    let server = server(&dir);

    let (text, is_error) = call(
        &server,
        1,
        "edit",
        json!({ "filePath": "a.rs", "oldString": "", "newString": "X", "replaceAll": true }),
    );
    assert!(is_error);
    assert!(text.contains("cannot be empty"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.rs")).expect("read back"),
        "fn main() {}\n"
    );
}
