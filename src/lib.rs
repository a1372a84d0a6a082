//! `smart-edit` - fuzzy locate-and-patch engine for agent-driven file edits.
//!
//! An agent supplies a target snippet that is only approximately what the
//! file contains (re-indented, trailing whitespace, escaped quotes, a stale
//! line or two). The engine finds the single region it refers to, or fails
//! with an error that says how to retry.
//!
//! # Layers
//!
//! - [`edit`] - pure matching engine: strategies, resolver, patching
//! - [`file_edit`] - read/commit orchestration over injected host collaborators
//! - [`host`] - local filesystem collaborators and the serialized commit thread
//! - [`tools`] / [`server`] - MCP tools (`edit`, `edit_lines`, `read`, `write`, `list`) over stdio
//!
//! ```text
//! stdin (JSON-RPC) -> McpServer -> ToolRouter -> file_edit -> edit::smart_replace
//!                                                    |
//!                                        LocalFs / SerialCommitter
//! ```

pub mod edit;
pub mod error;
pub mod file_edit;
pub mod host;
pub mod server;
pub mod tools;
pub mod util;

pub use edit::smart_replace;
pub use error::{EditError, EditResult};
pub use file_edit::{edit_file_by_lines, edit_file_by_search, write_file, OperationReport};
pub use server::run_mcp_server;
