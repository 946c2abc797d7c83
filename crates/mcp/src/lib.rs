//! MCP server exposing Odoo record operations as tools.
//!
//! This crate provides:
//! - JSON-RPC 2.0 and MCP protocol types (`types`)
//! - Tool names and input schemas (`tools`)
//! - Tool call routing onto the Odoo client (`dispatcher`)
//! - MCP method handling (`server`)
//! - Newline-delimited stdio transport (`transport`)

pub mod dispatcher;
pub mod error;
pub mod server;
pub mod tools;
pub mod transport;
pub mod types;

pub use {
    dispatcher::ToolDispatcher,
    error::{Error, Result},
    server::McpServer,
    tools::ToolName,
    transport::{serve, serve_stdio},
};
