//! MCP (Model Context Protocol) module
//!
//! JSON-RPC 2.0 over HTTP exposing the letter tools to AI clients.

pub mod content;
pub mod handlers;
pub mod rpc;
pub mod service;
pub mod tools;

pub use handlers::{config, McpState};
pub use service::McpService;
