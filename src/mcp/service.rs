//! MCP Service - JSON-RPC 2.0 methods of the mail-merge server.
//!
//! Only tools are served. `resources/list` and `prompts/list` answer with
//! empty lists so generic clients can probe them.

use crate::mcp::rpc::{OutboundResponse, RpcRequest, INVALID_REQUEST, JSONRPC_VERSION};
use crate::mcp::tools::registry::ToolDescriptor;
use crate::mcp::tools::ToolRegistry;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_TITLE: &str = "Mail Merge MCP Server";

#[derive(Clone)]
pub struct McpService {
    registry: Arc<ToolRegistry>,
}

impl McpService {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Returns `None` for notifications.
    pub fn handle_request(&self, request: RpcRequest) -> Option<OutboundResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            warn!("rejecting jsonrpc version {}", request.jsonrpc);
            return Some(OutboundResponse::error(
                request.id,
                INVALID_REQUEST,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }

        let RpcRequest { method, params, id, .. } = request;
        let response = match method.as_str() {
            "initialize" => self.initialize(id, params),
            "tools/list" => respond(
                id,
                &ToolList {
                    tools: self.registry.list_tools(),
                },
            ),
            "tools/call" => self.call_tool(id, params),
            "resources/list" => OutboundResponse::success(id, json!({ "resources": [] })),
            "prompts/list" => OutboundResponse::success(id, json!({ "prompts": [] })),
            "ping" => OutboundResponse::success(id, json!({ "ok": true })),
            notification if notification.starts_with("notifications/") => {
                info!("client notification: {}", notification);
                return None;
            }
            other => OutboundResponse::method_not_found(id, other),
        };
        Some(response)
    }

    fn initialize(&self, id: Option<Value>, params: Option<Value>) -> OutboundResponse {
        let params: InitializeParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return OutboundResponse::invalid_params(id, message),
        };

        match params.client_info {
            Some(client) => info!(
                "initializing session for {} {}",
                client.name,
                client.version.as_deref().unwrap_or("(unknown version)")
            ),
            None => info!("initializing session for an anonymous client"),
        }

        OutboundResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "title": SERVER_TITLE,
                },
                "capabilities": { "tools": { "listChanged": false } },
            }),
        )
    }

    fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> OutboundResponse {
        let params: CallToolParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return OutboundResponse::invalid_params(id, message),
        };

        info!("calling tool '{}'", params.name);
        let result = self.registry.call_tool(&params.name, params.arguments);
        respond(id, &result)
    }
}

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(rename = "clientInfo", default)]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Deserialize)]
struct ClientInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ToolList {
    tools: Vec<ToolDescriptor>,
}

fn respond<T: Serialize>(id: Option<Value>, payload: &T) -> OutboundResponse {
    match serde_json::to_value(payload) {
        Ok(value) => OutboundResponse::success(id, value),
        Err(err) => OutboundResponse::internal_error(id, format!("Failed to encode result: {}", err)),
    }
}

/// Missing params deserialize from `{}` so all-optional structs accept them.
fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let value = match params {
        Some(Value::Null) | None => json!({}),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|err| format!("Invalid params: {}", err))
}
