//! Stateless MCP HTTP handlers for Actix-Web.
//!
//! Each POST carries one JSON-RPC request; no SSE connections are held open.

use actix_web::{web, HttpResponse, Responder};
use futures::StreamExt;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::mcp::rpc::{OutboundResponse, RpcRequest, INVALID_REQUEST};
use crate::mcp::service::McpService;

pub struct McpState {
    pub service: McpService,
    /// Request bodies above this size get a JSON-RPC error.
    pub max_payload_bytes: usize,
}

impl McpState {
    pub fn new(service: McpService) -> Self {
        Self {
            service,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn with_payload_limit(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }
}

/// POST /mcp
pub async fn rpc_handler(
    state: web::Data<Arc<McpState>>,
    mut payload: web::Payload,
) -> impl Responder {
    let limit = state.max_payload_bytes;
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                log::warn!("failed to read MCP request body: {}", err);
                return HttpResponse::BadRequest().json(OutboundResponse::parse_error(format!(
                    "Failed to read request body: {}",
                    err
                )));
            }
        };
        if body.len() + chunk.len() > limit {
            log::warn!("MCP request body exceeds {} bytes", limit);
            return HttpResponse::PayloadTooLarge().json(OutboundResponse::error(
                None,
                INVALID_REQUEST,
                format!("Request body exceeds the {} byte limit", limit),
            ));
        }
        body.extend_from_slice(&chunk);
    }

    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            log::warn!("malformed MCP request: {}", err);
            return HttpResponse::Ok().json(OutboundResponse::parse_error(format!(
                "Invalid JSON-RPC payload: {}",
                err
            )));
        }
    };

    log::info!("Received MCP request: {}", request.method);

    let service = state.service.clone();
    match web::block(move || service.handle_request(request)).await {
        Ok(Some(response)) => HttpResponse::Ok().json(response),
        // Notifications get no body
        Ok(None) => HttpResponse::Accepted().finish(),
        Err(err) => {
            log::error!("MCP worker failed: {}", err);
            HttpResponse::Ok().json(OutboundResponse::internal_error(None, "MCP worker failed"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/mcp").route(web::post().to(rpc_handler)));

    // Same endpoint under the path older clients use
    cfg.service(web::resource("/sse").route(web::post().to(rpc_handler)));
}
