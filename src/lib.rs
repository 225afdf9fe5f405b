use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod letters;
pub mod mcp;
pub mod merge;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::letters::handlers::preview_letter,
        crate::letters::handlers::generate_letters,
        crate::letters::handlers::download_letters,
        crate::letters::handlers::generate_letters_multipart,
        crate::letters::handlers::group_values,
        crate::letters::handlers::letter_defaults
    ),
    components(
        schemas(
            letters::models::LetterJobRequest,
            letters::models::BannerPayload,
            letters::models::PreviewLetterRequest,
            letters::models::PreviewLetterResponse,
            letters::models::GenerateLettersResponse,
            letters::models::GroupValuesRequest,
            letters::models::GroupValuesResponse,
            letters::models::DefaultsResponse,
            merge::Template,
            merge::LayoutConfig,
            merge::Margins,
            merge::TextDirection,
            merge::PageSize,
            merge::SkippedRow,
            merge::dispatch::LabelSuggestion,
            mcp::content::FileContent,
            mcp::content::FileMetadata,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Letters", description = "Mail-merge preview and batch generation endpoints.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// JSON extractor settings: body limit and structured 400s for bad payloads.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = err.to_string();
            log::warn!("rejected JSON payload: {}", message);
            let response = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    HttpResponse::PayloadTooLarge()
                        .json(ErrorResponse::new("PayloadTooLarge", &message))
                }
                _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message)),
            };
            InternalError::from_response(err, response).into()
        })
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found("No route matches this request"))
}

/// `/api` letter routes plus the MCP endpoints.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").configure(letters::config))
        .configure(mcp::config)
        .default_service(web::to(not_found));
}

fn cors(config: &AppConfig) -> Cors {
    let cors = if config.cors_allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![
            header::CONTENT_DISPOSITION,
            header::HeaderName::from_static("x-letters-created"),
            header::HeaderName::from_static("x-letters-skipped"),
        ])
        .max_age(3600)
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration. Please check your .env file. Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(config.clone()));
    let mcp_registry = mcp::tools::ToolRegistry::new(app_state.letters.clone());
    let mcp_state = web::Data::new(Arc::new(
        mcp::McpState::new(mcp::McpService::new(mcp_registry))
            .with_payload_limit(config.max_payload_bytes),
    ));

    let prometheus = match PrometheusMetricsBuilder::new("mailmerge_server")
        .endpoint("/metrics")
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(e) => {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::process::exit(1);
        }
    };

    let (host, port) = config.bind_address();
    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Fallback banners are read from {}", config.banner_dir.display());

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&app_state.config))
            .app_data(app_state.clone())
            .app_data(mcp_state.clone())
            .app_data(json_config(app_state.config.max_payload_bytes))
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((host, port))?
    .run()
    .await
}
