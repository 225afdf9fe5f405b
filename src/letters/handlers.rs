use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};

use super::models::{
    DefaultsQuery, DefaultsResponse, GenerateLettersResponse, GroupValuesRequest,
    GroupValuesResponse, LetterJobRequest, PreviewLetterRequest, PreviewLetterResponse,
};
use super::multipart::MultipartParser;
use super::service::{GenerationReport, LetterError};
use crate::merge::batch::{ARCHIVE_FILENAME, ZIP_MIME};
use crate::state::AppState;
use crate::ErrorResponse;

pub const CREATED_HEADER: &str = "X-Letters-Created";
pub const SKIPPED_HEADER: &str = "X-Letters-Skipped";

/// Runs CPU-bound merge work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, HttpResponse>
where
    F: FnOnce() -> Result<T, LetterError> + Send + 'static,
    T: Send + 'static,
{
    match web::block(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => {
            log::error!("letter worker failed: {}", e);
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Letter worker failed")))
        }
    }
}

fn archive_response(report: GenerationReport) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(ARCHIVE_FILENAME.to_string())],
    };
    HttpResponse::Ok()
        .content_type(ZIP_MIME)
        .insert_header(disposition)
        .insert_header((CREATED_HEADER, report.outcome.created.to_string()))
        .insert_header((SKIPPED_HEADER, report.outcome.skipped.len().to_string()))
        .body(report.outcome.archive)
}

#[utoipa::path(
    post,
    path = "/api/letters/preview",
    tag = "Letters",
    request_body = PreviewLetterRequest,
    responses(
        (status = 200, description = "Letter rendered for one row", body = PreviewLetterResponse),
        (status = 400, description = "Invalid job or row index", body = ErrorResponse)
    )
)]
pub async fn preview_letter(
    state: web::Data<AppState>,
    req: web::Json<PreviewLetterRequest>,
) -> impl Responder {
    let service = state.letters.clone();
    match blocking(move || service.preview(req.into_inner())).await {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/api/letters/generate",
    tag = "Letters",
    request_body = LetterJobRequest,
    responses(
        (status = 200, description = "Archive built; returned base64-encoded with a per-row report", body = GenerateLettersResponse),
        (status = 400, description = "Invalid job", body = ErrorResponse)
    )
)]
pub async fn generate_letters(
    state: web::Data<AppState>,
    req: web::Json<LetterJobRequest>,
) -> impl Responder {
    let service = state.letters.clone();
    match blocking(move || service.generate(req.into_inner())).await {
        Ok(report) => HttpResponse::Ok().json(report.into_response()),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/api/letters/generate/download",
    tag = "Letters",
    request_body = LetterJobRequest,
    responses(
        (status = 200, description = "The letters_output.zip archive", content_type = "application/zip"),
        (status = 400, description = "Invalid job", body = ErrorResponse)
    )
)]
pub async fn download_letters(
    state: web::Data<AppState>,
    req: web::Json<LetterJobRequest>,
) -> impl Responder {
    let service = state.letters.clone();
    match blocking(move || service.generate(req.into_inner())).await {
        Ok(report) => archive_response(report),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/api/letters/generate/multipart",
    tag = "Letters",
    request_body(
        content_type = "multipart/form-data",
        description = "`job` JSON field plus optional `top_banner` and `bottom_banner` image files"
    ),
    responses(
        (status = 200, description = "The letters_output.zip archive", content_type = "application/zip"),
        (status = 400, description = "Invalid job or banner upload", body = ErrorResponse),
        (status = 413, description = "Upload larger than the configured limit", body = ErrorResponse)
    )
)]
pub async fn generate_letters_multipart(
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    let limit = state.config.max_payload_bytes;
    let upload = match MultipartParser::parse_letter_upload(payload, limit).await {
        Ok(upload) => upload,
        Err(e) => {
            log::warn!("rejected letter upload: {}", e);
            return HttpResponse::from(e);
        }
    };

    let service = state.letters.clone();
    match blocking(move || {
        service.generate_with_banners(upload.job, upload.top_banner, upload.bottom_banner)
    })
    .await
    {
        Ok(report) => archive_response(report),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/api/letters/groups",
    tag = "Letters",
    request_body = GroupValuesRequest,
    responses(
        (status = 200, description = "Distinct group values and suggested labels", body = GroupValuesResponse),
        (status = 400, description = "Empty dataset or unknown column", body = ErrorResponse)
    )
)]
pub async fn group_values(
    state: web::Data<AppState>,
    req: web::Json<GroupValuesRequest>,
) -> impl Responder {
    match state.letters.group_values(req.into_inner()) {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    get,
    path = "/api/letters/defaults",
    tag = "Letters",
    params(DefaultsQuery),
    responses(
        (status = 200, description = "Built-in templates and layout preset for a text direction", body = DefaultsResponse)
    )
)]
pub async fn letter_defaults(
    state: web::Data<AppState>,
    query: web::Query<DefaultsQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(state.letters.defaults(query.direction))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/letters")
            .route("/preview", web::post().to(preview_letter))
            .route("/generate", web::post().to(generate_letters))
            .route("/generate/download", web::post().to(download_letters))
            .route("/generate/multipart", web::post().to(generate_letters_multipart))
            .route("/groups", web::post().to(group_values))
            .route("/defaults", web::get().to(letter_defaults)),
    );
}
