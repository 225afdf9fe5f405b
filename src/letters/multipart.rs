use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures::StreamExt;

use super::models::LetterJobRequest;
use crate::mcp::content::{detect_mime_type, is_banner_image};
use crate::ErrorResponse;

pub const JOB_FIELD: &str = "job";
pub const TOP_BANNER_FIELD: &str = "top_banner";
pub const BOTTOM_BANNER_FIELD: &str = "bottom_banner";

/// A letter job sent as `multipart/form-data` with banner files attached.
#[derive(Debug)]
pub struct ParsedLetterUpload {
    pub job: LetterJobRequest,
    pub top_banner: Option<Vec<u8>>,
    pub bottom_banner: Option<Vec<u8>>,
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Missing '{0}' field")]
    MissingField(&'static str),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Invalid job JSON: {0}")]
    SerializationError(String),
    #[error("'{0}' must be a PNG or JPEG image")]
    UnsupportedImage(String),
    #[error("Upload exceeds the {limit} byte limit (while reading '{field}')")]
    TooLarge { field: String, limit: usize },
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&error.to_string())),
            MultipartParseError::TooLarge { .. } => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Reads the `job` JSON field and the optional `top_banner` /
    /// `bottom_banner` files. Unknown fields are drained and ignored.
    ///
    /// `limit` caps the bytes read across all fields.
    pub async fn parse_letter_upload(
        mut multipart: Multipart,
        limit: usize,
    ) -> Result<ParsedLetterUpload, MultipartParseError> {
        let mut budget = ReadBudget { remaining: limit, limit };
        let mut job: Option<LetterJobRequest> = None;
        let mut top_banner = None;
        let mut bottom_banner = None;

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| MultipartParseError::FieldError("Content disposition not found".to_string()))?;
            let name = content_disposition
                .get_name()
                .map(str::to_string)
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?;
            let filename = content_disposition.get_filename().map(str::to_string);

            match name.as_str() {
                JOB_FIELD => {
                    let buffer = read_field(&mut field, &name, &mut budget).await?;
                    let raw = String::from_utf8(buffer)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    let parsed = serde_json::from_str(&raw)
                        .map_err(|e| MultipartParseError::SerializationError(e.to_string()))?;
                    job = Some(parsed);
                }
                TOP_BANNER_FIELD | BOTTOM_BANNER_FIELD => {
                    let data = read_field(&mut field, &name, &mut budget).await?;
                    if data.is_empty() {
                        continue;
                    }
                    if !is_banner_image(&data) {
                        return Err(MultipartParseError::UnsupportedImage(name));
                    }
                    let filename = filename.unwrap_or_else(|| format!("{}.dat", name));
                    log::debug!(
                        "received {} '{}' ({}, {} bytes)",
                        name,
                        filename,
                        detect_mime_type(&filename),
                        data.len()
                    );
                    if name == TOP_BANNER_FIELD {
                        top_banner = Some(data);
                    } else {
                        bottom_banner = Some(data);
                    }
                }
                _ => {
                    read_field(&mut field, &name, &mut budget).await?;
                }
            }
        }

        let job = job.ok_or(MultipartParseError::MissingField(JOB_FIELD))?;
        Ok(ParsedLetterUpload {
            job,
            top_banner,
            bottom_banner,
        })
    }
}

struct ReadBudget {
    remaining: usize,
    limit: usize,
}

async fn read_field(
    field: &mut Field,
    name: &str,
    budget: &mut ReadBudget,
) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        if data.len() > budget.remaining {
            return Err(MultipartParseError::TooLarge {
                field: name.to_string(),
                limit: budget.limit,
            });
        }
        budget.remaining -= data.len();
        buffer.extend_from_slice(&data);
    }
    Ok(buffer)
}
