//! Letter operations shared by the HTTP handlers and the MCP tools.

use actix_web::HttpResponse;
use uuid::Uuid;

use super::models::{
    DefaultsResponse, GenerateLettersResponse, GroupValuesRequest, GroupValuesResponse,
    LetterJobRequest, PreviewLetterRequest, PreviewLetterResponse,
};
use crate::mcp::content::FileContent;
use crate::merge::batch::{ARCHIVE_FILENAME, DEFAULT_GROUP_COLUMN, DEFAULT_IDENTIFIER_FIELD};
use crate::merge::dispatch::{default_templates, suggest_labels};
use crate::merge::filename::DEFAULT_PATTERN;
use crate::merge::{
    BannerFallback, BatchOutcome, BatchRunner, LayoutConfig, MergeError, TextDirection,
};
use crate::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum LetterError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl LetterError {
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Merge(err) => err.is_precondition(),
        }
    }
}

impl From<LetterError> for HttpResponse {
    fn from(error: LetterError) -> Self {
        if error.is_client_error() {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string()))
        } else {
            log::error!("letter generation failed: {}", error);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&error.to_string()))
        }
    }
}

/// A finished batch run tagged with its id.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub job_id: Uuid,
    pub outcome: BatchOutcome,
}

impl GenerationReport {
    pub fn into_response(self) -> GenerateLettersResponse {
        let archive = FileContent::zip(ARCHIVE_FILENAME, &self.outcome.archive);
        GenerateLettersResponse {
            job_id: self.job_id,
            created: self.outcome.created,
            skipped: self.outcome.skipped,
            entries: self.outcome.entries,
            archive,
        }
    }
}

/// Stateless letter operations; only the fallback banner locations are kept.
#[derive(Debug, Clone)]
pub struct LetterService {
    fallback: BannerFallback,
}

impl LetterService {
    pub fn new(fallback: BannerFallback) -> Self {
        Self { fallback }
    }

    pub fn preview(&self, request: PreviewLetterRequest) -> Result<PreviewLetterResponse, LetterError> {
        let row_index = request.row_index;
        let prepared = request.job.prepare().map_err(LetterError::Validation)?;
        let banners = prepared.banners.resolve(&self.fallback);

        let letter = BatchRunner::preview(&prepared.dataset, &prepared.job, row_index, &banners)?;
        let header_fields = prepared
            .dataset
            .row(row_index)
            .map(|row| {
                prepared
                    .job
                    .layout
                    .header_fields
                    .iter()
                    .map(|field| row.get_or_empty(field))
                    .collect()
            })
            .unwrap_or_default();

        log::info!("preview of row {} rendered as '{}'", row_index, letter.filename);

        Ok(PreviewLetterResponse {
            document: FileContent::docx(&letter.filename, &letter.document),
            filename: letter.filename,
            body: letter.body,
            template: letter.template,
            header_fields,
        })
    }

    pub fn generate(&self, request: LetterJobRequest) -> Result<GenerationReport, LetterError> {
        self.generate_with_banners(request, None, None)
    }

    /// Like [`generate`](Self::generate), with uploaded banner bytes taking
    /// precedence over the ones in the request.
    pub fn generate_with_banners(
        &self,
        request: LetterJobRequest,
        top: Option<Vec<u8>>,
        bottom: Option<Vec<u8>>,
    ) -> Result<GenerationReport, LetterError> {
        let job_id = Uuid::new_v4();
        let mut prepared = request.prepare().map_err(LetterError::Validation)?;
        if top.is_some() {
            prepared.banners.top = top;
        }
        if bottom.is_some() {
            prepared.banners.bottom = bottom;
        }
        let banners = prepared.banners.resolve(&self.fallback);

        log::info!(
            "job {}: generating letters for {} rows grouped by '{}'",
            job_id,
            prepared.dataset.len(),
            prepared.job.group_column
        );
        let outcome = BatchRunner::run_all(&prepared.dataset, &prepared.job, &banners)?;

        Ok(GenerationReport { job_id, outcome })
    }

    pub fn group_values(&self, request: GroupValuesRequest) -> Result<GroupValuesResponse, LetterError> {
        if request.group_column.trim().is_empty() {
            return Err(LetterError::Validation(
                "[group_column] Group column must not be empty".to_string(),
            ));
        }
        let dataset = request.dataset();
        if dataset.is_empty() {
            return Err(MergeError::EmptyDataset.into());
        }
        if !dataset.has_column(&request.group_column) {
            return Err(MergeError::UnknownGroupColumn(request.group_column).into());
        }

        let preferred: Vec<String> = request
            .preferred_labels
            .unwrap_or_else(|| default_templates().into_iter().map(|t| t.label).collect());
        let preferred: Vec<&str> = preferred.iter().map(String::as_str).collect();

        Ok(GroupValuesResponse {
            suggestion: suggest_labels(&dataset, &request.group_column, &preferred),
            group_column: request.group_column,
        })
    }

    pub fn defaults(&self, direction: TextDirection) -> DefaultsResponse {
        DefaultsResponse {
            layout: LayoutConfig::for_direction(direction),
            groups: default_templates(),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            filename_pattern: DEFAULT_PATTERN.to_string(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Row;

    fn service() -> LetterService {
        LetterService::new(BannerFallback::none())
    }

    #[test]
    fn test_preview_reports_header_values() {
        let mut job = LetterJobRequest::new(vec![Row::new()
            .with("FullName", "Jane Doe")
            .with("Group", "ירוק")
            .with("Address", "1 Main St")]);
        job.layout.header_fields = vec!["FullName".into(), "Address".into()];

        let response = service()
            .preview(PreviewLetterRequest { job, row_index: 0 })
            .unwrap();

        assert_eq!(response.template, "green");
        assert_eq!(response.header_fields, ["Jane Doe", "1 Main St"]);
        assert_eq!(response.filename, "Jane Doe - ירוק.docx");
        assert!(response.body.contains("1 Main St"));
    }

    #[test]
    fn test_generate_counts() {
        let job = LetterJobRequest::new(vec![
            Row::new().with("FullName", "A").with("Group", "כחול"),
            Row::new().with("FullName", "B").with("Group", "Purple"),
        ]);
        let report = service().generate(job).unwrap();

        assert_eq!(report.outcome.created, 1);
        let response = report.into_response();
        assert_eq!(response.skipped[0].identifier, "B");
        assert_eq!(response.archive.metadata.filename, "letters_output.zip");
    }

    #[test]
    fn test_error_classification() {
        let validation = LetterError::Validation("bad".into());
        assert!(validation.is_client_error());

        let empty = service().generate(LetterJobRequest::new(Vec::new())).unwrap_err();
        assert!(empty.is_client_error());

        let io = LetterError::from(MergeError::Io(std::io::Error::other("disk")));
        assert!(!io.is_client_error());
    }

    #[test]
    fn test_group_values() {
        let request = GroupValuesRequest {
            rows: vec![
                Row::new().with("Group", "Gamma"),
                Row::new().with("Group", "ירוק"),
            ],
            columns: None,
            group_column: "Group".into(),
            preferred_labels: None,
        };
        let response = service().group_values(request).unwrap();
        assert_eq!(response.suggestion.values, ["Gamma", "ירוק"]);
        assert_eq!(response.suggestion.labels, ["Gamma", "ירוק", "צהוב"]);
    }

    #[test]
    fn test_defaults_for_rtl() {
        let defaults = service().defaults(TextDirection::Rtl);
        assert_eq!(defaults.layout.salutation, "לכבוד,");
        assert_eq!(defaults.groups.len(), 3);
    }
}
