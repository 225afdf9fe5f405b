use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::mcp::content::FileContent;
use crate::merge::batch::{DEFAULT_GROUP_COLUMN, DEFAULT_IDENTIFIER_FIELD};
use crate::merge::dispatch::{default_templates, GroupTemplates, LabelSuggestion, Template};
use crate::merge::filename::DEFAULT_PATTERN;
use crate::merge::validation::{
    validate_groups, validate_layout, validate_required, ValidationError, ValidationErrors,
};
use crate::merge::{BannerAssets, Dataset, FilenamePattern, LayoutConfig, MergeJob, Row, SkippedRow};

fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}

fn default_filename_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_identifier_field() -> String {
    DEFAULT_IDENTIFIER_FIELD.to_string()
}

/// Banner images as base64 strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BannerPayload {
    /// PNG or JPEG placed in the page header
    pub top: Option<String>,
    /// PNG or JPEG placed in the page footer
    pub bottom: Option<String>,
}

impl BannerPayload {
    fn decode(&self, errors: &mut ValidationErrors) -> BannerAssets {
        let mut decode = |value: &Option<String>, field: &str| {
            let raw = value.as_deref()?.trim();
            if raw.is_empty() {
                return None;
            }
            match BASE64.decode(raw) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    errors.add(
                        ValidationError::new(field, format!("Not valid base64: {}", err))
                            .with_suggestion("Send the raw image bytes encoded with standard base64"),
                    );
                    None
                }
            }
        };

        let top = decode(&self.top, "banners.top");
        let bottom = decode(&self.bottom, "banners.bottom");
        BannerAssets::new(top, bottom)
    }
}

/// A dataset plus everything needed to turn it into letters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LetterJobRequest {
    /// Row objects mapping column name to a string, number, boolean or null
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Column order; defaults to the union of row keys in first-seen order
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default = "default_group_column")]
    #[schema(example = "Group")]
    pub group_column: String,
    /// Group templates; the built-in blue/green/yellow set when omitted
    #[serde(default)]
    pub groups: Option<Vec<Template>>,
    /// Name of the template used when a preview row matches no label
    #[serde(default)]
    pub default_group: Option<String>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default = "default_filename_pattern")]
    #[schema(example = "{FullName} - {Group}")]
    pub filename_pattern: String,
    #[serde(default = "default_identifier_field")]
    #[schema(example = "FullName")]
    pub identifier_field: String,
    #[serde(default)]
    pub banners: BannerPayload,
}

/// A validated request split into the merge engine's inputs.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub dataset: Dataset,
    pub job: MergeJob,
    pub banners: BannerAssets,
}

fn build_dataset(columns: Option<Vec<String>>, rows: Vec<Row>) -> Dataset {
    match columns {
        Some(columns) => Dataset::new(columns, rows),
        None => Dataset::from_rows(rows),
    }
}

impl LetterJobRequest {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            columns: None,
            group_column: default_group_column(),
            groups: None,
            default_group: None,
            layout: LayoutConfig::default(),
            filename_pattern: default_filename_pattern(),
            identifier_field: default_identifier_field(),
            banners: BannerPayload::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result()
    }

    fn collect_errors(&self, errors: &mut ValidationErrors) -> BannerAssets {
        validate_required(&self.group_column, "group_column", "Group column", errors);
        let groups = self.groups.clone().unwrap_or_else(default_templates);
        validate_groups(&groups, self.default_group.as_deref(), errors);
        validate_layout(&self.layout, errors);
        self.banners.decode(errors)
    }

    /// Validate and convert into engine inputs.
    pub fn prepare(self) -> Result<PreparedJob, String> {
        let mut errors = ValidationErrors::new();
        let banners = self.collect_errors(&mut errors);
        errors.into_result()?;

        let dataset = build_dataset(self.columns, self.rows);

        let mut groups = GroupTemplates::new(self.groups.unwrap_or_else(default_templates));
        if let Some(name) = self.default_group.as_deref() {
            groups = groups.with_default(name);
        }

        let job = MergeJob::new(self.group_column, groups)
            .with_layout(self.layout)
            .with_filename(FilenamePattern::new(self.filename_pattern))
            .with_identifier_field(self.identifier_field);

        Ok(PreparedJob {
            dataset,
            job,
            banners,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreviewLetterRequest {
    #[serde(flatten)]
    pub job: LetterJobRequest,
    /// Zero-based row to render
    #[serde(default)]
    pub row_index: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreviewLetterResponse {
    #[schema(example = "Jane Doe - Blue.docx")]
    pub filename: String,
    /// Body after placeholder substitution
    pub body: String,
    /// Group template that produced the letter
    #[schema(example = "blue")]
    pub template: String,
    /// Header block values in output order
    pub header_fields: Vec<String>,
    pub document: FileContent,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateLettersResponse {
    pub job_id: Uuid,
    pub created: usize,
    pub skipped: Vec<SkippedRow>,
    /// Archive entry names
    pub entries: Vec<String>,
    pub archive: FileContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupValuesRequest {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default = "default_group_column")]
    pub group_column: String,
    /// Labels to look for, one per group; the built-in labels when omitted
    #[serde(default)]
    pub preferred_labels: Option<Vec<String>>,
}

impl GroupValuesRequest {
    pub fn dataset(&self) -> Dataset {
        build_dataset(self.columns.clone(), self.rows.clone())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupValuesResponse {
    pub group_column: String,
    #[serde(flatten)]
    pub suggestion: LabelSuggestion,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DefaultsQuery {
    /// `ltr` (default) or `rtl`
    #[serde(default)]
    pub direction: crate::merge::TextDirection,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefaultsResponse {
    pub layout: LayoutConfig,
    pub groups: Vec<Template>,
    pub group_column: String,
    pub filename_pattern: String,
    pub identifier_field: String,
}
