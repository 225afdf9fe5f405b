//! Single-row preview and whole-dataset generation.

use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use super::archive::ZipBuilder;
use super::banner::BannerSet;
use super::compose::LetterComposer;
use super::dispatch::{DispatchPolicy, GroupTemplates};
use super::filename::FilenamePattern;
use super::layout::LayoutConfig;
use super::row::Dataset;
use super::{GeneratedLetter, MergeError};

pub const ARCHIVE_FILENAME: &str = "letters_output.zip";
pub const ZIP_MIME: &str = "application/zip";
pub const DEFAULT_GROUP_COLUMN: &str = "Group";
pub const DEFAULT_IDENTIFIER_FIELD: &str = "FullName";

/// Everything a merge run needs besides the data and the banners.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeJob {
    pub group_column: String,
    pub groups: GroupTemplates,
    pub layout: LayoutConfig,
    pub filename: FilenamePattern,
    /// Column naming the recipient in skip reports.
    pub identifier_field: String,
}

impl Default for MergeJob {
    fn default() -> Self {
        Self {
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            groups: GroupTemplates::default(),
            layout: LayoutConfig::default(),
            filename: FilenamePattern::default(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
        }
    }
}

impl MergeJob {
    pub fn new(group_column: impl Into<String>, groups: GroupTemplates) -> Self {
        Self {
            group_column: group_column.into(),
            groups,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_filename(mut self, filename: FilenamePattern) -> Self {
        self.filename = filename;
        self
    }

    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }
}

/// A row left out of the batch because its group matched no label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedRow {
    /// Zero-based position in the dataset
    #[schema(example = 3)]
    pub row_index: usize,
    #[schema(example = "Jane Doe")]
    pub identifier: String,
    #[schema(example = "Purple")]
    pub group_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Deflate ZIP holding one `.docx` per created letter.
    pub archive: Vec<u8>,
    pub created: usize,
    pub skipped: Vec<SkippedRow>,
    /// Archive entry names in creation order.
    pub entries: Vec<String>,
}

pub struct BatchRunner;

impl BatchRunner {
    /// Compose the letter for one row. Unmatched groups use the default
    /// template.
    pub fn preview(
        dataset: &Dataset,
        job: &MergeJob,
        row_index: usize,
        banners: &BannerSet,
    ) -> Result<GeneratedLetter, MergeError> {
        if dataset.is_empty() {
            return Err(MergeError::EmptyDataset);
        }
        let row = dataset.row(row_index).ok_or(MergeError::RowOutOfRange {
            index: row_index,
            len: dataset.len(),
        })?;
        let template = job
            .groups
            .dispatch(row, &job.group_column, DispatchPolicy::Fallback)
            .ok_or(MergeError::NoTemplates)?;

        let letter = LetterComposer::compose(row, &job.layout, template, banners)?;
        let filename = job.filename.format(row);
        log::debug!("previewed row {} as '{}' using '{}'", row_index, filename, template.name);

        Ok(GeneratedLetter {
            filename,
            document: letter.document,
            body: letter.body,
            template: template.name.clone(),
        })
    }

    /// Generate a letter for every row whose group matches a label and bundle
    /// them into one archive. Unmatched rows are reported, not fatal.
    pub fn run_all(dataset: &Dataset, job: &MergeJob, banners: &BannerSet) -> Result<BatchOutcome, MergeError> {
        if dataset.is_empty() {
            return Err(MergeError::EmptyDataset);
        }
        if !dataset.has_column(&job.group_column) {
            return Err(MergeError::UnknownGroupColumn(job.group_column.clone()));
        }

        let mut zip = ZipBuilder::new();
        let mut names = UniqueNames::default();
        let mut skipped = Vec::new();

        for (row_index, row) in dataset.rows().iter().enumerate() {
            let Some(template) = job.groups.dispatch(row, &job.group_column, DispatchPolicy::Skip) else {
                let skip = SkippedRow {
                    row_index,
                    identifier: row.get_or_empty(&job.identifier_field),
                    group_value: row.get_or_empty(&job.group_column),
                };
                log::warn!(
                    "skipping '{}': unknown group value '{}'",
                    skip.identifier,
                    skip.group_value
                );
                skipped.push(skip);
                continue;
            };

            let letter = LetterComposer::compose(row, &job.layout, template, banners)?;
            let filename = names.claim(&job.filename.format(row), job.filename.suffix());
            zip.add(&filename, &letter.document)?;
        }

        let entries = zip.entries().to_vec();
        let archive = zip.finish()?;
        log::info!(
            "created {} letters ({} skipped), archive {} bytes",
            entries.len(),
            skipped.len(),
            archive.len()
        );

        Ok(BatchOutcome {
            archive,
            created: entries.len(),
            skipped,
            entries,
        })
    }
}

/// Case-insensitive registry of archive entry names.
#[derive(Debug, Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    /// Return `name`, or `name (2)`, `name (3)`, ... with the counter placed
    /// before `suffix`, whichever is still free.
    fn claim(&mut self, name: &str, suffix: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let split = name
            .len()
            .checked_sub(suffix.len())
            .filter(|&i| name.is_char_boundary(i) && name[i..].eq_ignore_ascii_case(suffix))
            .unwrap_or(name.len());
        let (stem, ext) = name.split_at(split);

        let mut counter = 2;
        loop {
            let candidate = format!("{stem} ({counter}){ext}");
            if self.taken.insert(candidate.to_lowercase()) {
                log::debug!("renamed duplicate '{}' to '{}'", name, candidate);
                return candidate;
            }
            counter += 1;
        }
    }
}
