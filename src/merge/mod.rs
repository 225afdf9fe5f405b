//! Merge engine - turns spreadsheet rows and group templates into letters.
//!
//! This module contains the building blocks of a mail-merge run:
//! - `placeholder` - `{{Field}}` substitution in body text
//! - `filename` - `{Field}` filename patterns, sanitizing and suffixing
//! - `dispatch` - group value → template selection
//! - `layout` / `banner` / `docx` / `compose` - page geometry and document output
//! - `batch` - whole-dataset generation into a ZIP archive

pub mod archive;
pub mod banner;
pub mod batch;
pub mod compose;
pub mod dispatch;
pub mod docx;
pub mod filename;
pub mod layout;
pub mod placeholder;
pub mod row;
pub mod validation;

pub use banner::{BannerAssets, BannerFallback, BannerImage, BannerSet};
pub use batch::{BatchOutcome, BatchRunner, MergeJob, SkippedRow};
pub use compose::{ComposedLetter, LetterComposer};
pub use dispatch::{DispatchPolicy, GroupTemplates, Template};
pub use filename::FilenamePattern;
pub use layout::{LayoutConfig, Margins, PageGeometry, PageSize, TextDirection};
pub use row::{CellValue, Dataset, Row};

use thiserror::Error;

/// Errors that can occur while merging letters.
///
/// Missing fields, missing banners and malformed filename patterns are never
/// errors; they degrade to empty content or fallbacks.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no dataset loaded: provide at least one row")]
    EmptyDataset,
    #[error("group column '{0}' is not one of the dataset columns")]
    UnknownGroupColumn(String),
    #[error("row {index} does not exist (dataset has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("no group templates configured")]
    NoTemplates,
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write zip container: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl MergeError {
    /// Whether the error comes from a caller precondition rather than from
    /// writing the output.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset
                | Self::UnknownGroupColumn(_)
                | Self::RowOutOfRange { .. }
                | Self::NoTemplates
        )
    }
}

/// A single letter ready to hand to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLetter {
    pub filename: String,
    pub document: Vec<u8>,
    /// Body text after placeholder substitution.
    pub body: String,
    /// Name of the group template that produced the letter.
    pub template: String,
}
