//! HTTP surface for previewing and generating letters.

pub mod handlers;
pub mod models;
pub mod multipart;
pub mod service;

pub use handlers::config;
pub use service::{GenerationReport, LetterError, LetterService};
