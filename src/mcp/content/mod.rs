//! Content types for MCP tool results, also reused by the HTTP responses.

pub mod builder;
pub mod file;
pub mod types;

pub use builder::ContentBuilder;
pub use file::{detect_mime_from_bytes, detect_mime_type, is_banner_image};
pub use types::{ContentItem, FileContent, FileMetadata, ToolResult};
