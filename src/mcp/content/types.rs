//! Content types shared by MCP tool results and HTTP responses.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::merge::batch::ZIP_MIME;
use crate::merge::docx::DOCX_MIME;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[schema(example = "Jane Doe.docx")]
    pub filename: String,
    #[schema(example = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    pub mime_type: String,
    pub size_bytes: usize,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl FileMetadata {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, size_bytes: usize) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            size_bytes,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A generated file with its bytes base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub metadata: FileMetadata,
    /// Base64 (standard alphabet, padded)
    pub data: String,
}

impl FileContent {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, data: &[u8]) -> Self {
        Self {
            metadata: FileMetadata::new(filename, mime_type, data.len()),
            data: BASE64.encode(data),
        }
    }

    pub fn docx(filename: impl Into<String>, data: &[u8]) -> Self {
        Self::new(filename, DOCX_MIME, data)
    }

    pub fn zip(filename: impl Into<String>, data: &[u8]) -> Self {
        Self::new(filename, ZIP_MIME, data)
    }

    pub fn decode_data(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.data)
    }
}

/// Content item in a tool result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 payload of a resource item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: Some(text.into()),
            data: None,
            mime_type: None,
            metadata: None,
        }
    }

    pub fn resource(file: FileContent) -> Self {
        Self {
            content_type: "resource".to_string(),
            text: Some(format!("Generated file: {}", file.metadata.filename)),
            data: Some(file.data),
            mime_type: Some(file.metadata.mime_type.clone()),
            metadata: Some(file.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: Vec<ContentItem>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: true,
        }
    }

    pub fn success_text(message: impl Into<String>) -> Self {
        Self::success(vec![ContentItem::text(message)])
    }

    /// First text item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|item| item.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_content_docx() {
        let file = FileContent::docx("Jane Doe.docx", b"PK\x03\x04docx");

        assert_eq!(file.metadata.filename, "Jane Doe.docx");
        assert_eq!(file.metadata.mime_type, DOCX_MIME);
        assert_eq!(file.metadata.size_bytes, 8);
        assert!(!file.metadata.created_at.is_empty());
        assert_eq!(file.decode_data().unwrap(), b"PK\x03\x04docx");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let file = FileContent::zip("letters_output.zip", b"zip");
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["metadata"]["mimeType"], "application/zip");
        assert_eq!(json["metadata"]["sizeBytes"], 3);
    }

    #[test]
    fn test_resource_item() {
        let item = ContentItem::resource(FileContent::zip("out.zip", b"data"));

        assert_eq!(item.content_type, "resource");
        assert!(item.text.unwrap().contains("out.zip"));
        assert_eq!(item.mime_type.as_deref(), Some("application/zip"));
        assert!(item.metadata.is_some());
    }

    #[test]
    fn test_tool_result_error_serializes_flag() {
        let result = ToolResult::error("Something went wrong");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["isError"], true);
        assert_eq!(result.first_text(), Some("Something went wrong"));
    }
}
