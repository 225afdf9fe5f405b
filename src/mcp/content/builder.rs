//! Fluent construction of tool results.

use super::types::{ContentItem, FileContent, ToolResult};

#[derive(Debug, Default)]
pub struct ContentBuilder {
    items: Vec<ContentItem>,
    is_error: bool,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, message: impl Into<String>) -> Self {
        self.items.push(ContentItem::text(message));
        self
    }

    /// Pretty-printed JSON as a text item.
    pub fn json(self, value: &serde_json::Value) -> Self {
        let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        self.text(rendered)
    }

    pub fn file(mut self, file: FileContent) -> Self {
        self.items.push(ContentItem::resource(file));
        self
    }

    pub fn docx(self, data: &[u8], filename: &str) -> Self {
        self.file(FileContent::docx(filename, data))
    }

    pub fn zip(self, data: &[u8], filename: &str) -> Self {
        self.file(FileContent::zip(filename, data))
    }

    pub fn error(mut self) -> Self {
        self.is_error = true;
        self
    }

    pub fn build(self) -> ToolResult {
        ToolResult {
            content: self.items,
            is_error: self.is_error,
        }
    }
}
