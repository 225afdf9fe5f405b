//! Tool registry - central routing for MCP tools.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::letters::models::{LetterJobRequest, PreviewLetterRequest};
use crate::letters::{LetterError, LetterService};
use crate::mcp::content::{ContentBuilder, ToolResult};
use crate::merge::batch::ARCHIVE_FILENAME;

use super::generate_letters;
use super::preview_letter;

/// Tool descriptor conforming to MCP specification.
#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Central registry for all MCP tools.
pub struct ToolRegistry {
    letters: LetterService,
}

impl ToolRegistry {
    pub fn new(letters: LetterService) -> Self {
        Self { letters }
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        vec![preview_letter::descriptor(), generate_letters::descriptor()]
    }

    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match name {
            preview_letter::TOOL_NAME => self.call_preview_letter(arguments),
            generate_letters::TOOL_NAME => self.call_generate_letters(arguments),
            _ => ToolResult::error(format!(
                "Tool '{}' is not available. Available tools: {}, {}",
                name,
                preview_letter::TOOL_NAME,
                generate_letters::TOOL_NAME
            )),
        }
    }

    fn call_preview_letter(&self, arguments: Option<Value>) -> ToolResult {
        let request = match parse_arguments::<PreviewLetterRequest>(arguments) {
            Ok(req) => req,
            Err(err) => return ToolResult::error(err),
        };

        match self.letters.preview(request) {
            Ok(preview) => {
                let summary = format!(
                    "Letter '{}' rendered with template '{}'.\n\n{}",
                    preview.filename, preview.template, preview.body
                );
                ContentBuilder::new()
                    .text(summary)
                    .file(preview.document)
                    .build()
            }
            Err(err) => failure(err),
        }
    }

    fn call_generate_letters(&self, arguments: Option<Value>) -> ToolResult {
        let request = match parse_arguments::<LetterJobRequest>(arguments) {
            Ok(req) => req,
            Err(err) => return ToolResult::error(err),
        };

        match self.letters.generate(request) {
            Ok(report) => {
                let response = report.into_response();
                let summary = json!({
                    "job_id": response.job_id,
                    "created": response.created,
                    "skipped": response.skipped,
                    "entries": response.entries,
                });
                ContentBuilder::new()
                    .text(format!(
                        "Created {} letters in {} ({} skipped).",
                        response.created,
                        ARCHIVE_FILENAME,
                        response.skipped.len()
                    ))
                    .json(&summary)
                    .file(response.archive)
                    .build()
            }
            Err(err) => failure(err),
        }
    }
}

fn failure(err: LetterError) -> ToolResult {
    if !err.is_client_error() {
        log::error!("tool call failed: {}", err);
    }
    ToolResult::error(format!("Could not create letters: {}", err))
}

fn parse_arguments<T: for<'de> Deserialize<'de>>(arguments: Option<Value>) -> Result<T, String> {
    let value = arguments.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| format!("Invalid arguments: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::BannerFallback;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(LetterService::new(BannerFallback::none()))
    }

    #[test]
    fn test_lists_both_tools() {
        let names: Vec<String> = registry().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["preview_letter", "generate_letters"]);
    }

    #[test]
    fn test_unknown_tool() {
        let result = registry().call_tool("send_email", None);
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("preview_letter"));
    }

    #[test]
    fn test_missing_arguments() {
        let result = registry().call_tool(generate_letters::TOOL_NAME, None);
        assert!(result.is_error);
        assert!(result.first_text().unwrap().starts_with("Invalid arguments"));
    }

    #[test]
    fn test_preview_returns_docx() {
        let args = json!({
            "rows": [{ "FullName": "Jane Doe", "Group": "כחול", "Institution": "NYU" }],
            "filename_pattern": "{FullName}"
        });
        let result = registry().call_tool(preview_letter::TOOL_NAME, Some(args));

        assert!(!result.is_error, "{:?}", result.first_text());
        assert!(result.first_text().unwrap().contains("event at NYU"));
        let file = result.content[1].metadata.as_ref().unwrap();
        assert_eq!(file.filename, "Jane Doe.docx");
    }

    #[test]
    fn test_generate_reports_skips() {
        let args = json!({
            "rows": [
                { "FullName": "Jane Doe", "Group": "Purple" },
                { "FullName": "John Roe", "Group": "צהוב" }
            ]
        });
        let result = registry().call_tool(generate_letters::TOOL_NAME, Some(args));

        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("Created 1 letters in letters_output.zip (1 skipped)."));
        assert!(result.content[1].text.as_ref().unwrap().contains("\"identifier\": \"Jane Doe\""));
        assert_eq!(result.content[2].metadata.as_ref().unwrap().filename, "letters_output.zip");
    }

    #[test]
    fn test_precondition_failure_is_tool_error() {
        let result = registry().call_tool(generate_letters::TOOL_NAME, Some(json!({ "rows": [] })));
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("no dataset loaded"));
    }
}
