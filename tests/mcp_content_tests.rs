use mailmerge_server::mcp::content::{
    detect_mime_type, ContentBuilder, ContentItem, FileContent, ToolResult,
};
use mailmerge_server::ErrorResponse;
use serde_json::Value;

#[test]
fn test_tool_result_wire_format() {
    let result = ContentBuilder::new()
        .text("Created 2 letters")
        .zip(b"PK\x03\x04", "letters_output.zip")
        .build();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["isError"], false);
    assert_eq!(value["content"][0]["type"], "text");
    assert_eq!(value["content"][1]["type"], "resource");
    assert_eq!(value["content"][1]["mimeType"], "application/zip");
    assert_eq!(value["content"][1]["metadata"]["sizeBytes"], 4);
    assert_eq!(value["content"][1]["data"], "UEsDBA==");
}

#[test]
fn test_file_content_decodes_back() {
    let file = FileContent::docx("Jane Doe.docx", b"docx bytes");
    assert_eq!(file.metadata.mime_type, detect_mime_type("Jane Doe.docx"));
    assert_eq!(file.decode_data().unwrap(), b"docx bytes");

    let item = ContentItem::resource(file);
    assert_eq!(item.text.as_deref(), Some("Generated file: Jane Doe.docx"));
}

#[test]
fn test_error_result() {
    let result = ToolResult::error("Could not create letters: no dataset loaded");
    let value: Value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["isError"], true);
    assert_eq!(result.first_text(), Some("Could not create letters: no dataset loaded"));
}

#[test]
fn test_error_response_round_trips() {
    let error = ErrorResponse::bad_request("Validation failed: 1 problem(s) found");
    let json = serde_json::to_string(&error).unwrap();
    let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.error, "BadRequest");
    assert_eq!(parsed.message, error.message);
    assert!(chrono::DateTime::parse_from_rfc3339(&parsed.timestamp).is_ok());
    assert_eq!(ErrorResponse::not_found("x").error, "NotFound");
    assert_eq!(ErrorResponse::internal_error("x").error, "InternalServerError");
}
