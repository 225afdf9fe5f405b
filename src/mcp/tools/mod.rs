//! MCP tools exposed via JSON-RPC.
//!
//! Each tool file provides its name and descriptor; the registry parses
//! arguments and runs them against the letter service.

mod generate_letters;
mod preview_letter;
pub mod registry;

pub use registry::{ToolDescriptor, ToolRegistry};

use serde_json::{json, Value};

/// Input schema shared by both tools: the letter job request.
fn job_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "rows": {
                "type": "array",
                "description": "Dataset rows; each maps column name to a string, number, boolean or null",
                "items": { "type": "object" }
            },
            "columns": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Column order (optional)"
            },
            "group_column": { "type": "string", "description": "Column holding the group value (default 'Group')" },
            "groups": {
                "type": "array",
                "description": "Templates; body placeholders use {{Column}}. Defaults to blue/green/yellow",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "label": { "type": "string", "description": "Group value that selects this template" },
                        "body": { "type": "string" }
                    },
                    "required": ["name", "label", "body"]
                }
            },
            "default_group": { "type": "string", "description": "Template name used by previews of unmatched rows" },
            "layout": {
                "type": "object",
                "description": "Font, salutation, header fields, margins (inches), banner placement, direction (ltr/rtl) and page size (letter/a4)",
                "properties": {
                    "font_name": { "type": "string" },
                    "font_size": { "type": "integer", "minimum": 8, "maximum": 24 },
                    "salutation": { "type": "string" },
                    "header_fields": { "type": "array", "items": { "type": "string" } },
                    "margins": {
                        "type": "object",
                        "properties": {
                            "top": { "type": "number" },
                            "bottom": { "type": "number" },
                            "left": { "type": "number" },
                            "right": { "type": "number" }
                        }
                    },
                    "edge_to_edge": { "type": "boolean" },
                    "gap": { "type": "number", "description": "Inches between a banner and the body" },
                    "direction": { "type": "string", "enum": ["ltr", "rtl"] },
                    "page_size": { "type": "string", "enum": ["letter", "a4"] }
                }
            },
            "filename_pattern": { "type": "string", "description": "Filename pattern with {Column} fields (default '{FullName} - {Group}')" },
            "identifier_field": { "type": "string", "description": "Column naming a row in skip reports (default 'FullName')" },
            "banners": {
                "type": "object",
                "description": "Base64 PNG/JPEG banners for the page header and footer",
                "properties": {
                    "top": { "type": "string" },
                    "bottom": { "type": "string" }
                }
            }
        },
        "required": ["rows"]
    })
}
