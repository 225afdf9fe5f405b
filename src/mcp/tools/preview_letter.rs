//! Tool definition for rendering a single letter.

use serde_json::{json, Value};

use super::registry::ToolDescriptor;

pub const TOOL_NAME: &str = "preview_letter";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: concat!(
            "Render the letter for one row of a dataset as a .docx document. ",
            "The row's group column value picks the template; when no label matches, ",
            "the default group is used. Returns the resolved body, the filename and the document."
        )
        .to_string(),
        input_schema: input_schema(),
    }
}

fn input_schema() -> Value {
    let mut schema = super::job_schema();
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert(
            "row_index".to_string(),
            json!({ "type": "integer", "minimum": 0, "description": "Zero-based row to render (default 0)" }),
        );
    }
    schema
}
