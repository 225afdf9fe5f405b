//! Tool definition for generating the whole batch.

use super::registry::ToolDescriptor;

pub const TOOL_NAME: &str = "generate_letters";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: concat!(
            "Generate one .docx letter per dataset row and return them as letters_output.zip. ",
            "Rows whose group value matches no template label are skipped and listed in the summary. ",
            "Before calling, make sure the group column exists and the labels match the data; ",
            "do not invent rows."
        )
        .to_string(),
        input_schema: super::job_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let desc = descriptor();
        assert_eq!(desc.name, TOOL_NAME);
        assert!(desc.description.contains("letters_output.zip"));
        assert!(desc.input_schema["properties"]["groups"].is_object());
        assert!(desc.input_schema["properties"].get("row_index").is_none());
    }
}
