//! `{{Field}}` substitution for letter bodies.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::row::Row;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid");
}

/// Replace every `{{Field}}` in `text` with the row's value for `Field`.
///
/// Field names are trimmed; unknown or blank fields become `""`. Substituted
/// values are not scanned again, so a value containing `{{X}}` is kept as is.
pub fn resolve(text: &str, row: &Row) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| row.get_or_empty(caps[1].trim()))
        .into_owned()
}

/// Field names referenced by `text`, in order of first appearance.
pub fn referenced_fields(text: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = caps[1].trim();
        if !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::row::CellValue;

    fn jane() -> Row {
        Row::new()
            .with("FullName", "Jane Doe")
            .with("City", "NYC")
            .with("Seats", 2_i64)
            .with("Notes", CellValue::Empty)
    }

    #[test]
    fn test_resolve_known_fields() {
        assert_eq!(
            resolve("Hi {{FullName}} from {{City}}", &jane()),
            "Hi Jane Doe from NYC"
        );
        assert_eq!(resolve("{{Seats}} seats", &jane()), "2 seats");
    }

    #[test]
    fn test_resolve_trims_field_names() {
        assert_eq!(resolve("Hi {{  FullName }}", &jane()), "Hi Jane Doe");
    }

    #[test]
    fn test_unknown_and_blank_fields_are_empty() {
        assert_eq!(resolve("[{{Country}}]", &jane()), "[]");
        assert_eq!(resolve("[{{Notes}}]", &jane()), "[]");
    }

    #[test]
    fn test_other_shapes_left_verbatim() {
        let text = "{{}} {FullName} {{FullName} {{{{";
        assert_eq!(resolve(text, &jane()), text);
    }

    #[test]
    fn test_resolution_is_not_recursive() {
        let row = Row::new().with("A", "{{B}}").with("B", "nope");
        assert_eq!(resolve("{{A}}", &row), "{{B}}");
    }

    #[test]
    fn test_resolve_is_idempotent_without_tokens() {
        let once = resolve("Dear {{FullName}},\n\nSee you.", &jane());
        assert_eq!(resolve(&once, &jane()), once);
    }

    #[test]
    fn test_referenced_fields() {
        assert_eq!(
            referenced_fields("{{ A }} {{B}} {{A}}"),
            vec!["A".to_string(), "B".to_string()]
        );
    }
}
