//! Request validation for merge jobs.
//!
//! Every problem is collected before any letter is composed so the caller
//! gets one complete report, readable by people and by AI clients alike.

use std::fmt;

use super::dispatch::Template;
use super::layout::{LayoutConfig, Length};

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 24;
pub const MAX_MARGIN_IN: f64 = 5.0;
pub const MAX_GAP_IN: f64 = 5.0;

/// Validation error with a field path, a message and an optional fix.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `layout.margins.left`
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Provide a value for {}", label.to_lowercase()))
    }

    pub fn out_of_range(field: &str, label: &str, min: f64, max: f64) -> Self {
        Self::new(field, format!("{} must be between {} and {}", label, min, max))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Numbered report of every error.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} problem(s) found\n",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Finite and within `[min, max]`.
pub fn validate_inches(value: f64, field: &str, label: &str, max: f64, errors: &mut ValidationErrors) {
    if !value.is_finite() || !(0.0..=max).contains(&value) {
        errors.add(
            ValidationError::out_of_range(field, label, 0.0, max)
                .with_suggestion("Use a value in inches, e.g. 1.0"),
        );
    }
}

pub fn validate_font_size(value: u32, field: &str, errors: &mut ValidationErrors) {
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&value) {
        errors.add(ValidationError::out_of_range(
            field,
            "Font size",
            f64::from(MIN_FONT_SIZE),
            f64::from(MAX_FONT_SIZE),
        ));
    }
}

pub fn validate_layout(layout: &LayoutConfig, errors: &mut ValidationErrors) {
    validate_required(&layout.font_name, "layout.font_name", "Font name", errors);
    validate_font_size(layout.font_size, "layout.font_size", errors);

    let margins = &layout.margins;
    for (value, name) in [
        (margins.top, "top"),
        (margins.right, "right"),
        (margins.bottom, "bottom"),
        (margins.left, "left"),
    ] {
        validate_inches(
            value,
            &format!("layout.margins.{name}"),
            &format!("{name} margin"),
            MAX_MARGIN_IN,
            errors,
        );
    }
    validate_inches(layout.gap, "layout.gap", "Banner gap", MAX_GAP_IN, errors);

    let horizontal = Length::from_inches(margins.left) + Length::from_inches(margins.right);
    if horizontal >= layout.page_size.width() {
        errors.add(
            ValidationError::new(
                "layout.margins",
                "Left and right margins leave no room for text",
            )
            .with_suggestion(format!(
                "Keep left + right below {:.2} inches",
                layout.page_size.width().inches()
            )),
        );
    }

    for (i, field) in layout.header_fields.iter().enumerate() {
        validate_required(field, &format!("layout.header_fields[{i}]"), "Header field", errors);
    }
}

pub fn validate_groups(groups: &[Template], default_group: Option<&str>, errors: &mut ValidationErrors) {
    if groups.is_empty() {
        errors.add(
            ValidationError::new("groups", "At least one group template is required")
                .with_suggestion("Omit `groups` to use the built-in blue/green/yellow templates"),
        );
        return;
    }

    for (i, group) in groups.iter().enumerate() {
        validate_required(&group.name, &format!("groups[{i}].name"), "Group name", errors);
    }

    if let Some(name) = default_group {
        if !groups.iter().any(|g| g.name == name) {
            let known: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
            errors.add(
                ValidationError::new("default_group", format!("Unknown group '{}'", name))
                    .with_suggestion(format!("Use one of: {}", known.join(", "))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::dispatch::default_templates;
    use crate::merge::layout::Margins;

    #[test]
    fn test_default_layout_is_valid() {
        let mut errors = ValidationErrors::new();
        validate_layout(&LayoutConfig::default(), &mut errors);
        assert!(errors.is_empty(), "{}", errors.to_message());
    }

    #[test]
    fn test_layout_problems_are_collected() {
        let mut layout = LayoutConfig::default();
        layout.font_size = 30;
        layout.gap = -1.0;
        layout.margins = Margins {
            top: f64::NAN,
            right: 1.0,
            bottom: 6.0,
            left: 1.0,
        };

        let mut errors = ValidationErrors::new();
        validate_layout(&layout, &mut errors);

        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            ["layout.font_size", "layout.margins.top", "layout.margins.bottom", "layout.gap"]
        );
    }

    #[test]
    fn test_horizontal_margins_must_leave_room() {
        let layout = LayoutConfig::default().with_margins(Margins {
            top: 1.0,
            right: 4.5,
            bottom: 1.0,
            left: 4.5,
        });
        let mut errors = ValidationErrors::new();
        validate_layout(&layout, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "layout.margins");
    }

    #[test]
    fn test_groups_validation() {
        let mut errors = ValidationErrors::new();
        validate_groups(&[], None, &mut errors);
        assert_eq!(errors.len(), 1);

        let mut errors = ValidationErrors::new();
        validate_groups(&default_templates(), Some("purple"), &mut errors);
        let message = errors.to_message();
        assert!(message.contains("[default_group] Unknown group 'purple'"));
        assert!(message.contains("blue, green, yellow"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("group_column", "Group column"));
        let err = errors.into_result().unwrap_err();
        assert!(err.contains("1. [group_column] Group column must not be empty"));
    }
}
