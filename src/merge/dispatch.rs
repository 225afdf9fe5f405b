//! Group value → template selection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::row::{Dataset, Row};

/// Number of distinct group values offered as label suggestions.
pub const MAX_SUGGESTED_VALUES: usize = 10;

const BLUE_TEMPLATE: &str = "Hello {{FullName}},\n\nWe are delighted to invite you to our upcoming event at {{Institution}}.\nWe'd be honored to see you there.\n\nWarm regards,\nEvent Team";
const GREEN_TEMPLATE: &str = "Hello {{FullName}},\n\nYou are part of Group Green. The event will take place at: {{Address}}.\nPlease confirm your attendance.\n\nBest,\nEvent Team";
const YELLOW_TEMPLATE: &str = "Hello {{FullName}},\n\nWe look forward to hosting you. Our representatives from {{Institution}} will be available for questions.\nSee you soon!\n\nBest regards,\nEvent Team";

/// A named letter body bound to one group label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Template {
    /// Stable group name, e.g. `blue`
    #[schema(example = "blue")]
    pub name: String,
    /// Group-column value that selects this template
    #[schema(example = "Blue")]
    pub label: String,
    /// Body text with `{{Field}}` placeholders
    #[schema(example = "Hi {{FullName}} from {{City}}")]
    pub body: String,
}

impl Template {
    pub fn new(name: impl Into<String>, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            body: body.into(),
        }
    }
}

/// What to do with a row whose group value matches no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Use the default template (preview).
    Fallback,
    /// Produce nothing (batch generation).
    Skip,
}

/// Ordered group templates plus the designated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTemplates {
    groups: Vec<Template>,
    default_index: usize,
}

impl Default for GroupTemplates {
    fn default() -> Self {
        Self::new(default_templates())
    }
}

impl GroupTemplates {
    /// The first group is the default until [`with_default`](Self::with_default)
    /// names another one.
    pub fn new(groups: Vec<Template>) -> Self {
        Self {
            groups,
            default_index: 0,
        }
    }

    /// Make the group called `name` the fallback. Unknown names keep the
    /// current default.
    pub fn with_default(mut self, name: &str) -> Self {
        match self.groups.iter().position(|t| t.name == name) {
            Some(index) => self.default_index = index,
            None => log::warn!("default group '{}' not found, keeping '{}'", name, self.default_name()),
        }
        self
    }

    pub fn groups(&self) -> &[Template] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn default_template(&self) -> Option<&Template> {
        self.groups.get(self.default_index)
    }

    fn default_name(&self) -> &str {
        self.default_template().map(|t| t.name.as_str()).unwrap_or("")
    }

    /// First template whose label equals `value` exactly.
    pub fn find_by_label(&self, value: &str) -> Option<&Template> {
        self.groups.iter().find(|t| t.label == value)
    }

    /// Pick the template for `row` by its `group_column` value.
    pub fn dispatch(&self, row: &Row, group_column: &str, policy: DispatchPolicy) -> Option<&Template> {
        let value = row.get_or_empty(group_column);
        match (self.find_by_label(&value), policy) {
            (Some(template), _) => Some(template),
            (None, DispatchPolicy::Fallback) => self.default_template(),
            (None, DispatchPolicy::Skip) => None,
        }
    }
}

/// The built-in `blue`, `green` and `yellow` groups.
pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new("blue", "כחול", BLUE_TEMPLATE),
        Template::new("green", "ירוק", GREEN_TEMPLATE),
        Template::new("yellow", "צהוב", YELLOW_TEMPLATE),
    ]
}

/// Distinct group values and one proposed label per requested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LabelSuggestion {
    pub values: Vec<String>,
    pub labels: Vec<String>,
}

/// Propose labels for `preferred` groups from the values found in
/// `group_column`.
///
/// The i-th label is `preferred[i]` when that value occurs in the data,
/// otherwise the i-th distinct value, otherwise `preferred[i]` unchanged.
pub fn suggest_labels(dataset: &Dataset, group_column: &str, preferred: &[&str]) -> LabelSuggestion {
    let values = dataset.distinct_values(group_column, MAX_SUGGESTED_VALUES);
    let labels = preferred
        .iter()
        .enumerate()
        .map(|(i, wanted)| {
            if values.iter().any(|v| v == wanted) {
                (*wanted).to_string()
            } else {
                values.get(i).cloned().unwrap_or_else(|| (*wanted).to_string())
            }
        })
        .collect();

    LabelSuggestion { values, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> GroupTemplates {
        GroupTemplates::new(vec![
            Template::new("A", "x", "body a"),
            Template::new("B", "y", "body b"),
        ])
    }

    fn row(group: &str) -> Row {
        Row::new().with("Group", group)
    }

    #[test]
    fn test_exact_label_match() {
        let groups = two_groups();
        let picked = groups.dispatch(&row("y"), "Group", DispatchPolicy::Skip);
        assert_eq!(picked.map(|t| t.name.as_str()), Some("B"));
    }

    #[test]
    fn test_unmatched_row_by_policy() {
        let groups = two_groups();
        assert!(groups.dispatch(&row("z"), "Group", DispatchPolicy::Skip).is_none());
        let fallback = groups.dispatch(&row("z"), "Group", DispatchPolicy::Fallback);
        assert_eq!(fallback.map(|t| t.name.as_str()), Some("A"));
    }

    #[test]
    fn test_match_is_case_and_space_sensitive() {
        let groups = two_groups();
        assert!(groups.dispatch(&row("X"), "Group", DispatchPolicy::Skip).is_none());
        assert!(groups.dispatch(&row(" x"), "Group", DispatchPolicy::Skip).is_none());
    }

    #[test]
    fn test_duplicate_labels_first_wins() {
        let groups = GroupTemplates::new(vec![
            Template::new("first", "same", "1"),
            Template::new("second", "same", "2"),
        ]);
        let picked = groups.dispatch(&row("same"), "Group", DispatchPolicy::Skip);
        assert_eq!(picked.map(|t| t.name.as_str()), Some("first"));
    }

    #[test]
    fn test_with_default() {
        let groups = two_groups().with_default("B");
        let fallback = groups.dispatch(&row("none"), "Group", DispatchPolicy::Fallback);
        assert_eq!(fallback.map(|t| t.name.as_str()), Some("B"));

        let unchanged = two_groups().with_default("missing");
        assert_eq!(unchanged.default_template().map(|t| t.name.as_str()), Some("A"));
    }

    #[test]
    fn test_numeric_group_values_use_string_form() {
        let groups = GroupTemplates::new(vec![Template::new("one", "1", "body")]);
        let numeric = Row::new().with("Group", 1_i64);
        assert!(groups.dispatch(&numeric, "Group", DispatchPolicy::Skip).is_some());
    }

    #[test]
    fn test_default_templates() {
        let groups = GroupTemplates::default();
        let names: Vec<_> = groups.groups().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["blue", "green", "yellow"]);
        assert!(groups.groups()[1].body.contains("{{Address}}"));
    }

    #[test]
    fn test_suggest_labels_prefers_known_values() {
        let dataset = Dataset::from_rows(vec![
            Row::new().with("Group", "צהוב"),
            Row::new().with("Group", "Alpha"),
            Row::new().with("Group", "Beta"),
        ]);

        let suggestion = suggest_labels(&dataset, "Group", &["כחול", "ירוק", "צהוב"]);
        assert_eq!(suggestion.values, ["Alpha", "Beta", "צהוב"]);
        assert_eq!(suggestion.labels, ["Alpha", "Beta", "צהוב"]);
    }

    #[test]
    fn test_suggest_labels_without_values() {
        let suggestion = suggest_labels(&Dataset::default(), "Group", &["כחול", "ירוק"]);
        assert!(suggestion.values.is_empty());
        assert_eq!(suggestion.labels, ["כחול", "ירוק"]);
    }
}
