//! Detection of form fields without an accessible label.

use std::collections::HashSet;

use crate::document::{attr, non_blank_attr, non_empty_attr, outer_html, Document};

use super::{Issue, IssueDetail, RuleError};

const FIELDS: &str = r#"input:not([type="hidden"]), textarea, select"#;

/// Flag every visible form field that has no associated `<label for>`,
/// no `aria-label` and no `aria-labelledby`.
pub fn detect_missing_form_labels(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    let label_targets: HashSet<&str> = doc
        .select("label[for]")?
        .iter()
        .filter_map(|label| attr(label, "for"))
        .collect();

    let mut issues = Vec::new();
    for field in doc.select(FIELDS)? {
        let has_label = non_blank_attr(&field, "id").is_some_and(|id| label_targets.contains(id));
        let has_aria_label = non_empty_attr(&field, "aria-label").is_some();
        let has_aria_labelledby = non_empty_attr(&field, "aria-labelledby").is_some();

        if has_label || has_aria_label || has_aria_labelledby {
            continue;
        }

        issues.push(Issue::new(
            IssueDetail::MissingFormLabel {
                input_type: non_blank_attr(&field, "type").unwrap_or("text").to_string(),
                input_name: non_blank_attr(&field, "name")
                    .unwrap_or("unnamed")
                    .to_string(),
            },
            outer_html(&field),
        ));
    }
    Ok(issues)
}
