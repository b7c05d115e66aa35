//! Detection of heading problems: no headings, or skipped levels.

use serde::{Deserialize, Serialize};

use crate::document::{outer_html, tag_name, Document};

use super::{Issue, IssueDetail, RuleError};

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// How many skipped-level violations to report per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingMode {
    /// Stop at the first skipped level.
    #[default]
    First,
    /// Report every skipped level.
    All,
}

/// Flag a document without headings, or headings that skip levels
/// going deeper (h2 -> h4). Going back up any number of levels is fine.
pub fn detect_heading_structure(doc: &Document, mode: HeadingMode) -> Result<Vec<Issue>, RuleError> {
    let headings = doc.select(HEADINGS)?;
    if headings.is_empty() {
        return Ok(vec![Issue::new(IssueDetail::MissingHeadings, "<body>")]);
    }

    let mut issues = Vec::new();
    for pair in headings.windows(2) {
        let previous_level = heading_level(tag_name(&pair[0]));
        let level = heading_level(tag_name(&pair[1]));
        if level > previous_level + 1 {
            issues.push(Issue::new(
                IssueDetail::ImproperHeadingStructure {
                    previous_level,
                    level,
                },
                outer_html(&pair[1]),
            ));
            if mode == HeadingMode::First {
                break;
            }
        }
    }
    Ok(issues)
}

/// Numeric level of an `h1`..`h6` tag name.
fn heading_level(tag: &str) -> u8 {
    tag.as_bytes()
        .get(1)
        .filter(|b| (b'1'..=b'6').contains(*b))
        .map(|b| b - b'0')
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{IssueType, Severity};

    fn run(html: &str, mode: HeadingMode) -> Vec<Issue> {
        detect_heading_structure(&Document::parse(html), mode).unwrap()
    }

    #[test]
    fn test_no_headings() {
        let issues = run("<p>text only</p>", HeadingMode::First);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type(), IssueType::MissingHeadings);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_skipped_level_points_at_deeper_heading() {
        let issues = run("<h1>A</h1><h2>B</h2><h4>D</h4>", HeadingMode::First);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].element, "<h4>D</h4>");
        assert_eq!(
            issues[0].detail,
            IssueDetail::ImproperHeadingStructure {
                previous_level: 2,
                level: 4
            }
        );
    }

    #[test]
    fn test_sequential_levels_are_fine() {
        assert!(run("<h1>A</h1><h2>B</h2><h3>C</h3><h4>D</h4>", HeadingMode::First).is_empty());
    }

    #[test]
    fn test_moving_back_up_is_fine() {
        assert!(run("<h1>A</h1><h2>B</h2><h3>C</h3><h2>E</h2><h1>F</h1>", HeadingMode::All).is_empty());
    }

    #[test]
    fn test_first_mode_reports_one_all_mode_reports_each() {
        let html = "<h1>A</h1><h3>C</h3><h3>C2</h3><h6>F</h6>";
        assert_eq!(run(html, HeadingMode::First).len(), 1);
        let all = run(html, HeadingMode::All);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].element, "<h6>F</h6>");
    }

    #[test]
    fn test_headings_nested_in_other_elements() {
        let html = "<header><h1>A</h1></header><main><section><h3>C</h3></section></main>";
        assert_eq!(run(html, HeadingMode::First).len(), 1);
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), 1);
        assert_eq!(heading_level("h6"), 6);
    }
}
