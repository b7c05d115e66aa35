//! Detection of images without alternative text.

use crate::document::{attr, outer_html, Document};

use super::{Issue, IssueDetail, RuleError};

/// Flag every `<img>` that has no `alt` attribute.
///
/// `alt=""` is the decorative-image marker and is not flagged.
pub fn detect_missing_alt_text(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    let issues = doc
        .select("img")?
        .into_iter()
        .filter(|img| attr(img, "alt").is_none())
        .map(|img| {
            Issue::new(
                IssueDetail::MissingAltText {
                    src: attr(&img, "src").map(str::to_string),
                },
                outer_html(&img),
            )
        })
        .collect();
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{IssueType, Severity};

    fn run(html: &str) -> Vec<Issue> {
        detect_missing_alt_text(&Document::parse(html)).unwrap()
    }

    #[test]
    fn test_flags_each_image_without_alt() {
        let issues = run(r#"<img src="a.png"><img src="b.png"><img src="c.png" alt="C">"#);
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|i| i.issue_type() == IssueType::MissingAltText && i.severity == Severity::High));
        assert_eq!(
            issues[0].detail,
            IssueDetail::MissingAltText {
                src: Some("a.png".to_string())
            }
        );
    }

    #[test]
    fn test_empty_alt_is_decorative() {
        assert!(run(r#"<img src="spacer.gif" alt="">"#).is_empty());
    }

    #[test]
    fn test_image_without_src() {
        let issues = run("<img>");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].detail, IssueDetail::MissingAltText { src: None });
        assert!(issues[0].element.starts_with("<img"));
    }
}
