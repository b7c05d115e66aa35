//! Detection of link problems: empty links and a missing skip link.

use crate::document::{attr, non_empty_attr, outer_html, text_content, Document};

use super::{Issue, IssueDetail, RuleError};

const SKIP_LINK_TARGETS: &str = r##"a[href="#main"], a[href="#content"], a[href^="#skip"]"##;

/// Flag anchors with an `href` but no text and no `aria-label`.
pub fn detect_empty_links(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    let issues = doc
        .select("a[href]")?
        .into_iter()
        .filter(|link| text_content(link).is_empty() && non_empty_attr(link, "aria-label").is_none())
        .map(|link| {
            Issue::new(
                IssueDetail::EmptyLink {
                    href: attr(&link, "href").unwrap_or_default().to_string(),
                },
                outer_html(&link),
            )
        })
        .collect();
    Ok(issues)
}

/// Flag the page once when no anchor jumps to the main content.
pub fn detect_missing_skip_link(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    if doc.exists(SKIP_LINK_TARGETS)? {
        return Ok(Vec::new());
    }
    Ok(vec![Issue::new(
        IssueDetail::MissingSkipLink,
        "<body>",
    )])
}
