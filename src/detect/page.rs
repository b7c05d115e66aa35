//! Document-level checks: page title and language.

use crate::document::{non_empty_attr, text_content, Document};

use super::{Issue, IssueDetail, RuleError};

/// Flag once when `<title>` is absent or blank.
pub fn detect_missing_page_title(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    let has_title = doc
        .select("title")?
        .first()
        .is_some_and(|title| !text_content(title).is_empty());
    if has_title {
        return Ok(Vec::new());
    }
    Ok(vec![Issue::new(
        IssueDetail::MissingPageTitle,
        "<title></title>",
    )])
}

/// Flag once when the root `<html>` element has no `lang`.
pub fn detect_missing_lang_attribute(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    if non_empty_attr(&doc.root(), "lang").is_some() {
        return Ok(Vec::new());
    }
    Ok(vec![Issue::new(IssueDetail::MissingLangAttribute, "<html>")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Severity;

    #[test]
    fn test_title_present() {
        let doc = Document::parse("<html><head><title>Shop</title></head></html>");
        assert!(detect_missing_page_title(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_title_blank_or_absent() {
        for html in [
            "<html><head><title>   </title></head></html>",
            "<html><head></head></html>",
        ] {
            let issues = detect_missing_page_title(&Document::parse(html)).unwrap();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].severity, Severity::High);
            assert_eq!(issues[0].element, "<title></title>");
        }
    }

    #[test]
    fn test_lang_attribute() {
        let with_lang = Document::parse(r#"<html lang="de"><body></body></html>"#);
        assert!(detect_missing_lang_attribute(&with_lang).unwrap().is_empty());

        let without = Document::parse("<html><body></body></html>");
        let issues = detect_missing_lang_attribute(&without).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);

        let empty = Document::parse(r#"<html lang=""><body></body></html>"#);
        assert_eq!(detect_missing_lang_attribute(&empty).unwrap().len(), 1);

        let whitespace = Document::parse(r#"<html lang=" "><body></body></html>"#);
        assert!(detect_missing_lang_attribute(&whitespace).unwrap().is_empty());
    }
}
