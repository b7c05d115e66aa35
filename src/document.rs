//! Queryable HTML document model.
//!
//! Thin adapter over `scraper` exposing only what the rules need:
//! CSS selection in document order, attributes, text content, tag names,
//! outer markup, and ancestor walks.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors raised while querying a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

/// A parsed HTML document.
///
/// Parsing never fails: malformed markup is recovered the way browsers do.
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching a selector group, in document order.
    pub fn select(&self, selectors: &str) -> Result<Vec<ElementRef<'_>>, DocumentError> {
        let selector = compile(selectors)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Whether any element matches the selector group.
    pub fn exists(&self, selectors: &str) -> Result<bool, DocumentError> {
        let selector = compile(selectors)?;
        let found = self.html.select(&selector).next().is_some();
        Ok(found)
    }

    /// The `<html>` root element.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

/// Compile a selector group, keeping the parser's message as a string.
pub fn compile(selectors: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selectors).map_err(|e| DocumentError::Selector {
        selector: selectors.to_string(),
        message: format!("{:?}", e),
    })
}

/// Lowercase tag name of an element.
pub fn tag_name<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().name()
}

/// Attribute value, if the attribute is present (possibly empty).
pub fn attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// Attribute value when present and not the empty string.
pub fn non_empty_attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    attr(el, name).filter(|v| !v.is_empty())
}

/// Attribute value when present and non-blank.
pub fn non_blank_attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    attr(el, name).filter(|v| !v.trim().is_empty())
}

/// Concatenated descendant text, trimmed.
pub fn text_content(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Serialized markup of the element including its children.
pub fn outer_html(el: &ElementRef<'_>) -> String {
    el.html()
}

/// The element followed by its element ancestors, innermost first.
pub fn self_and_ancestors<'a>(el: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut chain = vec![*el];
    chain.extend(el.ancestors().filter_map(ElementRef::wrap));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title> Home </title></head>
<body>
  <div id="outer" style="background-color: #000">
    <p id="inner">Hello <b>world</b></p>
  </div>
  <img src="a.png" alt="">
</body>
</html>"#;

    #[test]
    fn test_select_in_document_order() {
        let doc = Document::parse(PAGE);
        let els = doc.select("p, div").unwrap();
        let ids: Vec<_> = els.iter().filter_map(|e| attr(e, "id")).collect();
        assert_eq!(ids, vec!["outer", "inner"]);
    }

    #[test]
    fn test_text_content_is_trimmed_and_joined() {
        let doc = Document::parse(PAGE);
        let title = doc.select("title").unwrap();
        assert_eq!(text_content(&title[0]), "Home");
        let p = doc.select("#inner").unwrap();
        assert_eq!(text_content(&p[0]), "Hello world");
    }

    #[test]
    fn test_empty_attribute_is_present() {
        let doc = Document::parse(PAGE);
        let img = doc.select("img").unwrap();
        assert_eq!(attr(&img[0], "alt"), Some(""));
        assert_eq!(non_blank_attr(&img[0], "alt"), None);
        assert_eq!(non_empty_attr(&img[0], "alt"), None);
        assert_eq!(attr(&img[0], "title"), None);
    }

    #[test]
    fn test_root_is_html_element() {
        let doc = Document::parse(PAGE);
        assert_eq!(tag_name(&doc.root()), "html");
        assert_eq!(attr(&doc.root(), "lang"), Some("en"));
    }

    #[test]
    fn test_ancestor_chain() {
        let doc = Document::parse(PAGE);
        let p = doc.select("#inner").unwrap();
        let names: Vec<_> = self_and_ancestors(&p[0]).iter().map(tag_name).collect();
        assert_eq!(names, vec!["p", "div", "body", "html"]);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = Document::parse(PAGE);
        let err = doc.select("a[").unwrap_err();
        assert!(matches!(err, DocumentError::Selector { .. }));
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let doc = Document::parse("<p>unclosed <a href=x>link");
        assert!(doc.exists("a[href]").unwrap());
    }
}
