//! Prompt text and fixed-code templates per issue type.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::detect::{Issue, IssueDetail, IssueType};

use super::Suggestion;

/// Token budget for one-line suggestions.
pub const SHORT_SUGGESTION_TOKENS: u32 = 30;
/// Token budget for alt text suggestions.
pub const ALT_TEXT_TOKENS: u32 = 50;
/// Token budget for explanations.
pub const EXPLANATION_TOKENS: u32 = 100;

static EXISTING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sid\s*=\s*"([^"]+)""#).expect("valid id regex"));

static HEADING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(</?)[hH][1-6]").expect("valid heading regex"));

static COLOR_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([;"'\s])color\s*:\s*[^;"']+"#).expect("valid color regex")
});

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub max_tokens: u32,
}

impl Prompt {
    fn new(text: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            text: text.into(),
            max_tokens,
        }
    }
}

/// Which suggestion field a generated answer fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    AltText,
    Label,
    LinkText,
}

impl SuggestionKind {
    pub fn wrap(self, text: String) -> Suggestion {
        match self {
            SuggestionKind::AltText => Suggestion::AltText(text),
            SuggestionKind::Label => Suggestion::Label(text),
            SuggestionKind::LinkText => Suggestion::LinkText(text),
        }
    }
}

/// Prompt for the type-specific suggestion, if the type has one.
pub fn suggestion_prompt(detail: &IssueDetail) -> Option<(SuggestionKind, Prompt)> {
    match detail {
        IssueDetail::MissingAltText { src } => Some((
            SuggestionKind::AltText,
            Prompt::new(
                format!(
                    "Generate descriptive alt text for an image with src=\"{}\". The alt text should be concise (under 125 characters) and describe what the image shows. Only return the alt text, nothing else.",
                    src.as_deref().unwrap_or("")
                ),
                ALT_TEXT_TOKENS,
            ),
        )),
        IssueDetail::MissingFormLabel {
            input_type,
            input_name,
        } => Some((
            SuggestionKind::Label,
            Prompt::new(
                format!(
                    "Generate a clear, descriptive label for a form input of type \"{}\" with name \"{}\". Only return the label text, nothing else.",
                    input_type, input_name
                ),
                SHORT_SUGGESTION_TOKENS,
            ),
        )),
        IssueDetail::EmptyLink { href } => Some((
            SuggestionKind::LinkText,
            Prompt::new(
                format!(
                    "Generate descriptive link text for a link with href=\"{}\". The text should clearly indicate where the link goes. Only return the link text, nothing else.",
                    href
                ),
                SHORT_SUGGESTION_TOKENS,
            ),
        )),
        _ => None,
    }
}

/// Prompt asking why the issue matters.
pub fn explanation_prompt(issue_type: IssueType) -> Prompt {
    let text = match issue_type {
        IssueType::MissingAltText => "Explain in simple terms why alt text is important for web accessibility. Keep it under 100 words and focus on how it helps users with visual impairments.",
        IssueType::MissingFormLabel => "Explain why form labels are crucial for accessibility. Keep it under 100 words and focus on screen reader users.",
        IssueType::EmptyLink => "Explain why links need descriptive text for accessibility. Keep it under 100 words.",
        IssueType::MissingHeadings => "Explain why proper heading structure (h1, h2, h3, etc.) is important for web accessibility. Keep it under 100 words.",
        IssueType::ImproperHeadingStructure => "Explain why heading levels shouldn't skip numbers (like going from h2 to h4). Keep it under 100 words.",
        IssueType::MissingPageTitle => "Explain why every web page needs a descriptive title element. Keep it under 100 words.",
        IssueType::MissingLangAttribute => "Explain why the html element needs a lang attribute for accessibility. Keep it under 100 words.",
        IssueType::LowContrast => "Explain why text needs sufficient color contrast against its background for accessibility. Keep it under 100 words and mention users with low vision.",
        IssueType::MissingSkipLink => "Explain why pages should offer a skip link to the main content for keyboard users. Keep it under 100 words.",
    };
    Prompt::new(text, EXPLANATION_TOKENS)
}

/// Corrected markup for an issue, using the suggestion where one exists.
pub fn fixed_code(issue: &Issue, suggestion: Option<&Suggestion>) -> String {
    let suggested = suggestion.map(Suggestion::text);
    match &issue.detail {
        IssueDetail::MissingAltText { .. } => {
            let alt = suggested.unwrap_or("Descriptive alt text");
            insert_attribute(&issue.element, &format!("alt=\"{}\"", escape_attr(alt)))
        }
        IssueDetail::MissingFormLabel { input_name, .. } => {
            let label = suggested.unwrap_or("Input Label");
            let (id, field) = match EXISTING_ID.captures(start_tag(&issue.element)) {
                Some(caps) => (caps[1].to_string(), issue.element.clone()),
                None => {
                    let id = label_target_id(input_name);
                    let field = insert_attribute(&issue.element, &format!("id=\"{}\"", id));
                    (id, field)
                }
            };
            format!("<label for=\"{}\">{}</label>\n{}", id, escape_text(label), field)
        }
        IssueDetail::EmptyLink { .. } => {
            let text = suggested.unwrap_or("Descriptive link text");
            if issue.element.contains("></a>") && !issue.element.contains("<img") {
                issue
                    .element
                    .replacen("></a>", &format!(">{}</a>", escape_text(text)), 1)
            } else {
                insert_attribute(&issue.element, &format!("aria-label=\"{}\"", escape_attr(text)))
            }
        }
        IssueDetail::MissingHeadings => {
            "<h1>Main Page Title</h1>\n<h2>Section Heading</h2>\n<h3>Subsection Heading</h3>"
                .to_string()
        }
        IssueDetail::ImproperHeadingStructure { previous_level, .. } => {
            let target = format!("${{1}}h{}", previous_level + 1);
            HEADING_TAG.replace_all(&issue.element, target.as_str()).into_owned()
        }
        IssueDetail::MissingPageTitle => {
            "<title>Descriptive Page Title - Website Name</title>".to_string()
        }
        IssueDetail::MissingLangAttribute => "<html lang=\"en\">".to_string(),
        IssueDetail::LowContrast { background, .. } => {
            // The last declaration is the one that renders.
            let last = COLOR_DECLARATION.captures_iter(&issue.element).last();
            match last.as_ref().and_then(|caps| Some((caps.get(0)?, caps.get(1)?))) {
                Some((whole, prefix)) => format!(
                    "{}{}color: {}{}",
                    &issue.element[..whole.start()],
                    prefix.as_str(),
                    readable_foreground(background),
                    &issue.element[whole.end()..]
                ),
                None => issue.element.clone(),
            }
        }
        IssueDetail::MissingSkipLink => {
            "<a href=\"#main\" class=\"skip-link\">Skip to main content</a>".to_string()
        }
    }
}

/// The first start tag of `element`, without its closing `>`.
fn start_tag(element: &str) -> &str {
    element.find('>').map_or(element, |end| &element[..end])
}

/// Insert an attribute into the first start tag of `element`.
fn insert_attribute(element: &str, attribute: &str) -> String {
    match element.find('>') {
        Some(end) => {
            let head = element[..end].trim_end_matches('/').trim_end();
            format!("{} {}>{}", head, attribute, &element[end + 1..])
        }
        None => format!("{} {}", element, attribute),
    }
}

/// Deterministic id for a field that needs one to be labelled.
fn label_target_id(input_name: &str) -> String {
    let slug: String = input_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() || slug == "unnamed" {
        "input-field".to_string()
    } else {
        format!("input-{}", slug)
    }
}

/// Black or white, whichever reads better on the background.
fn readable_foreground(background: &str) -> &'static str {
    use crate::detect::{contrast_ratio, Rgb};

    let black = Rgb { r: 0, g: 0, b: 0 };
    let bg = Rgb::parse(background).unwrap_or(Rgb::WHITE);
    if contrast_ratio(black, bg) >= contrast_ratio(Rgb::WHITE, bg) {
        "#000000"
    } else {
        "#ffffff"
    }
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
