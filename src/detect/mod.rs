//! Detection module for accessibility issues in a parsed page.

mod contrast;
mod forms;
mod headings;
mod images;
mod links;
mod page;
mod runner;
mod types;

pub use contrast::{contrast_ratio, detect_low_contrast, Rgb, LARGE_TEXT_RATIO, NORMAL_TEXT_RATIO};
pub use forms::detect_missing_form_labels;
pub use headings::{detect_heading_structure, HeadingMode};
pub use images::detect_missing_alt_text;
pub use links::{detect_empty_links, detect_missing_skip_link};
pub use page::{detect_missing_lang_attribute, detect_missing_page_title};
pub use runner::{Rule, RuleError, RuleFn, RuleOptions, Runner, BUILTIN_RULES};
pub use types::{Issue, IssueDetail, IssueType, Severity};
