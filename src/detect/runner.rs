//! Rule runner that evaluates every check against a document.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RulesConfig;
use crate::document::{Document, DocumentError};

use super::{
    detect_empty_links, detect_heading_structure, detect_low_contrast, detect_missing_alt_text,
    detect_missing_form_labels, detect_missing_lang_attribute, detect_missing_page_title,
    detect_missing_skip_link, HeadingMode, Issue, IssueType,
};

/// Errors raised while evaluating a single rule.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("rule panicked: {0}")]
    Panicked(String),
}

/// Settings shared by all rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOptions {
    pub heading_mode: HeadingMode,
}

/// Signature every rule implements.
pub type RuleFn = fn(&Document, &RuleOptions) -> Result<Vec<Issue>, RuleError>;

/// A named rule and the issue types it can emit.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub emits: &'static [IssueType],
    pub check: RuleFn,
}

/// Built-in rules in canonical output order.
pub const BUILTIN_RULES: &[Rule] = &[
    Rule {
        name: "alt-text",
        emits: &[IssueType::MissingAltText],
        check: |doc, _| detect_missing_alt_text(doc),
    },
    Rule {
        name: "headings",
        emits: &[IssueType::MissingHeadings, IssueType::ImproperHeadingStructure],
        check: |doc, opts| detect_heading_structure(doc, opts.heading_mode),
    },
    Rule {
        name: "form-labels",
        emits: &[IssueType::MissingFormLabel],
        check: |doc, _| detect_missing_form_labels(doc),
    },
    Rule {
        name: "contrast",
        emits: &[IssueType::LowContrast],
        check: |doc, _| detect_low_contrast(doc),
    },
    Rule {
        name: "page-title",
        emits: &[IssueType::MissingPageTitle],
        check: |doc, _| detect_missing_page_title(doc),
    },
    Rule {
        name: "lang",
        emits: &[IssueType::MissingLangAttribute],
        check: |doc, _| detect_missing_lang_attribute(doc),
    },
    Rule {
        name: "empty-links",
        emits: &[IssueType::EmptyLink],
        check: |doc, _| detect_empty_links(doc),
    },
    Rule {
        name: "skip-link",
        emits: &[IssueType::MissingSkipLink],
        check: |doc, _| detect_missing_skip_link(doc),
    },
];

/// Executes the rule list against a document.
pub struct Runner {
    rules: Vec<Rule>,
    options: RuleOptions,
    disabled: HashSet<IssueType>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Create a runner with the built-in rules.
    pub fn new() -> Self {
        Self::with_rules(BUILTIN_RULES.to_vec())
    }

    /// Create a runner with a custom rule list, evaluated in the given order.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            options: RuleOptions::default(),
            disabled: HashSet::new(),
        }
    }

    /// Build a runner from the `rules` config section.
    pub fn from_config(config: &RulesConfig) -> Self {
        let disabled = config
            .disabled
            .iter()
            .filter_map(|tag| IssueType::parse(tag))
            .collect();
        Self::new()
            .heading_mode(config.heading_structure)
            .disable(disabled)
    }

    /// Set how skipped heading levels are reported.
    pub fn heading_mode(mut self, mode: HeadingMode) -> Self {
        self.options.heading_mode = mode;
        self
    }

    /// Drop issues of these types from the output.
    pub fn disable(mut self, types: HashSet<IssueType>) -> Self {
        self.disabled = types;
        self
    }

    /// Run every rule and concatenate their issues in rule order.
    ///
    /// A rule that errors or panics contributes nothing; the rest still run.
    pub fn run(&self, doc: &Document) -> Vec<Issue> {
        let mut issues = Vec::new();

        for rule in &self.rules {
            if !rule.emits.is_empty() && rule.emits.iter().all(|t| self.disabled.contains(t)) {
                debug!(rule = rule.name, "rule disabled");
                continue;
            }

            match self.evaluate(rule, doc) {
                Ok(found) => {
                    debug!(rule = rule.name, issues = found.len(), "rule evaluated");
                    issues.extend(
                        found
                            .into_iter()
                            .filter(|i| !self.disabled.contains(&i.issue_type())),
                    );
                }
                Err(e) => {
                    warn!(rule = rule.name, error = %e, "rule skipped");
                }
            }
        }

        issues
    }

    fn evaluate(&self, rule: &Rule, doc: &Document) -> Result<Vec<Issue>, RuleError> {
        let options = self.options;
        catch_unwind(AssertUnwindSafe(|| (rule.check)(doc, &options))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(RuleError::Panicked(message))
        })
    }
}
