//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for issues.
///
/// `Critical` is part of the scoring model but no built-in rule emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Tags for the different issue types, in canonical detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    MissingAltText,
    MissingHeadings,
    ImproperHeadingStructure,
    MissingFormLabel,
    LowContrast,
    MissingPageTitle,
    MissingLangAttribute,
    EmptyLink,
    MissingSkipLink,
}

impl IssueType {
    pub const ALL: [IssueType; 9] = [
        IssueType::MissingAltText,
        IssueType::MissingHeadings,
        IssueType::ImproperHeadingStructure,
        IssueType::MissingFormLabel,
        IssueType::LowContrast,
        IssueType::MissingPageTitle,
        IssueType::MissingLangAttribute,
        IssueType::EmptyLink,
        IssueType::MissingSkipLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::MissingAltText => "missing-alt-text",
            IssueType::MissingHeadings => "missing-headings",
            IssueType::ImproperHeadingStructure => "improper-heading-structure",
            IssueType::MissingFormLabel => "missing-form-label",
            IssueType::LowContrast => "low-contrast",
            IssueType::MissingPageTitle => "missing-page-title",
            IssueType::MissingLangAttribute => "missing-lang-attribute",
            IssueType::EmptyLink => "empty-link",
            IssueType::MissingSkipLink => "missing-skip-link",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        IssueType::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Fixed severity assigned by the built-in rules.
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueType::MissingAltText
            | IssueType::MissingFormLabel
            | IssueType::EmptyLink
            | IssueType::MissingPageTitle => Severity::High,
            IssueType::MissingHeadings
            | IssueType::ImproperHeadingStructure
            | IssueType::MissingLangAttribute
            | IssueType::LowContrast
            | IssueType::MissingSkipLink => Severity::Medium,
        }
    }

    /// WCAG success criterion the issue maps to.
    pub fn wcag_reference(&self) -> &'static str {
        match self {
            IssueType::MissingAltText => "WCAG 1.1.1 - Non-text Content",
            IssueType::MissingHeadings | IssueType::ImproperHeadingStructure => {
                "WCAG 1.3.1 - Info and Relationships"
            }
            IssueType::MissingFormLabel => "WCAG 1.3.1 - Info and Relationships",
            IssueType::LowContrast => "WCAG 1.4.3 - Contrast (Minimum)",
            IssueType::MissingPageTitle => "WCAG 2.4.2 - Page Titled",
            IssueType::MissingLangAttribute => "WCAG 3.1.1 - Language of Page",
            IssueType::EmptyLink => "WCAG 2.4.4 - Link Purpose (In Context)",
            IssueType::MissingSkipLink => "WCAG 2.4.1 - Bypass Blocks",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type tag plus the payload specific to that type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IssueDetail {
    MissingAltText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
    },
    MissingHeadings,
    ImproperHeadingStructure {
        #[serde(rename = "previousLevel")]
        previous_level: u8,
        level: u8,
    },
    MissingFormLabel {
        #[serde(rename = "inputType")]
        input_type: String,
        #[serde(rename = "inputName")]
        input_name: String,
    },
    LowContrast {
        #[serde(rename = "contrastRatio")]
        contrast_ratio: f64,
        #[serde(rename = "requiredRatio")]
        required_ratio: f64,
        foreground: String,
        background: String,
    },
    MissingPageTitle,
    MissingLangAttribute,
    EmptyLink {
        href: String,
    },
    MissingSkipLink,
}

impl IssueDetail {
    pub fn issue_type(&self) -> IssueType {
        match self {
            IssueDetail::MissingAltText { .. } => IssueType::MissingAltText,
            IssueDetail::MissingHeadings => IssueType::MissingHeadings,
            IssueDetail::ImproperHeadingStructure { .. } => IssueType::ImproperHeadingStructure,
            IssueDetail::MissingFormLabel { .. } => IssueType::MissingFormLabel,
            IssueDetail::LowContrast { .. } => IssueType::LowContrast,
            IssueDetail::MissingPageTitle => IssueType::MissingPageTitle,
            IssueDetail::MissingLangAttribute => IssueType::MissingLangAttribute,
            IssueDetail::EmptyLink { .. } => IssueType::EmptyLink,
            IssueDetail::MissingSkipLink => IssueType::MissingSkipLink,
        }
    }
}

/// A single detected accessibility problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(flatten)]
    pub detail: IssueDetail,
    pub severity: Severity,
    /// Markup of the offending element, untruncated.
    pub element: String,
}

impl Issue {
    /// Create an issue with the type's default severity.
    pub fn new(detail: IssueDetail, element: impl Into<String>) -> Self {
        let severity = detail.issue_type().default_severity();
        Self {
            detail,
            severity,
            element: element.into(),
        }
    }

    pub fn issue_type(&self) -> IssueType {
        self.detail.issue_type()
    }
}
