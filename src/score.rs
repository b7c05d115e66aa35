//! Scoring and aggregation for accessibility reports.
//!
//! Turns a flat issue list into per-severity counts, a 0-100 score, and an
//! estimated remediation time.

use serde::{Deserialize, Serialize};

use crate::detect::{Issue, Severity};

/// Score penalty per issue, by severity.
pub mod penalties {
    pub const CRITICAL: i64 = 25;
    pub const HIGH: i64 = 15;
    pub const MEDIUM: i64 = 8;
    pub const LOW: i64 = 3;
}

/// Estimated fix minutes per issue, by severity.
pub mod minutes {
    pub const CRITICAL: u32 = 30;
    pub const HIGH: u32 = 20;
    pub const MEDIUM: u32 = 10;
    pub const LOW: u32 = 5;
}

/// Score band thresholds.
pub mod bands {
    pub const GOOD_MIN: u32 = 80;
    pub const FAIR_MIN: u32 = 60;
}

pub const MAX_SCORE: u32 = 100;

impl Severity {
    /// Points deducted from the score for one issue.
    pub fn penalty(&self) -> i64 {
        match self {
            Severity::Critical => penalties::CRITICAL,
            Severity::High => penalties::HIGH,
            Severity::Medium => penalties::MEDIUM,
            Severity::Low => penalties::LOW,
        }
    }

    /// Minutes one issue is expected to take to fix.
    pub fn fix_minutes(&self) -> u32 {
        match self {
            Severity::Critical => minutes::CRITICAL,
            Severity::High => minutes::HIGH,
            Severity::Medium => minutes::MEDIUM,
            Severity::Low => minutes::LOW,
        }
    }
}

/// Issue counts per severity. Every severity is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl IssueCount {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    fn increment(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Qualitative band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s >= bands::GOOD_MIN => ScoreBand::Good,
            s if s >= bands::FAIR_MIN => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

/// Aggregate metrics for one issue list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub issue_count: IssueCount,
    pub overall_score: u32,
    pub estimated_minutes: u32,
    pub estimated_fix_time: String,
    pub total_issues: usize,
}

/// Aggregate an issue list. Pure and order-independent.
pub fn aggregate<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Aggregate {
    let mut issue_count = IssueCount::default();
    let mut estimated_minutes = 0;

    for issue in issues {
        issue_count.increment(issue.severity);
        estimated_minutes += issue.severity.fix_minutes();
    }

    Aggregate {
        overall_score: calculate_score(&issue_count),
        estimated_fix_time: format_fix_time(estimated_minutes),
        estimated_minutes,
        total_issues: issue_count.total(),
        issue_count,
    }
}

/// `100 - sum(penalty * count)`, floored at 0.
pub fn calculate_score(counts: &IssueCount) -> u32 {
    let deducted: i64 = Severity::ALL
        .iter()
        .map(|s| s.penalty() * counts.get(*s) as i64)
        .sum();
    (MAX_SCORE as i64 - deducted).max(0) as u32
}

/// Render minutes for display: below an hour as minutes, otherwise whole
/// hours rounded half-up.
pub fn format_fix_time(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} minutes", minutes)
    } else {
        format!("{} hours", (minutes + 30) / 60)
    }
}
