//! Report value and output formatting.
//!
//! Supports three outputs:
//! - JSON: the full report, as served by `POST /analyze`
//! - Download: a reduced projection written to a dated file
//! - Pretty: colored terminal output for human readability

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{IssueType, Severity};
use crate::enrich::EnrichedIssue;
use crate::score::{aggregate, IssueCount, ScoreBand};

/// Elements longer than this are cut in the pretty output.
const ELEMENT_DISPLAY_LIMIT: usize = 150;

/// The result of one analysis. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub url: String,
    pub analyzed_at: String,
    pub overall_score: u32,
    pub issue_count: IssueCount,
    pub issues: Vec<EnrichedIssue>,
    pub estimated_fix_time: String,
    pub total_issues: usize,
}

impl Report {
    /// Aggregate enriched issues into a report. Issue order is kept.
    pub fn build(url: impl Into<String>, analyzed_at: DateTime<Utc>, issues: Vec<EnrichedIssue>) -> Self {
        let agg = aggregate(issues.iter().map(|e| &e.issue));
        Self {
            url: url.into(),
            analyzed_at: analyzed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            overall_score: agg.overall_score,
            issue_count: agg.issue_count,
            issues,
            estimated_fix_time: agg.estimated_fix_time,
            total_issues: agg.total_issues,
        }
    }

    /// UTC calendar date of `analyzed_at`, used to name the download file.
    pub fn analyzed_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.analyzed_at)
            .ok()
            .map(|at| at.with_timezone(&Utc).date_naive())
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.overall_score)
    }

    /// The reduced form offered for download.
    pub fn download(&self) -> DownloadReport {
        DownloadReport {
            url: self.url.clone(),
            analyzed_at: self.analyzed_at.clone(),
            overall_score: self.overall_score,
            issue_count: self.issue_count,
            estimated_fix_time: self.estimated_fix_time.clone(),
            issues: self
                .issues
                .iter()
                .map(|e| DownloadIssue {
                    issue_type: e.issue.issue_type(),
                    severity: e.issue.severity,
                    explanation: e.enrichment.explanation.clone(),
                    fixed_code: e.enrichment.fixed_code.clone(),
                })
                .collect(),
        }
    }
}

/// Download projection of a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadReport {
    pub url: String,
    pub analyzed_at: String,
    pub overall_score: u32,
    pub issue_count: IssueCount,
    pub estimated_fix_time: String,
    pub issues: Vec<DownloadIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub explanation: String,
    pub fixed_code: String,
}

/// `accessibility-report-<YYYY-MM-DD>.json`
pub fn download_file_name(date: NaiveDate) -> String {
    format!("accessibility-report-{}.json", date.format("%Y-%m-%d"))
}

// =============================================================================
// JSON
// =============================================================================

/// Write the full report as JSON to stdout.
pub fn write_json(report: &Report) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Write the download projection into `dir`, returning the file path.
pub fn write_download(report: &Report, dir: &Path, date: NaiveDate) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(download_file_name(date));
    let json = serde_json::to_string_pretty(&report.download())?;
    fs::write(&path, json)?;
    Ok(path)
}

// =============================================================================
// Pretty
// =============================================================================

/// Write the report in human-readable form. With `only` set, just issues of
/// that severity are listed; counts and score always cover the whole report.
pub fn write_pretty(report: &Report, only: Option<Severity>) {
    print!("{}", render_pretty(report, only));
}

pub fn render_pretty(report: &Report, only: Option<Severity>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, only);
    out
}

fn write_report(out: &mut String, report: &Report, only: Option<Severity>) -> fmt::Result {
    // Header
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "a11ycheck".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "URL:      ".dimmed(), report.url)?;
    writeln!(out, "  {}{}", "Analyzed: ".dimmed(), report.analyzed_at)?;
    writeln!(out)?;

    // Summary
    let band = report.band();
    writeln!(
        out,
        "  Score: {}/100  {}",
        colored_score(report.overall_score, band),
        band_label(band)
    )?;
    write!(out, "  ")?;
    for severity in Severity::ALL {
        write!(out, "{} {}  ", severity_tag(severity), report.issue_count.get(severity))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}{}",
        "Estimated fix time: ".dimmed(),
        report.estimated_fix_time
    )?;
    writeln!(out)?;

    if report.issues.is_empty() {
        writeln!(out, "  {}", "✓ No accessibility issues found".green())?;
        return writeln!(out);
    }

    // Issues
    let listed: Vec<&EnrichedIssue> = report
        .issues
        .iter()
        .filter(|e| only.map_or(true, |s| e.issue.severity == s))
        .collect();

    match only {
        Some(s) => writeln!(out, "  {} ({} {}):", "Issues".bold(), listed.len(), s)?,
        None => writeln!(out, "  {} ({}):", "Issues".bold(), listed.len())?,
    }
    writeln!(out)?;

    for e in listed {
        write_issue(out, e)?;
    }
    Ok(())
}

fn write_issue(out: &mut String, e: &EnrichedIssue) -> fmt::Result {
    let issue_type = e.issue.issue_type();
    writeln!(
        out,
        "    {}  {:<28} {}",
        severity_tag(e.issue.severity),
        issue_type.as_str(),
        issue_type.wcag_reference().dimmed()
    )?;
    writeln!(
        out,
        "        {}",
        truncate(&e.issue.element, ELEMENT_DISPLAY_LIMIT).blue()
    )?;
    writeln!(out, "        {}", e.enrichment.explanation)?;
    if let Some(suggestion) = &e.enrichment.suggestion {
        writeln!(out, "        {}{}", "Suggested: ".dimmed(), suggestion.text())?;
    }
    if e.enrichment.fixed_code != e.issue.element {
        writeln!(out, "        {}", "Fix:".dimmed())?;
        for line in e.enrichment.fixed_code.lines() {
            writeln!(out, "          {}", line.green())?;
        }
    }
    writeln!(out)
}

fn colored_score(score: u32, band: ScoreBand) -> ColoredString {
    let s = score.to_string();
    match band {
        ScoreBand::Good => s.green().bold(),
        ScoreBand::Fair => s.yellow().bold(),
        ScoreBand::Poor => s.red().bold(),
    }
}

fn band_label(band: ScoreBand) -> ColoredString {
    match band {
        ScoreBand::Good => "Good".green(),
        ScoreBand::Fair => "Needs work".yellow(),
        ScoreBand::Poor => "Poor".red(),
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH    ".red(),
        Severity::Medium => "MEDIUM  ".yellow(),
        Severity::Low => "LOW     ".blue(),
    }
}

/// Cut to `limit` characters, marking the cut with an ellipsis.
fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let cut: String = s.chars().take(limit).collect();
    format!("{}...", cut)
}
