//! Tests pinning the JSON wire format of reports.
//!
//! Field names and tags here are consumed by browser front ends, so any
//! change shows up as a failure in this file.

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use a11ycheck::detect::{Issue, IssueDetail, IssueType, Severity};
use a11ycheck::enrich::{EnrichedIssue, Enrichment, Suggestion};
use a11ycheck::report::{download_file_name, Report};

fn enriched(detail: IssueDetail, element: &str) -> EnrichedIssue {
    let issue = Issue::new(detail, element);
    EnrichedIssue {
        enrichment: Enrichment::fallback(&issue),
        issue,
    }
}

fn issue_json(detail: IssueDetail, element: &str) -> Value {
    serde_json::to_value(enriched(detail, element)).expect("serialize issue")
}

#[test]
fn test_issue_type_tags() {
    let tags: Vec<_> = IssueType::ALL.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        tags,
        vec![
            "missing-alt-text",
            "missing-headings",
            "improper-heading-structure",
            "missing-form-label",
            "low-contrast",
            "missing-page-title",
            "missing-lang-attribute",
            "empty-link",
            "missing-skip-link",
        ]
    );
}

#[test]
fn test_issue_payload_fields() {
    assert_eq!(
        issue_json(
            IssueDetail::MissingAltText {
                src: Some("a.png".to_string())
            },
            r#"<img src="a.png">"#
        ),
        json!({
            "type": "missing-alt-text",
            "severity": "high",
            "element": "<img src=\"a.png\">",
            "src": "a.png",
            "explanation": "This accessibility issue should be addressed to improve user experience.",
            "fixedCode": "<img src=\"a.png\">",
        })
    );

    let v = issue_json(
        IssueDetail::MissingFormLabel {
            input_type: "email".to_string(),
            input_name: "contact".to_string(),
        },
        "<input>",
    );
    assert_eq!(v["type"], "missing-form-label");
    assert_eq!(v["inputType"], "email");
    assert_eq!(v["inputName"], "contact");

    let v = issue_json(
        IssueDetail::ImproperHeadingStructure {
            previous_level: 2,
            level: 4,
        },
        "<h4>x</h4>",
    );
    assert_eq!(v["previousLevel"], 2);
    assert_eq!(v["level"], 4);
    assert_eq!(v["severity"], "medium");

    let v = issue_json(
        IssueDetail::LowContrast {
            contrast_ratio: 2.32,
            required_ratio: 4.5,
            foreground: "#aaaaaa".to_string(),
            background: "#ffffff".to_string(),
        },
        "<p>x</p>",
    );
    assert_eq!(v["contrastRatio"], 2.32);
    assert_eq!(v["requiredRatio"], 4.5);
    assert_eq!(v["foreground"], "#aaaaaa");

    let v = issue_json(
        IssueDetail::EmptyLink {
            href: "/x".to_string(),
        },
        "<a href=\"/x\"></a>",
    );
    assert_eq!(v["href"], "/x");

    let v = issue_json(IssueDetail::MissingSkipLink, "<body>");
    assert_eq!(
        v.as_object().unwrap().len(),
        5,
        "unit variants carry only the shared fields: {}",
        v
    );
}

#[test]
fn test_alt_text_without_src_omits_field() {
    let v = issue_json(IssueDetail::MissingAltText { src: None }, "<img>");
    assert!(v.get("src").is_none());
}

#[test]
fn test_suggestion_field_names() {
    let cases = [
        (Suggestion::AltText("a".to_string()), "suggestedAltText"),
        (Suggestion::Label("b".to_string()), "suggestedLabel"),
        (Suggestion::LinkText("c".to_string()), "suggestedText"),
    ];
    for (suggestion, field) in cases {
        let mut e = enriched(IssueDetail::MissingPageTitle, "<title></title>");
        e.enrichment.suggestion = Some(suggestion.clone());
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v[field], suggestion.text());
    }
}

#[test]
fn test_report_and_download_shape() {
    let at = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
    let report = Report::build(
        "https://example.com",
        at,
        vec![enriched(IssueDetail::MissingLangAttribute, "<html>")],
    );

    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(
        v,
        json!({
            "url": "https://example.com",
            "analyzedAt": "2024-01-31T23:59:59.000Z",
            "overallScore": 92,
            "issueCount": { "critical": 0, "high": 0, "medium": 1, "low": 0 },
            "issues": [{
                "type": "missing-lang-attribute",
                "severity": "medium",
                "element": "<html>",
                "explanation": "This accessibility issue should be addressed to improve user experience.",
                "fixedCode": "<html>",
            }],
            "estimatedFixTime": "10 minutes",
            "totalIssues": 1,
        })
    );

    let d = serde_json::to_value(report.download()).unwrap();
    assert_eq!(
        d,
        json!({
            "url": "https://example.com",
            "analyzedAt": "2024-01-31T23:59:59.000Z",
            "overallScore": 92,
            "issueCount": { "critical": 0, "high": 0, "medium": 1, "low": 0 },
            "estimatedFixTime": "10 minutes",
            "issues": [{
                "type": "missing-lang-attribute",
                "severity": "medium",
                "explanation": "This accessibility issue should be addressed to improve user experience.",
                "fixedCode": "<html>",
            }],
        })
    );
}

#[test]
fn test_report_round_trips() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let mut alt = enriched(
        IssueDetail::MissingAltText {
            src: Some("p.jpg".to_string()),
        },
        r#"<img src="p.jpg">"#,
    );
    alt.enrichment.suggestion = Some(Suggestion::AltText("Portrait".to_string()));
    let report = Report::build(
        "https://example.com",
        at,
        vec![
            alt,
            enriched(
                IssueDetail::ImproperHeadingStructure {
                    previous_level: 1,
                    level: 3,
                },
                "<h3>x</h3>",
            ),
        ],
    );

    let text = serde_json::to_string(&report).unwrap();
    let back: Report = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.issues[0].issue.severity, Severity::High);
}

#[test]
fn test_download_file_name() {
    let date = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
    assert_eq!(download_file_name(date), "accessibility-report-2024-12-05.json");
}
