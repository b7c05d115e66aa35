//! a11ycheck - web accessibility checker.
//!
//! Fetches a page, classifies it against a fixed set of DOM rules, attaches
//! generated explanations and fixes to each finding, and scores the result.
//!
//! # Architecture
//!
//! - `document`: queryable HTML model over `scraper`
//! - `detect`: issue types and the rule runner
//! - `score`: severity counts, score, and fix-time estimate
//! - `enrich`: explanations and suggested fixes from a text generator
//! - `fetch` / `urls`: page retrieval and URL checks
//! - `analysis`: the fetch → detect → enrich → score pipeline
//! - `report`: report value and output formats (JSON, download, pretty)
//! - `config`: YAML configuration
//! - `server`: HTTP API
//! - `cli`: command-line entry points

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod document;
pub mod enrich;
pub mod fetch;
pub mod report;
pub mod score;
pub mod server;
pub mod urls;

pub use analysis::{AnalyzeError, Analyzer, Stage};
pub use config::Config;
pub use detect::{Issue, IssueDetail, IssueType, Runner, Severity};
pub use document::Document;
pub use enrich::{EnrichedIssue, Enricher, Enrichment, Suggestion, TextGenerator};
pub use report::Report;
pub use score::{aggregate, Aggregate, IssueCount, ScoreBand};
