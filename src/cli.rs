//! Command-line interface for a11ycheck.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::analysis::{Analyzer, Stage};
use crate::config::Config;
use crate::detect::Severity;
use crate::enrich::{api_key_from_env, ChatClient, TextGenerator};
use crate::report;
use crate::server;
use crate::urls::normalize_url;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Web accessibility checker.
///
/// Fetches a page, checks it against a fixed set of structural rules
/// (alt text, form labels, empty links, heading levels, page title,
/// language, contrast, skip links), scores it, and asks a language model
/// to explain each finding and propose corrected markup.
#[derive(Parser)]
#[command(name = "a11ycheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (POST /analyze, GET /health)
    Serve(ServeArgs),
    /// Analyze a single page and print the report
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Create an a11ycheck config file from a template
    Init(InitArgs),
}

/// Arguments for the serve command.
#[derive(Parser)]
pub struct ServeArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding server.bind
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Page URL; "https://" is assumed when no scheme is given
    #[arg(required_unless_present = "file")]
    pub url: Option<String>,

    /// Analyze a local HTML file instead of fetching a URL
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Only list issues of this severity (critical, high, medium, low)
    #[arg(short, long)]
    pub severity: Option<String>,

    /// Also write the download report into this directory
    #[arg(short, long)]
    pub download: Option<PathBuf>,

    /// Skip the language model; use generic explanations
    #[arg(long)]
    pub no_enrich: bool,

    /// Minimum acceptable score (exit non-zero if below)
    #[arg(short, long)]
    pub min_score: Option<u32>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "a11ycheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// A config file template.
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

/// All available templates.
pub static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Every setting with its default value and a comment",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "offline",
        description: "No language model; generic explanations only",
        content: include_str!("templates/offline.yaml"),
    },
    Template {
        name: "strict",
        description: "CI gate: report every heading skip, no language model",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Install the global tracing subscriber. Logs go to stderr so JSON reports
/// on stdout stay clean.
pub fn init_tracing(log_json: bool, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
}

/// Build the text generator for the configured endpoint.
///
/// Returns `None` when enrichment is disabled. A missing API key is an error
/// when `require_key` is set, otherwise enrichment falls back to offline.
fn build_generator(
    config: &Config,
    require_key: bool,
) -> anyhow::Result<Option<Arc<dyn TextGenerator>>> {
    if !config.enrichment.enabled {
        return Ok(None);
    }
    match api_key_from_env(&config.enrichment.api_key_env) {
        Ok(key) => {
            let client = ChatClient::new(&config.enrichment, key)?;
            info!(model = client.model(), "enrichment enabled");
            let generator: Arc<dyn TextGenerator> = Arc::new(client);
            Ok(Some(generator))
        }
        Err(e) if require_key => Err(e).context("enrichment is enabled in the config"),
        Err(e) => {
            warn!(error = %e, "enrichment disabled, using generic explanations");
            Ok(None)
        }
    }
}

/// Run the serve command.
pub async fn run_serve(args: &ServeArgs) -> anyhow::Result<i32> {
    let (mut config, config_path) = Config::load(args.config.as_deref())?;
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
        config.validate()?;
    }
    init_tracing(config.server.log_json, "info");
    if let Some(path) = &config_path {
        info!(path = %path.display(), "config loaded");
    }

    let generator = build_generator(&config, true)?;
    let analyzer = Analyzer::from_config(&config, generator)?;
    server::serve(&config, Arc::new(analyzer)).await?;
    Ok(EXIT_SUCCESS)
}

/// Run the analyze command.
pub async fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Validate severity filter
    let only = match args.severity.as_deref().map(str::parse::<Severity>) {
        None => None,
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => {
            eprintln!(
                "Error: invalid severity {:?}, must be one of critical, high, medium, low",
                args.severity.as_deref().unwrap_or_default()
            );
            return Ok(EXIT_ERROR);
        }
    };

    let (config, _) = match Config::load(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("Run 'a11ycheck init' to create a config file");
            return Ok(EXIT_ERROR);
        }
    };
    init_tracing(config.server.log_json, "warn");

    let generator = if args.no_enrich {
        None
    } else {
        build_generator(&config, false)?
    };
    let analyzer = Analyzer::from_config(&config, generator)?;

    let spinner = stage_spinner();
    let on_stage = |stage: Stage| spinner.set_message(stage.to_string());
    let result = match &args.file {
        Some(path) => {
            let html = read_html(path)?;
            let source = path.display().to_string();
            Ok(analyzer
                .analyze_html_with_progress(&source, &html, &on_stage)
                .await)
        }
        None => {
            let url = normalize_url(args.url.as_deref().unwrap_or_default());
            analyzer.analyze_with_progress(&url, on_stage).await
        }
    };
    spinner.finish_and_clear();

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: failed to analyze website: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&report)?,
        _ => report::write_pretty(&report, only),
    }

    if let Some(dir) = &args.download {
        let date = report
            .analyzed_date()
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let path = report::write_download(&report, dir, date)?;
        eprintln!("Report saved to {}", path.display());
    }

    match args.min_score {
        Some(min) if report.overall_score < min => {
            eprintln!(
                "Score {} is below the minimum of {}",
                report.overall_score, min
            );
            Ok(EXIT_FAILED)
        }
        _ => Ok(EXIT_SUCCESS),
    }
}

fn read_html(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn stage_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'a11ycheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    // Write config file
    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to suit your deployment", args.output.display());
    println!("  2. Run: a11ycheck analyze https://example.com --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  a11ycheck init --template <name>");

    Ok(EXIT_SUCCESS)
}
