//! Configuration for a11ycheck.
//!
//! Loaded from YAML, then adjusted by environment overrides. Every section
//! is optional and falls back to the defaults below.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::detect::{HeadingMode, IssueType};

/// File names looked up in the working directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["a11ycheck.yaml", ".a11ycheck.yaml"];

/// Desktop Chrome user agent; some sites refuse unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub enrichment: EnrichmentConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".to_string(),
            log_json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    /// Maximum issues enriched at once.
    pub concurrency: usize,
    /// Per-call limit for text generation.
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.together.xyz/v1/chat/completions".to_string(),
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            api_key_env: "TOGETHER_API_KEY".to_string(),
            temperature: 0.7,
            concurrency: 4,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Issue type tags to leave out of reports.
    pub disabled: Vec<String>,
    pub heading_structure: HeadingMode,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty file deserializes to null rather than an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load the explicit file, else the first discovered one, else defaults,
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };
        let mut config = match &path {
            Some(p) => Self::parse_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, path))
    }

    /// Apply `PORT` and `A11YCHECK_LOG_JSON` from the process environment.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", port))?;
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.server.bind = format!("{}:{}", host, port);
        }
        if let Some(flag) = lookup("A11YCHECK_LOG_JSON") {
            self.server.log_json = matches!(flag.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        for tag in &self.rules.disabled {
            if IssueType::parse(tag).is_none() {
                let known: Vec<_> = IssueType::ALL.iter().map(|t| t.as_str()).collect();
                bail!(
                    "unknown issue type {:?} in rules.disabled (expected one of: {})",
                    tag,
                    known.join(", ")
                );
            }
        }
        self.bind_addr()?;
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than 0");
        }

        let enrichment = &self.enrichment;
        if enrichment.concurrency == 0 {
            bail!("enrichment.concurrency must be greater than 0");
        }
        if enrichment.timeout_secs == 0 {
            bail!("enrichment.timeout_secs must be greater than 0");
        }
        if !(0.0..=2.0).contains(&enrichment.temperature) {
            bail!(
                "enrichment.temperature must be between 0 and 2, got {}",
                enrichment.temperature
            );
        }
        if !crate::urls::is_valid_url(&enrichment.api_url) {
            bail!(
                "enrichment.api_url must be an http(s) URL, got {:?}",
                enrichment.api_url
            );
        }
        Ok(())
    }

    /// The server bind address.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("invalid server.bind address {:?}", self.server.bind))
    }
}

/// First config file found in the working directory, then the user config
/// directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .chain(user_config_path())
        .find(|p| p.is_file())
}

/// `<config dir>/a11ycheck/config.yaml` for the current platform.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "a11ycheck").map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:3001");
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.enrichment.api_key_env, "TOGETHER_API_KEY");
        assert_eq!(config.enrichment.temperature, 0.7);
        assert_eq!(config.rules.heading_structure, HeadingMode::First);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
enrichment:
  enabled: false
  concurrency: 8
rules:
  disabled: [missing-skip-link]
  heading_structure: all
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert!(!config.enrichment.enabled);
        assert_eq!(config.enrichment.concurrency, 8);
        assert_eq!(config.enrichment.timeout_secs, 15);
        assert_eq!(config.rules.disabled, vec!["missing-skip-link"]);
        assert_eq!(config.rules.heading_structure, HeadingMode::All);
        assert_eq!(config.server, ServerConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_unrecognized_top_level_keys_are_ignored() {
        let config = Config::parse_str("version: \"1\"\nfetch:\n  timeout_secs: 5\n").unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  bind: 127.0.0.1:8080").unwrap();
        let config = Config::parse_file(file.path()).unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fetch:\n  timeout_secs: 3").unwrap();
        let (config, path) = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_file_missing() {
        assert!(Config::parse_file("/nonexistent/a11ycheck.yaml").is_err());
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config
            .apply_overrides_from(overrides(&[("PORT", "8081"), ("A11YCHECK_LOG_JSON", "1")]))
            .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8081");
        assert!(config.server.log_json);

        let mut config = Config::default();
        assert!(config
            .apply_overrides_from(overrides(&[("PORT", "http")]))
            .is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases: Vec<Box<dyn Fn(&mut Config)>> = vec![
            Box::new(|c| c.rules.disabled = vec!["missing-everything".to_string()]),
            Box::new(|c| c.enrichment.concurrency = 0),
            Box::new(|c| c.enrichment.timeout_secs = 0),
            Box::new(|c| c.fetch.timeout_secs = 0),
            Box::new(|c| c.enrichment.temperature = 2.5),
            Box::new(|c| c.server.bind = "localhost".to_string()),
            Box::new(|c| c.enrichment.api_url = "ftp://models.example".to_string()),
        ];
        for mutate in cases {
            let mut config = Config::default();
            mutate(&mut config);
            assert!(config.validate().is_err(), "accepted {:?}", config);
        }
    }

    #[test]
    fn test_templates_parse_and_validate() {
        for template in crate::cli::TEMPLATES {
            let config = Config::parse_str(template.content).unwrap();
            config.validate().unwrap();
        }
    }
}
