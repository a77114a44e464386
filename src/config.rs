// src/config.rs
// =============================================================================
// Configuration for a run, loaded from an optional YAML file.
//
// Precedence (highest first):
// 1. Command-line flags (applied by main.rs)
// 2. The YAML file given with --config (default: site-auditor.yml)
// 3. Built-in defaults below
//
// A missing file is fine, we just use the defaults. A file that exists but
// does not parse is a hard error.
//
// Example file:
//
//   root_url: https://tgiles.github.io
//   output_dir: ./lighthouse
//   concurrency: 2
//   crawler:
//     max_depth: 3
//     respect_robots_txt: true
//   lighthouse:
//     profiles:
//       - form_factor: mobile
//       - form_factor: desktop
//         chrome_flags: ["--headless", "--no-sandbox"]
//   a11y:
//     maximum_urls: 64
// =============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::audit::{AuditProfile, FormFactor};
use crate::scheduler::DEFAULT_LIMIT;

pub const DEFAULT_CONFIG_FILE: &str = "site-auditor.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no root URL given (pass one on the command line or set `root_url`)")]
    MissingRootUrl,

    #[error("invalid root URL '{url}': {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Everything a run can be configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Site to audit; may instead be given on the command line
    pub root_url: Option<String>,
    /// Reports land in `<output_dir>/<timestamp>/`
    pub output_dir: PathBuf,
    /// Audits in flight at once
    pub concurrency: usize,
    pub crawler: CrawlerConfig,
    pub lighthouse: LighthouseConfig,
    pub a11y: A11yConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_url: None,
            output_dir: PathBuf::from("lighthouse"),
            concurrency: DEFAULT_LIMIT,
            crawler: CrawlerConfig::default(),
            lighthouse: LighthouseConfig::default(),
            a11y: A11yConfig::default(),
        }
    }
}

/// How the site is walked before auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// 0 = unlimited, 1 = the root page only, n = n levels counting the root
    pub max_depth: usize,
    /// Stay on the crawl host
    pub filter_by_domain: bool,
    pub strip_querystring: bool,
    /// Page fetches in flight at once
    pub concurrency: usize,
    pub respect_robots_txt: bool,
    /// Follow a redirect of the root page to another host
    pub allow_initial_domain_change: bool,
    /// Paths ending in one of these are never queued (case-insensitive)
    pub excluded_extensions: Vec<String>,
    pub max_urls: Option<usize>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause after every fetched page
    pub politeness_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let excluded = [
            "css", "jpg", "pdf", "docx", "js", "png", "ico", "gif", "svg", "psd", "ai", "zip",
            "gz", "zx", "src", "cassette", "mini-profiler", "axd", "woff", "woff2",
        ];
        Self {
            max_depth: 0,
            filter_by_domain: true,
            strip_querystring: true,
            concurrency: 4,
            respect_robots_txt: true,
            allow_initial_domain_change: true,
            excluded_extensions: excluded.iter().map(|ext| ext.to_string()).collect(),
            max_urls: None,
            user_agent: concat!("site-auditor/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            politeness_delay_ms: 100,
        }
    }
}

/// The Lighthouse CLI and the option bundles every URL is audited with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LighthouseConfig {
    pub binary: String,
    /// Per-audit limit; unset means wait as long as it takes
    pub timeout_secs: Option<u64>,
    pub profiles: Vec<AuditProfile>,
}

impl Default for LighthouseConfig {
    fn default() -> Self {
        Self {
            binary: "lighthouse".to_string(),
            timeout_secs: None,
            profiles: vec![
                AuditProfile::for_form_factor(FormFactor::Mobile),
                AuditProfile::for_form_factor(FormFactor::Desktop),
            ],
        }
    }
}

impl LighthouseConfig {
    // Keeps only the profiles for the requested form factors, in the requested
    // order. A form factor without a configured profile gets the default one.
    pub fn select_form_factors(&mut self, wanted: &[FormFactor]) {
        if wanted.is_empty() {
            return;
        }

        let mut selected: Vec<AuditProfile> = Vec::new();
        for form_factor in wanted {
            if selected.iter().any(|p| p.form_factor == *form_factor) {
                continue;
            }
            let matching: Vec<AuditProfile> = self
                .profiles
                .iter()
                .filter(|p| p.form_factor == *form_factor)
                .cloned()
                .collect();
            if matching.is_empty() {
                selected.push(AuditProfile::for_form_factor(*form_factor));
            } else {
                selected.extend(matching);
            }
        }
        self.profiles = selected;
    }
}

/// The accessibility crawler (`a11ym`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct A11yConfig {
    pub binary: String,
    /// Reports land in `<output_dir>/<host>/<timestamp>/`
    pub output_dir: PathBuf,
    pub maximum_depth: usize,
    pub maximum_urls: usize,
}

impl Default for A11yConfig {
    fn default() -> Self {
        Self {
            binary: "a11ym".to_string(),
            output_dir: PathBuf::from("a11ym_reports"),
            maximum_depth: 0,
            maximum_urls: 256,
        }
    }
}

impl Config {
    // Loads the config file at `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to null, treat it like "all defaults"
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(input).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be greater than 0".into(),
            ));
        }
        if self.crawler.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "crawler.concurrency must be greater than 0".into(),
            ));
        }
        if self.lighthouse.profiles.is_empty() {
            return Err(ConfigError::Invalid(
                "lighthouse.profiles must list at least one profile".into(),
            ));
        }
        Ok(())
    }

    // Picks the root URL: the command-line value wins over the config file
    pub fn resolve_root_url(&self, from_cli: Option<&str>) -> Result<Url, ConfigError> {
        let raw = from_cli
            .or(self.root_url.as_deref())
            .ok_or(ConfigError::MissingRootUrl)?;
        Url::parse(raw).map_err(|source| ConfigError::InvalidRootUrl {
            url: raw.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&tmp.path().join("nope.yml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.lighthouse.profiles.len(), 2);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "root_url: https://tgiles.github.io\nconcurrency: 2\ncrawler:\n  max_depth: 3\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.root_url.as_deref(), Some("https://tgiles.github.io"));
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.crawler.max_depth, 3);
        assert!(config.crawler.respect_robots_txt);
        assert_eq!(config.a11y.maximum_urls, 256);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency: [not, a, number").unwrap();

        let err = Config::load(file.path()).unwrap_err();

        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::from_yaml_str("concurency: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let err = Config::from_yaml_str("concurrency: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::from_yaml_str("\n").unwrap(), Config::default());
    }

    #[test]
    fn test_cli_url_wins() {
        let config = Config {
            root_url: Some("https://from-file.example".into()),
            ..Config::default()
        };
        let url = config
            .resolve_root_url(Some("https://from-cli.example/"))
            .unwrap();
        assert_eq!(url.as_str(), "https://from-cli.example/");

        let url = config.resolve_root_url(None).unwrap();
        assert_eq!(url.host_str(), Some("from-file.example"));
    }

    #[test]
    fn test_root_url_required() {
        let err = Config::default().resolve_root_url(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRootUrl));

        let err = Config::default()
            .resolve_root_url(Some("not a url"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootUrl { .. }));
    }

    #[test]
    fn test_select_form_factors() {
        let mut lighthouse = LighthouseConfig {
            profiles: vec![AuditProfile {
                form_factor: FormFactor::Desktop,
                chrome_flags: vec!["--headless".into(), "--no-sandbox".into()],
                extra_args: Vec::new(),
            }],
            ..LighthouseConfig::default()
        };

        lighthouse.select_form_factors(&[FormFactor::Desktop, FormFactor::Mobile]);

        assert_eq!(lighthouse.profiles.len(), 2);
        // The configured desktop profile is kept as-is
        assert_eq!(lighthouse.profiles[0].chrome_flags.len(), 2);
        assert_eq!(lighthouse.profiles[1], AuditProfile::default());

        lighthouse.select_form_factors(&[FormFactor::Mobile]);
        assert_eq!(lighthouse.profiles, vec![AuditProfile::default()]);
    }
}
