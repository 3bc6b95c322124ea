use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CANDIDATES: [&str; 4] = ["kickoff.toml", "kickoff.json", "kickoff.yaml", "kickoff.yml"];

/// Configuration file structure for kickoff.
///
/// Holds the Jenkins connection plus the polling behaviour of the tracker and
/// the log tailer. Command-line flags override anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub tail: TailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins base URL (e.g., 'https://ci.example.com/jenkins')
    pub url: Option<String>,

    /// User the API token belongs to
    pub user: Option<String>,

    /// Jenkins API token
    pub token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// A job is a pipeline when its class contains one of these
    #[serde(default = "default_class_markers")]
    pub pipeline_class_markers: Vec<String>,

    /// Folders nested deeper than this are not fetched
    #[serde(default = "default_max_folder_depth")]
    pub max_folder_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrackingConfig {
    /// Pause between "last build" lookups after a trigger
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up waiting for the new build after this long (unbounded when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TailConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_tail_secs")]
    pub max_duration_secs: u64,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
            pipeline_class_markers: default_class_markers(),
            max_folder_depth: default_max_folder_depth(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: None,
        }
    }
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_duration_secs: default_max_tail_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_class_markers() -> Vec<String> {
    vec!["Job".to_string()]
}

fn default_max_folder_depth() -> usize {
    32
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_tail_secs() -> u64 {
    100 * 60 * 60
}

impl JenkinsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl TailConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. ./kickoff.toml, ./kickoff.json, ./kickoff.yaml, ./kickoff.yml
    /// 3. `<user config dir>/kickoff/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        if let Some(config) = Self::load_from_dir(Path::new("."))? {
            return Ok(config);
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Loads the first `kickoff.*` file found in `dir`.
    fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        for candidate in &CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                return Self::load_from_path(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kickoff").join("config.toml"))
}
