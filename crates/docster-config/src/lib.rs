#![deny(unsafe_code)]

//! Configuration loading and validation for Docster.
//!
//! Loads TOML configuration files and validates them. [`AppConfig`] is the
//! central configuration structure; every section falls back to its defaults
//! when absent, so a partial file merges cleanly over the built-in values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docster.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Which files the crawler reads.
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Folders and files the crawler never visits.
    #[serde(default)]
    pub ignored: IgnoredConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the local HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port the server binds to.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    3222
}

/// Crawl selection rules.
///
/// All entries are regular expressions searched (unanchored unless the
/// pattern anchors itself) against the path relative to the crawl root.
///
/// ## TOML Example
///
/// ```toml
/// [crawl]
/// file_types = ['\.rs$', '\.toml$']
/// binary_file_types = ['\.png$']
/// respect_gitignore = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Files whose relative path matches one of these are read as text.
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,

    /// Files matching one of these get a placeholder instead of content.
    #[serde(default = "default_binary_file_types")]
    pub binary_file_types: Vec<String>,

    /// Follow symbolic links while walking.
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Additionally honour `.gitignore` / `.ignore` files.
    #[serde(default)]
    pub respect_gitignore: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            file_types: default_file_types(),
            binary_file_types: default_binary_file_types(),
            follow_symlinks: false,
            respect_gitignore: false,
        }
    }
}

fn default_file_types() -> Vec<String> {
    [
        r"\.ts$", r"\.svelte$", r"\.js$", r"\.md$", r"\.py$", r"\.html$", r"\.css$", r"\.jsx$",
        r"\.tsx$", r"\.json$", r"\.txt$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_binary_file_types() -> Vec<String> {
    [
        r"\.png$", r"\.jpg$", r"\.jpeg$", r"\.gif$", r"\.bmp$", r"\.ico$", r"\.pdf$", r"\.zip$",
        r"\.gz$", r"\.tar$", r"\.woff$", r"\.woff2$", r"\.eot$", r"\.ttf$", r"\.otf$", r"\.mp4$",
        r"\.webm$", r"\.ogg$", r"\.mp3$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Ignore rules applied before any file is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredConfig {
    /// Matched against a directory's relative path and its bare name.
    #[serde(default = "default_ignored_folders")]
    pub folders: Vec<String>,

    /// Matched against a file's relative path and its bare name.
    #[serde(default = "default_ignored_files")]
    pub files: Vec<String>,

    /// Matched against a file's lowercased extension, dot included (`.log`).
    #[serde(default = "default_ignored_file_types")]
    pub file_types: Vec<String>,
}

impl Default for IgnoredConfig {
    fn default() -> Self {
        Self {
            folders: default_ignored_folders(),
            files: default_ignored_files(),
            file_types: default_ignored_file_types(),
        }
    }
}

fn default_ignored_folders() -> Vec<String> {
    [
        "node_modules",
        ".git",
        ".vscode",
        "__pycache__",
        "dist",
        "build",
        "docster",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ignored_files() -> Vec<String> {
    [r"\.env.*", r"package-lock\.json", r"yarn\.lock"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignored_file_types() -> Vec<String> {
    [r"\.log", r"\.tmp", r"\.swp", r"\.DS_Store"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load the file at `path`, or the defaults when it does not exist.
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub async fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if tokio::fs::try_exists(path).await? {
            let config = Self::load(path).await?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        } else {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the default configuration to `path` unless a file is already there.
    ///
    /// Returns `true` when a file was written.
    pub async fn write_default(path: &Path) -> Result<bool, ConfigError> {
        if tokio::fs::try_exists(path).await? {
            return Ok(false);
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, Self::default().to_toml()?).await?;
        info!(path = %path.display(), "Wrote default configuration");
        Ok(true)
    }

    /// The `host:port` string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.listen_port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_port == 0 {
            return Err(ConfigError::Validation(
                "server.listen_port must be non-zero".to_string(),
            ));
        }
        if self.server.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "server.listen_addr must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        let pattern_lists = [
            ("crawl.file_types", &self.crawl.file_types),
            ("crawl.binary_file_types", &self.crawl.binary_file_types),
            ("ignored.folders", &self.ignored.folders),
            ("ignored.files", &self.ignored.files),
            ("ignored.file_types", &self.ignored.file_types),
        ];
        for (key, patterns) in pattern_lists {
            if let Some(i) = patterns.iter().position(|p| p.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{key}[{i}] must not be empty"
                )));
            }
        }

        Ok(())
    }
}
