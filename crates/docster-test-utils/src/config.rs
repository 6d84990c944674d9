//! Configuration builders for tests.

use docster_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .file_types(&[r"\.rs$"])
///     .ignored_folders(&["target"])
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn listen_addr(mut self, addr: &str) -> Self {
        self.config.server.listen_addr = addr.to_string();
        self
    }

    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.server.listen_port = port;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    /// Replace the patterns selecting files to read.
    pub fn file_types(mut self, patterns: &[&str]) -> Self {
        self.config.crawl.file_types = owned(patterns);
        self
    }

    pub fn binary_file_types(mut self, patterns: &[&str]) -> Self {
        self.config.crawl.binary_file_types = owned(patterns);
        self
    }

    pub fn ignored_folders(mut self, patterns: &[&str]) -> Self {
        self.config.ignored.folders = owned(patterns);
        self
    }

    pub fn ignored_files(mut self, patterns: &[&str]) -> Self {
        self.config.ignored.files = owned(patterns);
        self
    }

    pub fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.config.crawl.respect_gitignore = enabled;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_and_keeps_defaults() {
        let config = TestConfigBuilder::new()
            .listen_port(4000)
            .file_types(&[r"\.rs$"])
            .build();

        assert_eq!(config.server.listen_port, 4000);
        assert_eq!(config.crawl.file_types, vec![r"\.rs$".to_string()]);
        assert_eq!(config.ignored, AppConfig::default().ignored);
        assert!(config.validate().is_ok());
    }
}
