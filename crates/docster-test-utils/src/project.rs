//! On-disk project fixtures.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway project directory.
///
/// The directory is deleted when this value is dropped, even on panic.
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Root of the project.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a project-relative `/`-separated path.
    pub fn join(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .fold(self.path().to_path_buf(), |path, part| path.join(part))
    }

    /// Write a text file, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        self.bytes(rel, content.as_bytes())
    }

    /// Write a file with arbitrary bytes, creating parent directories.
    pub fn bytes(self, rel: &str, content: &[u8]) -> Self {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("failed to write fixture file");
        self
    }

    /// Create an empty directory.
    pub fn dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.join(rel)).expect("failed to create fixture dir");
        self
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_files_are_written() {
        let project = TestProject::new()
            .file("src/lib/a.ts", "const a = 1;")
            .bytes("logo.png", &[0x89])
            .dir("empty");

        assert_eq!(
            std::fs::read_to_string(project.join("src/lib/a.ts")).unwrap(),
            "const a = 1;"
        );
        assert!(project.join("logo.png").is_file());
        assert!(project.join("empty").is_dir());
    }

    #[test]
    fn test_directory_removed_on_drop() {
        let project = TestProject::new().file("a.ts", "");
        let root = project.path().to_path_buf();
        drop(project);
        assert!(!root.exists());
    }
}
