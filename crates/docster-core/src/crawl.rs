//! Project crawler: walks a directory and reads the files worth showing.
//!
//! Selection follows the `[crawl]` and `[ignored]` config sections. Every
//! rule is a regular expression searched against a path relative to the
//! crawl root (always `/`-separated), a bare file or folder name, or a
//! lowercased extension with its leading dot:
//!
//! | rule | tested against |
//! |---|---|
//! | `ignored.folders` | directory relative path, directory name |
//! | `ignored.files` | file relative path, file name |
//! | `ignored.file_types` | extension |
//! | `crawl.binary_file_types` | extension, file relative path |
//! | `crawl.file_types` | file relative path |
//!
//! Ignored folders are pruned before they are entered. Binary files get a
//! placeholder record instead of content; everything not selected by
//! `crawl.file_types` is skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use docster_config::AppConfig;

/// Placeholder content for files that are not valid UTF-8.
pub const NON_UTF8_PLACEHOLDER: &str =
    "-- File possibly binary or non-utf8 encoding, cannot be read as text --";

/// Errors that abort a crawl.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("crawl root {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// What a [`FileRecord`]'s content holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// The file's text.
    Text,
    /// A placeholder; the file matched a binary type.
    Binary,
    /// A placeholder; the file could not be read as UTF-8 text.
    Unreadable,
}

/// A crawled file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the crawl root, `/`-separated.
    pub path: String,
    /// Extension without the dot, or `unknown`.
    pub file_type: String,
    /// File text or placeholder.
    pub content: String,
    pub kind: RecordKind,
}

/// Counters reported at the end of a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub files: usize,
    pub ignored_folders: usize,
    pub ignored_files: usize,
}

/// Result of one crawl, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutput {
    pub files: Vec<FileRecord>,
    pub stats: CrawlStats,
}

/// A list of compiled patterns; a path is matched when any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile `sources`, skipping (and logging) any that are invalid.
    pub fn compile(field: &str, sources: &[String]) -> Self {
        let patterns = sources
            .iter()
            .filter_map(|source| match Regex::new(source) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(field, pattern = %source, error = %e, "Ignoring invalid pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(haystack))
    }
}

/// What to do with a file once its directory has been entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Read,
    Binary,
    Skip,
}

#[derive(Debug)]
struct CrawlRules {
    ignored_folders: PatternSet,
    ignored_files: PatternSet,
    ignored_file_types: PatternSet,
    binary_file_types: PatternSet,
    file_types: PatternSet,
}

impl CrawlRules {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            ignored_folders: PatternSet::compile("ignored.folders", &config.ignored.folders),
            ignored_files: PatternSet::compile("ignored.files", &config.ignored.files),
            ignored_file_types: PatternSet::compile(
                "ignored.file_types",
                &config.ignored.file_types,
            ),
            binary_file_types: PatternSet::compile(
                "crawl.binary_file_types",
                &config.crawl.binary_file_types,
            ),
            file_types: PatternSet::compile("crawl.file_types", &config.crawl.file_types),
        }
    }

    fn prunes_folder(&self, rel_path: &str, name: &str) -> bool {
        self.ignored_folders.is_match(rel_path) || self.ignored_folders.is_match(name)
    }

    fn select(&self, rel_path: &str, name: &str, extension: &str) -> Selection {
        if self.ignored_files.is_match(rel_path)
            || self.ignored_files.is_match(name)
            || self.ignored_file_types.is_match(extension)
        {
            Selection::Skip
        } else if self.binary_file_types.is_match(extension)
            || self.binary_file_types.is_match(rel_path)
        {
            Selection::Binary
        } else if self.file_types.is_match(rel_path) {
            Selection::Read
        } else {
            Selection::Skip
        }
    }
}

/// Walks a root directory according to the configured rules.
#[derive(Debug, Clone)]
pub struct Crawler {
    root: PathBuf,
    rules: Arc<CrawlRules>,
    follow_symlinks: bool,
    respect_gitignore: bool,
}

impl Crawler {
    /// Create a crawler for `root`, compiling the config's patterns once.
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            root: root.into(),
            rules: Arc::new(CrawlRules::from_config(config)),
            follow_symlinks: config.crawl.follow_symlinks,
            respect_gitignore: config.crawl.respect_gitignore,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and read every selected file.
    ///
    /// Unreadable files become placeholder records; only a missing root is an
    /// error.
    pub fn crawl(&self) -> Result<CrawlOutput, CrawlError> {
        if !self.root.is_dir() {
            return Err(CrawlError::NotADirectory(self.root.clone()));
        }
        info!(root = %self.root.display(), "Starting crawl");

        let pruned = Arc::new(AtomicUsize::new(0));
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(self.follow_symlinks);
        if self.respect_gitignore {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .ignore(true)
                .parents(true)
                .require_git(false);
        }

        let rules = Arc::clone(&self.rules);
        let root = self.root.clone();
        let pruned_in_filter = Arc::clone(&pruned);
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if entry.depth() == 0 || !is_dir {
                return true;
            }
            let rel_path = relative_path(&root, entry.path());
            let name = entry.file_name().to_string_lossy();
            if rules.prunes_folder(&rel_path, &name) {
                pruned_in_filter.fetch_add(1, Ordering::Relaxed);
                false
            } else {
                true
            }
        });

        let mut files = Vec::new();
        let mut ignored_files = 0;
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Walk error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let rel_path = relative_path(&self.root, path);
            let name = entry.file_name().to_string_lossy();
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let dotted = if extension.is_empty() {
                String::new()
            } else {
                format!(".{extension}")
            };

            let (content, kind) = match self.rules.select(&rel_path, &name, &dotted) {
                Selection::Skip => {
                    ignored_files += 1;
                    continue;
                }
                Selection::Binary => {
                    let label = if extension.is_empty() {
                        "binary"
                    } else {
                        extension.as_str()
                    };
                    (
                        format!("-- {label} file format, cannot be read as text --"),
                        RecordKind::Binary,
                    )
                }
                Selection::Read => read_text(path),
            };

            files.push(FileRecord {
                path: rel_path,
                file_type: if extension.is_empty() {
                    "unknown".to_string()
                } else {
                    extension
                },
                content,
                kind,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        let stats = CrawlStats {
            files: files.len(),
            ignored_folders: pruned.load(Ordering::Relaxed),
            ignored_files,
        };
        info!(
            files = stats.files,
            ignored_folders = stats.ignored_folders,
            ignored_files = stats.ignored_files,
            "Crawl finished"
        );
        Ok(CrawlOutput { files, stats })
    }
}

fn read_text(path: &Path) -> (String, RecordKind) {
    match std::fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => (text, RecordKind::Text),
            Err(_) => (NON_UTF8_PLACEHOLDER.to_string(), RecordKind::Unreadable),
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to read file");
            (
                format!("-- Error reading file: {e} --"),
                RecordKind::Unreadable,
            )
        }
    }
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
