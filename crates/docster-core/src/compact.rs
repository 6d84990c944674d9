//! Source compactor: squeeze a folder of source files into one prompt-sized
//! text.
//!
//! Each file has its comments, imports and pure re-exports removed and its
//! whitespace collapsed. Comments and whitespace are found with the same
//! [`Scanner`] the brace matcher uses, so string literals are left intact.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::extract::{LexMode, Scanner};

/// Errors that abort a compaction run.
#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    #[error("invalid module statement pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// One compacted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactedFile {
    /// Path as walked, i.e. prefixed with the folder that was compacted.
    pub path: String,
    pub text: String,
}

/// Result of [`Compactor::collect`].
#[derive(Debug, Clone, Default)]
pub struct CompactOutput {
    pub files: Vec<CompactedFile>,
    /// Files that could not be read as UTF-8 text.
    pub failed: usize,
}

impl CompactOutput {
    /// The combined text, one `// --- path ---` section per file.
    pub fn render(&self) -> String {
        self.files
            .iter()
            .map(|f| format!("// --- {} ---\n{}\n\n", f.path, f.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// A line comment's newline is kept; a block comment becomes one space.
pub fn strip_comments(code: &str) -> String {
    let mut out = Vec::with_capacity(code.len());
    let mut in_block = false;
    for lexeme in Scanner::new(code) {
        match lexeme.mode {
            LexMode::BlockComment => {
                if !in_block {
                    out.push(b' ');
                }
            }
            LexMode::LineComment => {
                if lexeme.byte == b'\n' {
                    out.push(b'\n');
                }
            }
            _ => out.push(lexeme.byte),
        }
        in_block = lexeme.mode == LexMode::BlockComment;
    }
    // Only whole comments are dropped, so the bytes stay valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// Collapse whitespace outside string literals.
///
/// Runs of whitespace become a single space, and disappear entirely next to
/// `{ } ; ( ) ,` or at either end.
pub fn minify(code: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(code.len());
    let mut pending_space = false;
    for lexeme in Scanner::new(code) {
        if lexeme.mode == LexMode::Normal && lexeme.byte.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let after_tight = out.last().is_none_or(|&b| is_tight(b));
            let before_tight = lexeme.mode == LexMode::Normal && is_tight(lexeme.byte);
            if !after_tight && !before_tight {
                out.push(b' ');
            }
            pending_space = false;
        }
        out.push(lexeme.byte);
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_tight(byte: u8) -> bool {
    matches!(byte, b'{' | b'}' | b';' | b'(' | b')' | b',')
}

/// Compacts files with one extension.
#[derive(Debug, Clone)]
pub struct Compactor {
    suffix: String,
    imports: Regex,
    re_exports: Regex,
}

impl Compactor {
    /// Compactor for files named `*.{extension}`.
    pub fn new(extension: &str) -> Result<Self, CompactError> {
        Ok(Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
            // Single-line imports, or a braced list spanning lines.
            imports: Regex::new(r"(?m)^[ \t]*import[ \t][^;\n]*(?:\{[^}]*\}[^;\n]*)?;")?,
            re_exports: Regex::new(r"(?m)^[ \t]*export[ \t]*(?:\*|\{[^}]*\})[^;\n]*;")?,
        })
    }

    /// Drop import statements and `export *` / `export { … }` re-exports.
    pub fn strip_module_statements(&self, code: &str) -> String {
        let code = self.imports.replace_all(code, "");
        self.re_exports.replace_all(&code, "").into_owned()
    }

    /// Comments, module statements and whitespace removed from one file.
    pub fn compact_source(&self, code: &str) -> String {
        minify(&self.strip_module_statements(&strip_comments(code)))
    }

    /// Compact every matching file under `folder`, sorted by path.
    pub fn collect(&self, folder: &Path) -> Result<CompactOutput, CompactError> {
        if !folder.is_dir() {
            return Err(CompactError::NotADirectory(folder.to_path_buf()));
        }

        let mut output = CompactOutput::default();
        for result in WalkBuilder::new(folder).standard_filters(false).build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Walk error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file())
                || !entry.file_name().to_string_lossy().ends_with(&self.suffix)
            {
                continue;
            }

            let path = entry.path().display().to_string();
            match std::fs::read_to_string(entry.path()) {
                Ok(code) => output.files.push(CompactedFile {
                    text: self.compact_source(&code),
                    path,
                }),
                Err(e) => {
                    warn!(path, error = %e, "Skipping unreadable file");
                    output.failed += 1;
                }
            }
        }

        output.files.sort_by(|a, b| a.path.cmp(&b.path));
        info!(
            folder = %folder.display(),
            files = output.files.len(),
            failed = output.failed,
            "Compaction finished"
        );
        Ok(output)
    }
}
