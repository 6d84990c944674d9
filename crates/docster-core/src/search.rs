//! Keyword search over a corpus and the text rendering served to clients.
//!
//! A file matches when its content contains the keyword as a substring. For
//! each match the declaration locator is tried first; if it finds a
//! declaration of the keyword only that block is shown, otherwise the whole
//! file is.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::debug;

use crate::crawl::FileRecord;
use crate::extract::{DeclarationLocator, ExtractError};

/// How much of a matching file a [`SearchMatch`] shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Only the declaration of the keyword.
    CodeBlock,
    /// The keyword appears but is not declared here.
    FullFile,
}

/// One file that contains the keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub path: String,
    pub file_type: String,
    pub kind: MatchKind,
    /// The declaration block, or the full file content.
    pub text: String,
    /// Line of the declaration for [`MatchKind::CodeBlock`] matches.
    pub line_number: Option<usize>,
}

/// All matches for one keyword, in corpus order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub keyword: String,
    pub matches: Vec<SearchMatch>,
}

impl SearchOutcome {
    /// Number of files that contained the keyword.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Render every match as a headed, fenced section.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for m in &self.matches {
            let header = match m.kind {
                MatchKind::CodeBlock => {
                    format!("// {} (Code block for '{}')", m.path, self.keyword)
                }
                MatchKind::FullFile => {
                    format!(
                        "// {} (Keyword '{}' found - full file shown)",
                        m.path, self.keyword
                    )
                }
            };
            push_fenced(&mut out, &header, &m.file_type, &m.text);
        }
        out
    }
}

/// Search `files` for `keyword`.
///
/// The declaration patterns are compiled once for the whole corpus.
pub fn search_corpus(files: &[FileRecord], keyword: &str) -> Result<SearchOutcome, ExtractError> {
    let locator = DeclarationLocator::new(keyword)?;

    let matches: Vec<SearchMatch> = files
        .iter()
        .filter(|file| file.content.contains(keyword))
        .map(|file| match locator.extract(&file.content) {
            Some(block) => SearchMatch {
                path: file.path.clone(),
                file_type: file.file_type.clone(),
                kind: MatchKind::CodeBlock,
                text: block.as_str().trim().to_string(),
                line_number: Some(block.line_number),
            },
            None => SearchMatch {
                path: file.path.clone(),
                file_type: file.file_type.clone(),
                kind: MatchKind::FullFile,
                text: file.content.clone(),
                line_number: None,
            },
        })
        .collect();

    debug!(keyword, matches = matches.len(), "Search finished");
    Ok(SearchOutcome {
        keyword: keyword.to_string(),
        matches,
    })
}

/// Render every file of a corpus, each under a `// path` header.
pub fn format_all(files: &[FileRecord]) -> String {
    let mut out = String::new();
    for file in files {
        push_fenced(&mut out, &format!("// {}", file.path), &file.file_type, &file.content);
    }
    out
}

/// Fence label for a file type: alphanumerics only, `unknown` when empty.
fn fence_label(file_type: &str) -> &str {
    if !file_type.is_empty() && file_type.bytes().all(|b| b.is_ascii_alphanumeric()) {
        file_type
    } else {
        "unknown"
    }
}

fn push_fenced(out: &mut String, header: &str, file_type: &str, body: &str) {
    writeln!(out, "{header}\n```{}", fence_label(file_type)).ok();
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::RecordKind;
    use pretty_assertions::assert_eq;

    fn file(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            file_type: path.rsplit('.').next().unwrap_or("unknown").to_string(),
            content: content.to_string(),
            kind: RecordKind::Text,
        }
    }

    #[test]
    fn test_declaration_shows_code_block() {
        let files = vec![file(
            "src/math.ts",
            "import x from 'y';\n\nfunction add(a, b) {\n  return a + b;\n}\n",
        )];
        let outcome = search_corpus(&files, "add").unwrap();

        assert_eq!(outcome.match_count(), 1);
        assert_eq!(outcome.matches[0].kind, MatchKind::CodeBlock);
        assert_eq!(outcome.matches[0].line_number, Some(3));
        assert_eq!(
            outcome.render(),
            "// src/math.ts (Code block for 'add')\n```ts\nfunction add(a, b) {\n  return a + b;\n}\n```\n\n"
        );
    }

    #[test]
    fn test_usage_without_declaration_shows_full_file() {
        let files = vec![file("src/main.js", "console.log(add(1, 2));\n")];
        let outcome = search_corpus(&files, "add").unwrap();

        assert_eq!(outcome.matches[0].kind, MatchKind::FullFile);
        assert_eq!(
            outcome.render(),
            "// src/main.js (Keyword 'add' found - full file shown)\n```js\nconsole.log(add(1, 2));\n```\n\n"
        );
    }

    #[test]
    fn test_non_matching_files_are_omitted() {
        let files = vec![file("a.ts", "const a = 1;"), file("b.ts", "const b = 2;")];
        let outcome = search_corpus(&files, "b").unwrap();
        assert_eq!(outcome.match_count(), 1);
        assert_eq!(outcome.matches[0].path, "b.ts");
    }

    #[test]
    fn test_match_count_counts_files_not_occurrences() {
        let files = vec![
            file(
                "src/api.ts",
                "function load(url) {\n  return fetch(url);\n}\n\nload('/a');\nload('/b');\n",
            ),
            file("src/page.ts", "load('/c');\nload('/d');\n"),
            file("src/other.ts", "const unrelated = 1;\n"),
        ];
        let outcome = search_corpus(&files, "load").unwrap();

        assert_eq!(outcome.match_count(), 2);
        let paths: Vec<&str> = outcome.matches.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["src/api.ts", "src/page.ts"]);
        assert_eq!(outcome.matches[0].kind, MatchKind::CodeBlock);
        assert_eq!(
            outcome.matches[0].text,
            "function load(url) {\n  return fetch(url);\n}"
        );
        assert_eq!(outcome.matches[1].kind, MatchKind::FullFile);
        assert_eq!(outcome.matches[1].text, "load('/c');\nload('/d');\n");
    }

    #[test]
    fn test_no_matches_renders_empty() {
        let files = vec![file("a.ts", "const a = 1;")];
        let outcome = search_corpus(&files, "missing").unwrap();
        assert_eq!(outcome.match_count(), 0);
        assert_eq!(outcome.render(), "");
    }

    #[test]
    fn test_keyword_with_regex_metacharacters() {
        let files = vec![file("a.ts", "const $store = { a: 1 };\n")];
        let outcome = search_corpus(&files, "$store").unwrap();
        assert_eq!(outcome.matches[0].kind, MatchKind::CodeBlock);
        assert_eq!(outcome.matches[0].text, "const $store = { a: 1 }");
    }

    #[test]
    fn test_format_all() {
        let files = vec![file("a.ts", "let a;\n"), file("b.md", "# B")];
        assert_eq!(
            format_all(&files),
            "// a.ts\n```ts\nlet a;\n```\n\n// b.md\n```md\n# B\n```\n\n"
        );
    }

    #[test]
    fn test_fence_label() {
        assert_eq!(fence_label("ts"), "ts");
        assert_eq!(fence_label(""), "unknown");
        assert_eq!(fence_label("d.ts"), "unknown");
    }
}
