//! Declaration locator: finds a named declaration and cuts out its block.
//!
//! Three JavaScript/TypeScript-style declaration shapes are recognised, line
//! by line, in a fixed order:
//!
//! 1. `function name(` (optionally `async`)
//! 2. `const name = (args) =>` / `let name = arg =>`
//! 3. `const name = …`, `let name: T`, `var name;` at the start of a line
//!
//! The first line matching any shape wins. From there the block runs to the
//! brace matching the first `{` at or after that line. This is a heuristic:
//! an identifier that only appears inside a string or as a property access
//! can still be picked up, and shadowing is not resolved.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use tracing::debug;

use super::ExtractError;
use super::brace::find_matching_brace;

/// Appended to a fallback window when the block's closing brace is missing.
pub const TRUNCATION_MARKER: &str = "... (Block end not reliably found)";

/// Number of lines returned, starting at the declaration, when the block end
/// cannot be found.
pub const FALLBACK_WINDOW_LINES: usize = 5;

/// Which declaration pattern matched the candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationShape {
    Function,
    ArrowFunction,
    Variable,
}

impl fmt::Display for DeclarationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationShape::Function => write!(f, "function"),
            DeclarationShape::ArrowFunction => write!(f, "arrow function"),
            DeclarationShape::Variable => write!(f, "variable"),
        }
    }
}

/// How the extent of an [`ExtractedBlock`] was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// From the declaration line through the matching closing brace.
    Braced,
    /// The declaration line alone; no `{` follows it anywhere.
    Bare,
    /// A fixed window of lines ending in [`TRUNCATION_MARKER`].
    Truncated,
}

/// A declaration cut out of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock<'a> {
    /// The extracted text. Borrowed unless the block was truncated.
    pub text: Cow<'a, str>,
    pub kind: BlockKind,
    pub shape: DeclarationShape,
    /// 1-based line number of the declaration.
    pub line_number: usize,
    /// Byte offset of the declaration line in the source.
    pub start: usize,
}

impl ExtractedBlock<'_> {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Detach the block from the source text it borrows from.
    pub fn into_owned(self) -> ExtractedBlock<'static> {
        ExtractedBlock {
            text: Cow::Owned(self.text.into_owned()),
            kind: self.kind,
            shape: self.shape,
            line_number: self.line_number,
            start: self.start,
        }
    }
}

impl fmt::Display for ExtractedBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A line of source text and the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    start: usize,
    text: &'a str,
}

/// Split on `\n`, dropping a trailing `\r`, while keeping exact byte offsets.
fn split_lines(content: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for piece in content.split_inclusive('\n') {
        let text = match piece.strip_suffix('\n') {
            Some(body) => body.strip_suffix('\r').unwrap_or(body),
            None => piece,
        };
        lines.push(Line { start, text });
        start += piece.len();
    }
    lines
}

/// The three declaration patterns compiled for one identifier.
///
/// Compile once and reuse across files when searching a whole corpus.
#[derive(Debug, Clone)]
pub struct DeclarationLocator {
    function: Regex,
    arrow: Regex,
    variable: Regex,
}

impl DeclarationLocator {
    /// Compile the patterns for `identifier`, which is matched literally.
    pub fn new(identifier: &str) -> Result<Self, ExtractError> {
        let id = regex::escape(identifier);
        Ok(Self {
            function: Regex::new(&format!(r"(?:async\s+)?function\s+{id}\s*\("))?,
            arrow: Regex::new(&format!(
                r"(?:const|let|var)\s+{id}\s*=\s*(?:\([^)]*\)|[\w$]+)\s*=>"
            ))?,
            variable: Regex::new(&format!(r"^(?:const|let|var)\s+{id}\s*(?:[=:]|;|$)"))?,
        })
    }

    /// Test one line against the shapes, in order.
    ///
    /// The variable shape is anchored, so it is tested on the line with
    /// surrounding whitespace trimmed.
    pub fn match_shape(&self, line: &str) -> Option<DeclarationShape> {
        if self.function.is_match(line) {
            Some(DeclarationShape::Function)
        } else if self.arrow.is_match(line) {
            Some(DeclarationShape::ArrowFunction)
        } else if self.variable.is_match(line.trim()) {
            Some(DeclarationShape::Variable)
        } else {
            None
        }
    }

    /// Extract the first declaration of the identifier from `content`.
    ///
    /// Returns `None` only when no line matches any declaration shape.
    pub fn extract<'a>(&self, content: &'a str) -> Option<ExtractedBlock<'a>> {
        let lines = split_lines(content);
        let (index, shape) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| self.match_shape(line.text).map(|shape| (i, shape)))?;
        let line = lines[index];

        let block = |text: Cow<'a, str>, kind: BlockKind| ExtractedBlock {
            text,
            kind,
            shape,
            line_number: index + 1,
            start: line.start,
        };

        // First `{` on the candidate line, else on any line after it.
        let Some(open) = content[line.start..].find('{').map(|i| line.start + i) else {
            return Some(block(Cow::Borrowed(line.text), BlockKind::Bare));
        };

        match find_matching_brace(content, open) {
            Some(close) => Some(block(
                Cow::Borrowed(&content[line.start..=close]),
                BlockKind::Braced,
            )),
            None => {
                let end = (index + FALLBACK_WINDOW_LINES).min(lines.len());
                let window: Vec<&str> = lines[index..end].iter().map(|l| l.text).collect();
                let text = format!("{}\n{TRUNCATION_MARKER}\n", window.join("\n"));
                Some(block(Cow::Owned(text), BlockKind::Truncated))
            }
        }
    }
}

/// Extract the first declaration of `identifier` from `content`.
///
/// Convenience wrapper over [`DeclarationLocator`] for one-off lookups. It
/// compiles the patterns on every call; build a locator once when looking up
/// the same identifier in many files, as [`crate::search::search_corpus`]
/// does.
///
/// ```
/// use docster_core::extract::extract_code_block;
///
/// let block = extract_code_block("function foo() {\n  return 1;\n}", "foo").unwrap();
/// assert_eq!(block.as_str(), "function foo() {\n  return 1;\n}");
/// ```
pub fn extract_code_block<'a>(content: &'a str, identifier: &str) -> Option<ExtractedBlock<'a>> {
    match DeclarationLocator::new(identifier) {
        Ok(locator) => locator.extract(content),
        Err(e) => {
            debug!(identifier, error = %e, "Could not build declaration patterns");
            None
        }
    }
}
