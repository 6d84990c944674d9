//! Quote- and comment-aware delimiter matching.

use super::scan::{LexMode, Scanner};

/// A pair of ASCII delimiters the matcher can balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{` … `}`
    Brace,
    /// `(` … `)`
    Paren,
    /// `[` … `]`
    Bracket,
}

impl Delimiter {
    pub fn open(self) -> u8 {
        match self {
            Delimiter::Brace => b'{',
            Delimiter::Paren => b'(',
            Delimiter::Bracket => b'[',
        }
    }

    pub fn close(self) -> u8 {
        match self {
            Delimiter::Brace => b'}',
            Delimiter::Paren => b')',
            Delimiter::Bracket => b']',
        }
    }
}

/// Find the `}` matching the `{` at `start`, or at the first `{` after it.
///
/// Braces inside string literals and comments are not counted. Returns the
/// byte offset of the closing brace, or `None` when `start` is out of
/// bounds, no `{` follows it, or the block is never closed (including when
/// an unterminated string or comment swallows the rest of the input).
///
/// ```
/// use docster_core::extract::find_matching_brace;
///
/// assert_eq!(find_matching_brace(r#"{ "}" }"#, 0), Some(6));
/// assert_eq!(find_matching_brace("{ never closed", 0), None);
/// ```
pub fn find_matching_brace(text: &str, start: usize) -> Option<usize> {
    find_matching_delimiter(text, start, Delimiter::Brace)
}

/// [`find_matching_brace`] for an arbitrary [`Delimiter`] pair.
pub fn find_matching_delimiter(text: &str, start: usize, delimiter: Delimiter) -> Option<usize> {
    let bytes = text.as_bytes();
    let (open, close) = (delimiter.open(), delimiter.close());

    // The forward search is a raw byte search, like a plain `find`.
    let first = if *bytes.get(start)? == open {
        start
    } else {
        start + bytes[start..].iter().position(|&b| b == open)?
    };

    let mut depth = 0usize;
    for lexeme in Scanner::starting_at(text, first) {
        if lexeme.mode != LexMode::Normal {
            continue;
        }
        if lexeme.byte == open {
            depth += 1;
        } else if lexeme.byte == close {
            // `first` is an opener, so depth is at least 1 here.
            depth -= 1;
            if depth == 0 {
                return Some(lexeme.offset);
            }
        }
    }
    None
}
