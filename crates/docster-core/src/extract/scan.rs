//! Byte-level lexical scanner shared by the brace matcher and the compactor.
//!
//! The scanner classifies every byte of its input into exactly one
//! [`LexMode`]. It understands `//` and `/* */` comments plus single, double
//! and backtick quoted strings with backslash escapes, and nothing else.
//! All syntax it reacts to is ASCII, so UTF-8 continuation bytes are always
//! classified together with the character they belong to.

/// The lexical mode a byte was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    #[default]
    Normal,
    LineComment,
    BlockComment,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
}

impl LexMode {
    /// Whether the mode is one of the three quoted modes.
    pub fn is_quoted(self) -> bool {
        matches!(
            self,
            LexMode::SingleQuoted | LexMode::DoubleQuoted | LexMode::Backticked
        )
    }

    fn closing_quote(self) -> Option<u8> {
        match self {
            LexMode::SingleQuoted => Some(b'\''),
            LexMode::DoubleQuoted => Some(b'"'),
            LexMode::Backticked => Some(b'`'),
            _ => None,
        }
    }
}

/// One input byte together with the mode it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub offset: usize,
    pub byte: u8,
    pub mode: LexMode,
}

/// Second half of a two-byte token (`//`, `/*`, `*/`, or an escape pair).
#[derive(Debug, Clone, Copy)]
struct Pending {
    within: LexMode,
    then: LexMode,
}

/// Iterator over [`Lexeme`]s, starting in [`LexMode::Normal`].
///
/// Quote and comment openers, closers and escape pairs are reported in the
/// mode they delimit, so a `Normal` lexeme is always plain code.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    mode: LexMode,
    pending: Option<Pending>,
}

impl<'a> Scanner<'a> {
    /// Scan `text` from its first byte.
    pub fn new(text: &'a str) -> Self {
        Self::starting_at(text, 0)
    }

    /// Scan `text` from byte `offset`, assuming `Normal` mode there.
    pub fn starting_at(text: &'a str, offset: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: offset,
            mode: LexMode::Normal,
            pending: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn pend(&mut self, within: LexMode, then: LexMode) {
        self.pending = Some(Pending { within, then });
    }
}

impl Iterator for Scanner<'_> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Lexeme> {
        let offset = self.pos;
        let byte = *self.bytes.get(offset)?;
        self.pos += 1;

        if let Some(pending) = self.pending.take() {
            self.mode = pending.then;
            return Some(Lexeme {
                offset,
                byte,
                mode: pending.within,
            });
        }

        let mode = match self.mode {
            LexMode::LineComment => {
                if byte == b'\n' {
                    self.mode = LexMode::Normal;
                }
                LexMode::LineComment
            }
            LexMode::BlockComment => {
                if byte == b'*' && self.peek() == Some(b'/') {
                    self.pend(LexMode::BlockComment, LexMode::Normal);
                }
                LexMode::BlockComment
            }
            quoted if quoted.is_quoted() => {
                if byte == b'\\' {
                    self.pend(quoted, quoted);
                } else if Some(byte) == quoted.closing_quote() {
                    self.mode = LexMode::Normal;
                }
                quoted
            }
            _ => match (byte, self.peek()) {
                (b'/', Some(b'/')) => {
                    self.pend(LexMode::LineComment, LexMode::LineComment);
                    LexMode::LineComment
                }
                (b'/', Some(b'*')) => {
                    self.pend(LexMode::BlockComment, LexMode::BlockComment);
                    LexMode::BlockComment
                }
                (b'\'', _) => {
                    self.mode = LexMode::SingleQuoted;
                    LexMode::SingleQuoted
                }
                (b'"', _) => {
                    self.mode = LexMode::DoubleQuoted;
                    LexMode::DoubleQuoted
                }
                (b'`', _) => {
                    self.mode = LexMode::Backticked;
                    LexMode::Backticked
                }
                _ => LexMode::Normal,
            },
        };

        Some(Lexeme { offset, byte, mode })
    }
}
