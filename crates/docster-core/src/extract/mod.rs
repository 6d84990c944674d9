//! Code-block extraction engine.
//!
//! Two composable pieces, both pure functions of their input:
//!
//! 1. **Brace matcher** ([`find_matching_brace`]): given text and an offset,
//!    finds the closing brace that balances the opening one, skipping braces
//!    inside strings and comments.
//! 2. **Declaration locator** ([`extract_code_block`], [`DeclarationLocator`]):
//!    given a file and an identifier, finds the declaring line and cuts the
//!    block out with the brace matcher.
//!
//! ```text
//!   content, "foo"
//!        │
//!   ┌────▼──────────────┐   first `{`    ┌───────────────┐
//!   │ DeclarationLocator│───────────────▶│ brace matcher │
//!   │  function / arrow │◀───────────────│  (scan.rs)    │
//!   │  / variable       │  matching `}`  └───────────────┘
//!   └────┬──────────────┘
//!        ▼
//!   ExtractedBlock { Braced | Bare | Truncated }
//! ```

pub mod brace;
pub mod declaration;
pub mod scan;

pub use brace::{Delimiter, find_matching_brace, find_matching_delimiter};
pub use declaration::{
    BlockKind, DeclarationLocator, DeclarationShape, ExtractedBlock, TRUNCATION_MARKER,
    extract_code_block,
};
pub use scan::{LexMode, Lexeme, Scanner};

/// Errors from building declaration patterns.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}
