use std::fmt;

use thiserror::Error;

/// A position in the original source, when the external frontend supplies one.
///
/// Full source-position plumbing (file ids, byte offsets) is external to this crate; this shape
/// is kept deliberately small so a real frontend can populate it without this crate depending on
/// its representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Fatal errors raised while lowering a single method (§7).
///
/// Every variant here aborts lowering of *this method only*; the driver (external to this crate)
/// is expected to collect one of these per failed method and continue with the rest of the
/// program, per the "No partial IR is ever emitted for a failed lowering" policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("unresolved symbol `{name}` at {span:?}")]
    UnresolvedSymbol { name: String, span: Option<SourceSpan> },

    #[error("unsupported syntax: {description} at {span:?}")]
    UnsupportedSyntax { description: String, span: Option<SourceSpan> },

    #[error("scope misuse: {description} at {span:?}")]
    ScopeMisuse { description: String, span: Option<SourceSpan> },
}
