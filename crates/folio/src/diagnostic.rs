//! User-facing diagnostics with line/column positions.

use folio_parser::{LineIndex, ParseError, Span};
use folio_resolve::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The document (or model) is unusable as written.
    Error,
    /// Something looks wrong but processing continues.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic tied to a source location.
///
/// Parse errors carry `P`-prefixed codes; resolution diagnostics keep
/// their `E`/`W` codes (e.g. `E1001`). Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Stable code string, e.g. `P0004` or `E1001`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// 1-based line of the start of the offending span.
    pub line: u32,
    /// 1-based column of the start of the offending span.
    pub column: u32,
    /// Byte span of the offending text.
    pub span: Span,
    /// Span of a related earlier statement, when one exists (e.g. the
    /// first of two duplicate definitions).
    pub related: Option<Span>,
}

impl Diagnostic {
    /// Build a diagnostic from a parse error.
    pub(crate) fn from_parse(error: &ParseError, source: &str, index: &LineIndex) -> Self {
        let position = index.position(source, error.span.start);
        Self {
            severity: Severity::Error,
            code: format!("P{:04}", error.kind_code()),
            message: error.message(),
            line: position.line,
            column: position.column,
            span: error.span,
            related: None,
        }
    }

    /// Build a diagnostic from a resolution error.
    pub(crate) fn from_resolve(error: &ResolveError, source: &str, index: &LineIndex) -> Self {
        let position = index.position(source, error.span.start);
        Self {
            severity: if error.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            code: error.code.code().to_string(),
            message: error.message.clone(),
            line: position.line,
            column: position.column,
            span: error.span,
            related: error.related,
        }
    }

    /// Check whether this diagnostic is a warning.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.line, self.column, self.severity, self.code, self.message
        )
    }
}
