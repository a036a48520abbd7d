//! Parse error types.

use crate::Span;
use std::fmt;

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: Span,
    /// Optional context message.
    pub context: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: None,
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Get the span of this error.
    #[must_use]
    pub const fn span(&self) -> (usize, usize) {
        (self.span.start, self.span.end)
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::UnexpectedChar(_) => 1,
            ParseErrorKind::UnclosedString => 2,
            ParseErrorKind::InvalidDate(_) => 3,
            ParseErrorKind::SyntaxError(_) => 4,
            ParseErrorKind::UnexpectedEof => 5,
            ParseErrorKind::DuplicateRule { .. } => 6,
        }
    }

    /// True if the error was raised before any grammar was applied.
    #[must_use]
    pub const fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::UnexpectedChar(_)
                | ParseErrorKind::UnclosedString
                | ParseErrorKind::InvalidDate(_)
        )
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{}", self.kind)
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::UnexpectedChar(_) => "unexpected character",
            ParseErrorKind::UnclosedString => "unclosed string",
            ParseErrorKind::InvalidDate(_) => "invalid date",
            ParseErrorKind::SyntaxError(_) => "syntax error",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
            ParseErrorKind::DuplicateRule { .. } => "duplicate rule",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Character outside the recognized set.
    UnexpectedChar(char),
    /// String literal not closed before end of line.
    UnclosedString,
    /// Date token whose components do not form a real calendar date.
    InvalidDate(String),
    /// Generic syntax error (unexpected token).
    SyntaxError(String),
    /// Input ended mid-statement, typically a block missing its `END`.
    UnexpectedEof,
    /// A single-valued sub-rule appeared more than once in one block.
    DuplicateRule {
        /// The repeated sub-rule keyword, e.g. `ALIAS`.
        rule: &'static str,
        /// The kind of block, e.g. `DEFINE`.
        block: &'static str,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            Self::UnclosedString => write!(f, "unterminated string literal"),
            Self::InvalidDate(s) => write!(f, "invalid date '{s}'"),
            Self::SyntaxError(msg) => write!(f, "syntax error: {msg}"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::DuplicateRule { rule, block } => {
                write!(f, "duplicate {rule} rule in {block} block")
            }
        }
    }
}
