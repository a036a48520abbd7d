//! Folio DSL parser using chumsky parser combinators.
//!
//! This crate turns folio source text into a stream of
//! [`Statement`]s, along with any parse errors.
//!
//! # Features
//!
//! - Unified `TRADE`/`MARK` records and `DEFINE`/`PORTFOLIO`/`PLAN` blocks
//! - Legacy `BUY`/`SELL ... OF` records, normalized at parse time
//! - Error recovery (continues parsing after errors)
//! - Precise source locations for error reporting
//!
//! # Example
//!
//! ```
//! use folio_parser::parse;
//!
//! let source = r#"
//! 2024-01-15 TRADE ETF:510300 +5000 CNY @ 4.56
//! NOTE "Opening position"
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.statements.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod lexer;
mod parser;
mod span;

pub use error::{ParseError, ParseErrorKind};
pub use span::{LineIndex, Position, Span, Spanned};

use folio_core::Statement;

/// Result of parsing a folio document.
#[derive(Debug)]
pub struct ParseResult {
    /// Successfully parsed statements, in source order.
    pub statements: Vec<Spanned<Statement>>,
    /// Parse errors encountered.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// True if parsing produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse folio source code.
///
/// Never fails outright: recoverable errors are accumulated in the result
/// alongside the statements that did parse.
pub fn parse(source: &str) -> ParseResult {
    parser::parse(source)
}

/// Parse folio source code, returning only statements and errors.
pub fn parse_statements(source: &str) -> (Vec<Spanned<Statement>>, Vec<ParseError>) {
    let result = parse(source);
    (result.statements, result.errors)
}
