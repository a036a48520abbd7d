//! Asset symbols of the form `CLASS:TICKER`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intern::InternedStr;

/// Identifies a tradeable asset by asset class and ticker.
///
/// The canonical text form is `CLASS:TICKER`, e.g. `ETF:510300` or
/// `STOCK:AAPL`. Symbols are plain values: every reference to an asset in
/// records, portfolios, and schedules is a `Symbol`, never an owning link
/// to an asset definition.
///
/// # Examples
///
/// ```
/// use folio_core::Symbol;
///
/// let symbol: Symbol = "ETF:510300".parse().unwrap();
/// assert_eq!(symbol.class.as_str(), "ETF");
/// assert_eq!(symbol.ticker.as_str(), "510300");
/// assert_eq!(symbol.to_string(), "ETF:510300");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    /// The asset class component, e.g. `ETF` or `STOCK`.
    pub class: InternedStr,
    /// The ticker component, e.g. `510300` or `AAPL`.
    pub ticker: InternedStr,
}

impl Symbol {
    /// Create a symbol from its two components.
    pub fn new(class: impl Into<InternedStr>, ticker: impl Into<InternedStr>) -> Self {
        Self {
            class: class.into(),
            ticker: ticker.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.ticker)
    }
}

/// Error returned when a string is not a well-formed `CLASS:TICKER` symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSymbolError {
    /// The separating colon is missing.
    #[error("symbol '{0}' is missing the ':' separator")]
    MissingSeparator(String),
    /// The class component is empty or not `[A-Z][A-Z0-9_]*`.
    #[error("invalid asset class '{0}'")]
    InvalidClass(String),
    /// The ticker component is empty or not `[A-Z0-9_]+`.
    #[error("invalid ticker '{0}'")]
    InvalidTicker(String),
}

fn is_valid_class(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('A'..='Z'))
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_valid_ticker(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for Symbol {
    type Err = ParseSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class, ticker) = s
            .split_once(':')
            .ok_or_else(|| ParseSymbolError::MissingSeparator(s.to_string()))?;
        if !is_valid_class(class) {
            return Err(ParseSymbolError::InvalidClass(class.to_string()));
        }
        if !is_valid_ticker(ticker) {
            return Err(ParseSymbolError::InvalidTicker(ticker.to_string()));
        }
        Ok(Self::new(class, ticker))
    }
}
