//! High-level API over the folio pipeline.
//!
//! This crate wires the parser, resolver, and engine into one surface:
//! parse a document, resolve it into a model, then query positions,
//! portfolio values, plan projections, and returns.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use folio_core::Symbol;
//!
//! let source = r#"
//! 2024-01-02 TRADE ETF:510300 +8000 CNY @ 3.45
//! 2024-01-15 MARK ETF:510300 VALUE 8800 CNY
//! "#;
//!
//! let document = folio::parse(source).unwrap();
//! let model = folio::resolve(&document).unwrap();
//! let as_of = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let snapshot = folio::position(&model, &Symbol::new("ETF", "510300"), as_of).unwrap();
//! assert_eq!(snapshot.contributions.to_string(), "8000");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod diagnostic;

pub use diagnostic::{Diagnostic, Severity};

pub use folio_core::{Amount, Model, Statement, Symbol};
pub use folio_engine::{
    IntervalReturn, MarkPoint, PortfolioSnapshot, PositionSnapshot, ScheduleError, ScheduleEvent,
};
pub use folio_parser::{LineIndex, Span, Spanned};

use chrono::NaiveDate;
use folio_engine::{expand_all_plans, ledger, returns};
use rust_decimal::Decimal;
use thiserror::Error;

/// A parsed document: the source text plus its statement stream.
///
/// Documents are immutable. [`Document::append`] produces a new
/// generation and leaves the original untouched, so callers can keep
/// querying a model built from an older generation while editing.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    statements: Vec<Spanned<Statement>>,
}

impl Document {
    /// The source text this document was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed statements, in source order.
    #[must_use]
    pub fn statements(&self) -> &[Spanned<Statement>] {
        &self.statements
    }

    /// Parse `more` appended to this document's source, producing a new
    /// generation. Spans in the result are offsets into the combined
    /// source. Fails if the combined text has parse errors.
    pub fn append(&self, more: &str) -> Result<Self, Vec<Diagnostic>> {
        let mut combined = self.source.clone();
        if !combined.ends_with('\n') && !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(more);
        parse(&combined)
    }
}

/// Errors raised by model queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No portfolio with the given name exists in the model.
    #[error("unknown portfolio: {0}")]
    UnknownPortfolio(String),
    /// No plan with the given name exists in the model.
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    /// A plan could not be expanded.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// The target of a return query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnTarget {
    /// A single asset.
    Symbol(Symbol),
    /// A portfolio, by name.
    Portfolio(String),
}

/// Parse source text into a [`Document`].
///
/// # Errors
///
/// Fails with one [`Diagnostic`] per parse error. Recovery inside the
/// parser means a single bad statement yields a focused diagnostic
/// rather than poisoning the rest of the report.
pub fn parse(text: &str) -> Result<Document, Vec<Diagnostic>> {
    let result = folio_parser::parse(text);
    if result.errors.is_empty() {
        Ok(Document {
            source: text.to_string(),
            statements: result.statements,
        })
    } else {
        let index = LineIndex::new(text);
        Err(result
            .errors
            .iter()
            .map(|error| Diagnostic::from_parse(error, text, &index))
            .collect())
    }
}

/// Resolve a document into a queryable [`Model`].
///
/// Warnings (`W`-coded diagnostics) never fail resolution. Any error
/// does, and the returned list then carries every diagnostic, warnings
/// included. Callers who want the partial model alongside errors can
/// use `folio_resolve::resolve` directly.
pub fn resolve(document: &Document) -> Result<Model, Vec<Diagnostic>> {
    let resolution = folio_resolve::resolve(document.statements());
    if resolution.has_errors() {
        let index = LineIndex::new(document.source());
        Err(resolution
            .errors
            .iter()
            .map(|error| Diagnostic::from_resolve(error, document.source(), &index))
            .collect())
    } else {
        Ok(resolution.model)
    }
}

/// Snapshot one symbol's position as of a date.
///
/// Every plan in the model is expanded with `horizon = as_of`, so
/// open-ended plans are bounded by the query date rather than needing
/// an explicit horizon.
pub fn position(
    model: &Model,
    symbol: &Symbol,
    as_of: NaiveDate,
) -> Result<PositionSnapshot, QueryError> {
    let plan_events = expand_all_plans(model, Some(as_of))?;
    Ok(ledger::position(model, symbol, &plan_events, as_of))
}

/// Snapshot a named portfolio as of a date.
///
/// Plans are expanded with `horizon = as_of`, as in [`position`].
/// Members without a mark at or before `as_of` contribute nothing to
/// the value and are listed in the snapshot's `stale` field.
pub fn portfolio_value(
    model: &Model,
    name: &str,
    as_of: NaiveDate,
) -> Result<PortfolioSnapshot, QueryError> {
    let definition = model
        .portfolio(name)
        .ok_or_else(|| QueryError::UnknownPortfolio(name.to_string()))?;
    let plan_events = expand_all_plans(model, Some(as_of))?;
    Ok(ledger::portfolio(model, definition, &plan_events, as_of))
}

/// Expand one named plan up to a horizon.
///
/// The horizon is optional for plans with an `END_DATE`; open-ended
/// plans require one.
pub fn plan_projection(
    model: &Model,
    name: &str,
    horizon: Option<NaiveDate>,
) -> Result<Vec<ScheduleEvent>, QueryError> {
    let plan = model
        .plan(name)
        .ok_or_else(|| QueryError::UnknownPlan(name.to_string()))?;
    Ok(folio_engine::schedule::expand_plan(plan, horizon)?)
}

/// Compute the return of a symbol or portfolio between two dates.
///
/// Modified Dietz between the last marks at or before `from` and `to`;
/// when no mark exists at or before `from`, the simple aggregate return
/// since inception. `Ok(None)` when the target has no usable marks or
/// the formula is undefined (e.g. zero denominator).
pub fn return_since(
    model: &Model,
    target: &ReturnTarget,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Option<Decimal>, QueryError> {
    let plan_events = expand_all_plans(model, Some(to))?;
    let (marks, flows) = match target {
        ReturnTarget::Symbol(symbol) => {
            let events = ledger::timeline(model, symbol, &plan_events);
            (ledger::marks(&events), ledger::cash_flows(&events))
        }
        ReturnTarget::Portfolio(name) => {
            let definition = model
                .portfolio(name)
                .ok_or_else(|| QueryError::UnknownPortfolio(name.clone()))?;
            (
                ledger::portfolio_marks(model, definition, &plan_events),
                ledger::portfolio_cash_flows(model, definition, &plan_events),
            )
        }
    };
    Ok(returns::return_since(&marks, &flows, from, to))
}
