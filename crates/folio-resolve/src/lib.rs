//! Semantic resolution for folio documents.
//!
//! Takes the parser's statement stream and builds the immutable [`Model`],
//! collecting every semantic diagnostic in one pass:
//!
//! - Definition uniqueness (one `DEFINE` per symbol, unique portfolio and
//!   plan names)
//! - `PLAN` date ordering (`END_DATE` must not precede `START`)
//! - Value constraints (non-negative `MARK` values, strictly positive
//!   `SCHEDULE` amounts)
//! - Reference hygiene (a portfolio member without a `DEFINE` is a warning,
//!   never an error; records and schedules may also reference undefined
//!   symbols freely)
//!
//! A negative trade amount is a withdrawal, not an error.
//!
//! # Error Codes
//!
//! | Code  | Description |
//! |-------|-------------|
//! | E1001 | Duplicate `DEFINE` for a symbol |
//! | E1002 | Duplicate `PORTFOLIO` name |
//! | E1003 | Duplicate `PLAN` name |
//! | E2001 | `PLAN` end date before start date |
//! | E3001 | `SCHEDULE` amount not strictly positive |
//! | E3002 | Negative `MARK` value |
//! | E3003 | `PORTFOLIO` with no members |
//! | W4001 | Portfolio member has no `DEFINE` (warning) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;

use folio_core::{Model, Record, Statement, Symbol};
use folio_parser::{Span, Spanned};
use thiserror::Error;

/// Resolution error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // === Definition Errors (E1xxx) ===
    /// E1001: A symbol has more than one `DEFINE` block.
    DuplicateDefinition,
    /// E1002: Two portfolios share a name.
    DuplicatePortfolio,
    /// E1003: Two plans share a name.
    DuplicatePlan,

    // === Date Errors (E2xxx) ===
    /// E2001: A plan's `END_DATE` precedes its `START`.
    PlanDateOrder,

    // === Value Errors (E3xxx) ===
    /// E3001: A schedule amount is zero or negative.
    NonPositiveScheduleAmount,
    /// E3002: A mark value is negative.
    NegativeMarkValue,
    /// E3003: A portfolio has an empty member list.
    EmptyPortfolio,

    // === Reference Warnings (W4xxx) ===
    /// W4001: A portfolio member symbol has no `DEFINE` (warning).
    UndefinedMember,
}

impl ErrorCode {
    /// Get the error code string (e.g., "E1001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDefinition => "E1001",
            Self::DuplicatePortfolio => "E1002",
            Self::DuplicatePlan => "E1003",
            Self::PlanDateOrder => "E2001",
            Self::NonPositiveScheduleAmount => "E3001",
            Self::NegativeMarkValue => "E3002",
            Self::EmptyPortfolio => "E3003",
            Self::UndefinedMember => "W4001",
        }
    }

    /// Check if this is a warning (not an error).
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::UndefinedMember)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A resolution error.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct ResolveError {
    /// Error code.
    pub code: ErrorCode,
    /// Error message.
    pub message: String,
    /// Span of the offending statement.
    pub span: Span,
    /// Span of a related earlier statement, e.g. the first of two
    /// duplicate definitions.
    pub related: Option<Span>,
}

impl ResolveError {
    /// Create a new resolution error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            related: None,
        }
    }

    /// Attach the span of a related statement.
    #[must_use]
    pub const fn with_related(mut self, related: Span) -> Self {
        self.related = Some(related);
        self
    }

    /// Check if this diagnostic is a warning.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        self.code.is_warning()
    }
}

/// The outcome of resolving a statement stream.
#[derive(Debug)]
pub struct Resolution {
    /// The model built from the statements that resolved. Statements
    /// rejected by a check (e.g. a second `DEFINE`) are excluded;
    /// everything else is kept, so the model stays usable alongside
    /// its diagnostics.
    pub model: Model,
    /// All diagnostics, in source order.
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    /// True if resolution produced no diagnostics at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if any diagnostic is an error (warnings do not count).
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning())
    }
}

/// Resolve a statement stream into a [`Model`], collecting diagnostics.
///
/// All checks are independent; one pass reports everything. Duplicate
/// definitions keep the first occurrence and reject later ones.
#[must_use]
pub fn resolve(statements: &[Spanned<Statement>]) -> Resolution {
    let mut errors = Vec::new();

    let mut assets = Vec::new();
    let mut portfolios = Vec::new();
    let mut plans = Vec::new();
    let mut records = Vec::new();

    let mut defined: HashMap<Symbol, Span> = HashMap::new();
    let mut portfolio_names: HashMap<String, Span> = HashMap::new();
    let mut plan_names: HashMap<String, Span> = HashMap::new();
    // Member checks run after the pass so a DEFINE below its portfolio
    // still counts.
    let mut member_refs: Vec<(Symbol, String, Span)> = Vec::new();

    for statement in statements {
        let span = statement.span;
        match &statement.value {
            Statement::Record(record) => {
                if let Record::Mark(mark) = record {
                    if mark.value.is_negative() {
                        errors.push(ResolveError::new(
                            ErrorCode::NegativeMarkValue,
                            format!(
                                "MARK value for {} is negative ({})",
                                mark.symbol, mark.value
                            ),
                            span,
                        ));
                    }
                }
                records.push(record.clone());
            }
            Statement::Define(def) => {
                if let Some(first) = defined.get(&def.symbol) {
                    errors.push(
                        ResolveError::new(
                            ErrorCode::DuplicateDefinition,
                            format!("symbol {} is already defined", def.symbol),
                            span,
                        )
                        .with_related(*first),
                    );
                } else {
                    defined.insert(def.symbol.clone(), span);
                    assets.push(def.clone());
                }
            }
            Statement::Portfolio(portfolio) => {
                if let Some(first) = portfolio_names.get(&portfolio.name) {
                    errors.push(
                        ResolveError::new(
                            ErrorCode::DuplicatePortfolio,
                            format!("portfolio \"{}\" is already defined", portfolio.name),
                            span,
                        )
                        .with_related(*first),
                    );
                    continue;
                }
                portfolio_names.insert(portfolio.name.clone(), span);
                if portfolio.members.is_empty() {
                    errors.push(ResolveError::new(
                        ErrorCode::EmptyPortfolio,
                        format!("portfolio \"{}\" has no ASSETS", portfolio.name),
                        span,
                    ));
                }
                for member in &portfolio.members {
                    member_refs.push((member.clone(), portfolio.name.clone(), span));
                }
                portfolios.push(portfolio.clone());
            }
            Statement::Plan(plan) => {
                if let Some(first) = plan_names.get(&plan.name) {
                    errors.push(
                        ResolveError::new(
                            ErrorCode::DuplicatePlan,
                            format!("plan \"{}\" is already defined", plan.name),
                            span,
                        )
                        .with_related(*first),
                    );
                    continue;
                }
                plan_names.insert(plan.name.clone(), span);
                if let (Some(start), Some(end)) = (plan.start_date, plan.end_date) {
                    if end < start {
                        errors.push(ResolveError::new(
                            ErrorCode::PlanDateOrder,
                            format!(
                                "plan \"{}\" ends ({end}) before it starts ({start})",
                                plan.name
                            ),
                            span,
                        ));
                    }
                }
                for rule in &plan.rules {
                    if !rule.amount.is_positive() {
                        errors.push(ResolveError::new(
                            ErrorCode::NonPositiveScheduleAmount,
                            format!(
                                "schedule amount into {} must be positive (got {})",
                                rule.target, rule.amount
                            ),
                            span,
                        ));
                    }
                }
                plans.push(plan.clone());
            }
        }
    }

    for (member, portfolio_name, span) in member_refs {
        if !defined.contains_key(&member) {
            errors.push(ResolveError::new(
                ErrorCode::UndefinedMember,
                format!("portfolio \"{portfolio_name}\" lists {member} which has no DEFINE"),
                span,
            ));
        }
    }

    Resolution {
        model: Model::from_parts(assets, portfolios, plans, records),
        errors,
    }
}

/// Resolve a statement stream, failing if any non-warning error occurred.
///
/// # Errors
///
/// Returns all diagnostics (warnings included) when at least one of them
/// is an error.
pub fn resolve_strict(statements: &[Spanned<Statement>]) -> Result<Model, Vec<ResolveError>> {
    let resolution = resolve(statements);
    if resolution.has_errors() {
        Err(resolution.errors)
    } else {
        Ok(resolution.model)
    }
}
