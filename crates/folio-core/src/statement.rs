//! Statement types representing everything a folio document can declare.
//!
//! A document is an ordered sequence of statements:
//!
//! - [`TradeRecord`] - a dated, signed cash movement into or out of a symbol
//! - [`MarkRecord`] - a dated total-valuation snapshot for a symbol
//! - [`AssetDefinition`] - display metadata for a symbol (`DEFINE ... END`)
//! - [`PortfolioDefinition`] - a named group of symbols (`PORTFOLIO ... END`)
//! - [`PlanDefinition`] - recurring contribution schedules (`PLAN ... END`)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, Symbol};

/// How often a schedule rule recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every month, anchored to the start day-of-month.
    Monthly,
    /// Every 3 months, anchored to the start day-of-month.
    Quarterly,
    /// Every 12 months, anchored to the start day-of-month.
    Yearly,
}

impl Frequency {
    /// Step size in days for day-based frequencies, `None` for month-based.
    pub const fn step_days(self) -> Option<u64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly | Self::Quarterly | Self::Yearly => None,
        }
    }

    /// Step size in months for month-based frequencies, `None` for day-based.
    pub const fn step_months(self) -> Option<u32> {
        match self {
            Self::Daily | Self::Weekly => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
        };
        write!(f, "{name}")
    }
}

/// A dated, signed cash movement into or out of a symbol.
///
/// Negative amounts are withdrawals; they are legitimate records, not
/// errors. The legacy `BUY`/`SELL` grammar is normalized into this shape
/// during parsing and carries no extra semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Date of the trade.
    pub date: NaiveDate,
    /// The traded asset.
    pub symbol: Symbol,
    /// Signed cash amount with its unit.
    pub amount: Amount,
    /// Optional per-unit price.
    pub price: Option<Decimal>,
    /// Optional free-text note from a trailing `NOTE` line.
    pub note: Option<String>,
}

impl TradeRecord {
    /// Create a trade record.
    pub const fn new(date: NaiveDate, symbol: Symbol, amount: Amount) -> Self {
        Self {
            date,
            symbol,
            amount,
            price: None,
            note: None,
        }
    }

    /// Attach a per-unit price.
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether this trade moves cash into the position.
    pub const fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    /// Whether this trade moves cash out of the position.
    pub const fn is_outflow(&self) -> bool {
        self.amount.is_negative()
    }
}

/// A dated total-valuation snapshot for a symbol.
///
/// The value is the worth of the whole position at that date, not a
/// per-unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRecord {
    /// Date of the valuation.
    pub date: NaiveDate,
    /// The valued asset.
    pub symbol: Symbol,
    /// Total position value with its unit.
    pub value: Amount,
    /// Optional free-text note from a trailing `NOTE` line.
    pub note: Option<String>,
}

impl MarkRecord {
    /// Create a mark record.
    pub const fn new(date: NaiveDate, symbol: Symbol, value: Amount) -> Self {
        Self {
            date,
            symbol,
            value,
            note: None,
        }
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A dated activity record, either a trade or a mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// A signed cash movement.
    Trade(TradeRecord),
    /// A total-valuation snapshot.
    Mark(MarkRecord),
}

impl Record {
    /// Date of the underlying record.
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Trade(t) => t.date,
            Self::Mark(m) => m.date,
        }
    }

    /// Symbol the record refers to.
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::Trade(t) => &t.symbol,
            Self::Mark(m) => &m.symbol,
        }
    }

    /// Note attached to the record, if any.
    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Trade(t) => t.note.as_deref(),
            Self::Mark(m) => m.note.as_deref(),
        }
    }
}

/// Display metadata for a symbol, from a `DEFINE` block.
///
/// At most one definition may exist per symbol; a second `DEFINE` for the
/// same symbol is a semantic error, never a silent overwrite. Records and
/// portfolios may reference symbols that have no definition at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDefinition {
    /// The defined symbol.
    pub symbol: Symbol,
    /// Optional display name.
    pub alias: Option<String>,
    /// Optional target return as a fraction (0.09 = 9%).
    pub target_return: Option<Decimal>,
}

impl AssetDefinition {
    /// Create a definition with no metadata.
    pub const fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            alias: None,
            target_return: None,
        }
    }

    /// Attach a display alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Attach a target return.
    pub const fn with_target_return(mut self, target: Decimal) -> Self {
        self.target_return = Some(target);
        self
    }
}

/// A named, ordered group of symbols, from a `PORTFOLIO` block.
///
/// Membership is by symbol value only; members need not be defined
/// anywhere else. The portfolio-level target return coexists with any
/// per-asset targets and is never combined with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDefinition {
    /// Unique portfolio name.
    pub name: String,
    /// Ordered member symbols; must be non-empty after resolution.
    pub members: Vec<Symbol>,
    /// Optional target return as a fraction.
    pub target_return: Option<Decimal>,
}

impl PortfolioDefinition {
    /// Create a portfolio with the given members.
    pub fn new(name: impl Into<String>, members: Vec<Symbol>) -> Self {
        Self {
            name: name.into(),
            members,
            target_return: None,
        }
    }

    /// Attach a target return.
    pub const fn with_target_return(mut self, target: Decimal) -> Self {
        self.target_return = Some(target);
        self
    }
}

/// One recurring contribution inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    /// How often the contribution recurs.
    pub frequency: Frequency,
    /// Contribution amount per occurrence; must be strictly positive.
    pub amount: Amount,
    /// The symbol the contribution flows into.
    pub target: Symbol,
}

impl ScheduleRule {
    /// Create a schedule rule.
    pub const fn new(frequency: Frequency, amount: Amount, target: Symbol) -> Self {
        Self {
            frequency,
            amount,
            target,
        }
    }
}

/// A named set of recurring contribution schedules, from a `PLAN` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDefinition {
    /// Unique plan name.
    pub name: String,
    /// The plan's schedule rules, in source order.
    pub rules: Vec<ScheduleRule>,
    /// First date contributions occur.
    pub start_date: Option<NaiveDate>,
    /// Last date contributions may occur; open-ended when absent.
    pub end_date: Option<NaiveDate>,
}

impl PlanDefinition {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }

    /// Append a schedule rule.
    pub fn with_rule(mut self, rule: ScheduleRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the start date.
    pub const fn with_start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the end date.
    pub const fn with_end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Whether the plan has no end date.
    pub const fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }
}

/// A top-level statement of a folio document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// A dated trade or mark.
    Record(Record),
    /// A `DEFINE` block.
    Define(AssetDefinition),
    /// A `PORTFOLIO` block.
    Portfolio(PortfolioDefinition),
    /// A `PLAN` block.
    Plan(PlanDefinition),
}

impl Statement {
    /// Date of the statement, for records only.
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Record(r) => Some(r.date()),
            _ => None,
        }
    }
}
