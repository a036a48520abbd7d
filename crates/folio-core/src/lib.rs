//! Core types for folio
//!
//! This crate provides the fundamental types used throughout the folio project:
//!
//! - [`Symbol`] - A `CLASS:TICKER` identifier naming a tradeable asset
//! - [`Amount`] - A decimal number with an opaque unit label
//! - [`Statement`] - All statement types (trades, marks, defines, portfolios, plans)
//! - [`Model`] - The immutable validated document model
//!
//! # Example
//!
//! ```
//! use folio_core::{Amount, Symbol, TradeRecord};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let symbol: Symbol = "ETF:510300".parse().unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!
//! let trade = TradeRecord::new(date, symbol, Amount::new(dec!(5000), "CNY"))
//!     .with_price(dec!(4.56));
//!
//! assert!(trade.is_inflow());
//! assert_eq!(trade.amount.number, dec!(5000));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod intern;
pub mod model;
pub mod statement;
pub mod symbol;

pub use amount::Amount;
pub use intern::{InternedStr, StringInterner};
pub use model::Model;
pub use statement::{
    AssetDefinition, Frequency, MarkRecord, PlanDefinition, PortfolioDefinition, Record,
    ScheduleRule, Statement, TradeRecord,
};
pub use symbol::{ParseSymbolError, Symbol};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
