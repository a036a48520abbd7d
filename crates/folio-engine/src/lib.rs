//! Evaluation engine for folio models.
//!
//! Three stages, all pure functions over an immutable [`Model`]:
//!
//! - [`schedule`]: expand recurring plans into dated virtual trades
//! - [`ledger`]: merge records and virtual trades into per-symbol
//!   timelines and replay them into position/portfolio snapshots
//! - [`returns`]: Modified-Dietz and simple aggregate return metrics
//!
//! Evaluation never mutates the model, so concurrent read-only queries
//! against one model need no synchronization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ledger;
pub mod returns;
pub mod schedule;

pub use folio_core::Model;
pub use ledger::{
    CashFlow, EventKind, EventSource, MarkPoint, PortfolioSnapshot, PositionSnapshot,
    TimelineEvent,
};
pub use returns::IntervalReturn;
pub use schedule::{ScheduleError, ScheduleEvent};

use chrono::NaiveDate;

/// Expand every plan in a model against one horizon.
///
/// The result feeds [`ledger::timeline`] so that position queries see
/// plan-generated flows. Events keep plan order first, then per-plan
/// date order.
///
/// # Errors
///
/// Fails with the first [`ScheduleError`] hit; a model whose plans lack
/// anchors cannot be projected.
pub fn expand_all_plans(
    model: &Model,
    horizon: Option<NaiveDate>,
) -> Result<Vec<ScheduleEvent>, ScheduleError> {
    let mut events = Vec::new();
    for plan in model.plans() {
        events.extend(schedule::expand_plan(plan, horizon)?);
    }
    Ok(events)
}
