//! Recurring-schedule expansion.
//!
//! Turns a plan's schedule rules into a finite, ordered list of virtual
//! trades. Day-based frequencies step by a fixed number of days; month-based
//! frequencies step by occurrence index from the anchor start date, so a
//! plan anchored on the 31st lands on Feb 29 in a leap year and returns to
//! the 31st in March.

use chrono::{Days, Months, NaiveDate};
use folio_core::{Amount, PlanDefinition, ScheduleRule, Symbol};
use thiserror::Error;

/// Errors raised when a plan cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The plan has no `START` date and the caller supplied no default.
    #[error("plan \"{0}\" has no START date")]
    MissingStartDate(String),
    /// The plan has no `END_DATE` and the caller supplied no horizon;
    /// refusing to produce an unbounded sequence.
    #[error("open-ended plan \"{0}\" requires a horizon")]
    OpenEndedWithoutHorizon(String),
}

/// One virtual trade produced by schedule expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    /// Occurrence date.
    pub date: NaiveDate,
    /// Target symbol of the contribution.
    pub symbol: Symbol,
    /// Contributed amount (always positive after resolution).
    pub amount: Amount,
}

/// Expand a single rule over `[start, until]`, inclusive on both ends.
///
/// Month-based frequencies are computed as `start + i * step` rather than
/// by repeated addition, so clamping in a short month does not shift later
/// occurrences off the anchor's day-of-month.
#[must_use]
pub fn expand_rule(rule: &ScheduleRule, start: NaiveDate, until: NaiveDate) -> Vec<ScheduleEvent> {
    let mut events = Vec::new();
    if let Some(days) = rule.frequency.step_days() {
        let mut date = start;
        while date <= until {
            events.push(event_for(rule, date));
            match date.checked_add_days(Days::new(days)) {
                Some(next) => date = next,
                None => break,
            }
        }
    } else if let Some(step) = rule.frequency.step_months() {
        for occurrence in 0u32.. {
            let Some(months) = occurrence.checked_mul(step) else {
                break;
            };
            let Some(date) = start.checked_add_months(Months::new(months)) else {
                break;
            };
            if date > until {
                break;
            }
            events.push(event_for(rule, date));
        }
    }
    events
}

/// Expand every rule of a plan up to `min(end_date, horizon)`.
///
/// Events are ordered by date; on the same date, rules fire in the order
/// they appear in the plan.
///
/// # Errors
///
/// [`ScheduleError::MissingStartDate`] when the plan has no `START`;
/// [`ScheduleError::OpenEndedWithoutHorizon`] when it has neither an
/// `END_DATE` nor a caller-supplied horizon.
pub fn expand_plan(
    plan: &PlanDefinition,
    horizon: Option<NaiveDate>,
) -> Result<Vec<ScheduleEvent>, ScheduleError> {
    let start = plan
        .start_date
        .ok_or_else(|| ScheduleError::MissingStartDate(plan.name.clone()))?;

    let until = match (plan.end_date, horizon) {
        (Some(end), Some(horizon)) => end.min(horizon),
        (Some(end), None) => end,
        (None, Some(horizon)) => horizon,
        (None, None) => return Err(ScheduleError::OpenEndedWithoutHorizon(plan.name.clone())),
    };

    let mut events = Vec::new();
    for rule in &plan.rules {
        events.extend(expand_rule(rule, start, until));
    }
    // Stable: same-date events keep rule order.
    events.sort_by_key(|e| e.date);
    Ok(events)
}

fn event_for(rule: &ScheduleRule, date: NaiveDate) -> ScheduleEvent {
    ScheduleEvent {
        date,
        symbol: rule.target.clone(),
        amount: rule.amount.clone(),
    }
}
