//! Return metrics.
//!
//! Modified-Dietz returns between marks, computed entirely in `Decimal`
//! with day-count weights, so repeated evaluation is exact and
//! deterministic. A zero denominator makes the return undefined (`None`),
//! never zero and never an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ledger::{CashFlow, MarkPoint};

/// A return over one mark-to-mark interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalReturn {
    /// Opening mark.
    pub from: MarkPoint,
    /// Closing mark.
    pub to: MarkPoint,
    /// The Modified-Dietz return, or `None` when undefined.
    pub value: Option<Decimal>,
}

/// Modified-Dietz return between two valuations.
///
/// ```text
/// R = (v1 - v0 - Σc) / (v0 + Σ c_i · w_i),   w_i = (t1 - d_i) / (t1 - t0)
/// ```
///
/// `flows` must fall in `(t0, t1]`; the caller filters. Returns `None`
/// when the denominator is zero, or when weights are needed over a
/// zero-length interval.
#[must_use]
pub fn modified_dietz(
    v0: Decimal,
    v1: Decimal,
    t0: NaiveDate,
    t1: NaiveDate,
    flows: &[CashFlow],
) -> Option<Decimal> {
    let total_days = (t1 - t0).num_days();
    if total_days < 0 {
        return None;
    }

    let mut net_flow = Decimal::ZERO;
    let mut weighted_flow = Decimal::ZERO;
    for flow in flows {
        net_flow += flow.amount;
        if total_days == 0 {
            // A flow inside a zero-length interval has no definable weight.
            return None;
        }
        let held_days = Decimal::from((t1 - flow.date).num_days());
        let weight = held_days / Decimal::from(total_days);
        weighted_flow += flow.amount * weight;
    }

    let denominator = v0 + weighted_flow;
    if denominator.is_zero() {
        return None;
    }
    Some((v1 - v0 - net_flow) / denominator)
}

/// Simple aggregate return since inception:
/// `(last_mark - contributions) / contributions`, undefined when
/// contributions are zero.
#[must_use]
pub fn simple_return(last_mark: Decimal, contributions: Decimal) -> Option<Decimal> {
    if contributions.is_zero() {
        None
    } else {
        Some((last_mark - contributions) / contributions)
    }
}

/// One Modified-Dietz return per successive mark pair.
///
/// Needs at least two marks to produce anything; a single mark yields no
/// interval.
#[must_use]
pub fn interval_returns(marks: &[MarkPoint], flows: &[CashFlow]) -> Vec<IntervalReturn> {
    marks
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let window: Vec<CashFlow> = flows
                .iter()
                .filter(|flow| flow.date > from.date && flow.date <= to.date)
                .copied()
                .collect();
            IntervalReturn {
                from,
                to,
                value: modified_dietz(from.value, to.value, from.date, to.date, &window),
            }
        })
        .collect()
}

/// Return between `from` and `to` over a mark series.
///
/// Uses Modified Dietz between the last mark at or before `from` and the
/// last mark at or before `to`. When no mark exists at or before `from`
/// (querying from inception), falls back to the simple aggregate over all
/// contributions up to and including `to`. `None` when there is no mark
/// at or before `to` at all, or when the chosen formula is undefined.
#[must_use]
pub fn return_since(
    marks: &[MarkPoint],
    flows: &[CashFlow],
    from: NaiveDate,
    to: NaiveDate,
) -> Option<Decimal> {
    let closing = marks.iter().take_while(|mark| mark.date <= to).last()?;
    let opening = marks.iter().take_while(|mark| mark.date <= from).last();

    match opening {
        Some(opening) => {
            let window: Vec<CashFlow> = flows
                .iter()
                .filter(|flow| flow.date > opening.date && flow.date <= closing.date)
                .copied()
                .collect();
            modified_dietz(
                opening.value,
                closing.value,
                opening.date,
                closing.date,
                &window,
            )
        }
        None => {
            // Contributions run through the query date itself, so a flow
            // after the closing mark still enters the denominator.
            let contributions = flows
                .iter()
                .filter(|flow| flow.date <= to)
                .map(|flow| flow.amount)
                .sum();
            simple_return(closing.value, contributions)
        }
    }
}
