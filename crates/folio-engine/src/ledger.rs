//! Chronological ledger replay.
//!
//! Merges a symbol's explicit records with its plan-generated virtual
//! trades into one timeline and replays it up to a query date. Merge order
//! within one date: all trades before any mark (a mark captures the state
//! after that day's trading), explicit records before planned events, and
//! remaining ties preserve source order.

use chrono::NaiveDate;
use folio_core::{Amount, InternedStr, Model, PortfolioDefinition, Record, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleEvent;

/// Where a timeline event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSource {
    /// An explicit record from the document.
    Explicit,
    /// A virtual trade generated by schedule expansion.
    Planned,
}

/// What a timeline event does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A signed cash contribution.
    Trade(Amount),
    /// A point-in-time valuation.
    Mark(Amount),
}

/// One entry of a symbol's merged timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Event date.
    pub date: NaiveDate,
    /// The event.
    pub kind: EventKind,
    /// Explicit record or planned virtual trade.
    pub source: EventSource,
    /// Position in the originating sequence, for stable tie-breaking.
    seq: usize,
}

impl TimelineEvent {
    /// True for mark events.
    #[must_use]
    pub const fn is_mark(&self) -> bool {
        matches!(self.kind, EventKind::Mark(_))
    }

    fn sort_key(&self) -> (NaiveDate, bool, EventSource, usize) {
        (self.date, self.is_mark(), self.source, self.seq)
    }
}

/// A dated valuation extracted from a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPoint {
    /// Mark date.
    pub date: NaiveDate,
    /// Marked total value.
    pub value: Decimal,
}

/// A dated signed cash flow extracted from a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Flow date.
    pub date: NaiveDate,
    /// Signed amount; negative is a withdrawal.
    pub amount: Decimal,
}

/// A symbol's state as of a query date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// The symbol.
    pub symbol: Symbol,
    /// Query date.
    pub as_of: NaiveDate,
    /// Running sum of signed trade amounts up to and including `as_of`.
    pub contributions: Decimal,
    /// Most recent mark at or before `as_of`, if any.
    pub last_mark: Option<MarkPoint>,
    /// Unit of the first event seen, if any event exists.
    pub unit: Option<InternedStr>,
}

/// A portfolio's state as of a query date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Portfolio name.
    pub name: String,
    /// Query date.
    pub as_of: NaiveDate,
    /// Sum of member `last_mark` values; stale members contribute zero.
    pub value: Decimal,
    /// Sum of member contributions.
    pub contributions: Decimal,
    /// Members with no mark at or before `as_of`. Never silently dropped.
    pub stale: Vec<Symbol>,
}

/// Build the merged timeline for one symbol.
#[must_use]
pub fn timeline(
    model: &Model,
    symbol: &Symbol,
    plan_events: &[ScheduleEvent],
) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    for (seq, record) in model.records_for(symbol) {
        let kind = match record {
            Record::Trade(trade) => EventKind::Trade(trade.amount.clone()),
            Record::Mark(mark) => EventKind::Mark(mark.value.clone()),
        };
        events.push(TimelineEvent {
            date: record.date(),
            kind,
            source: EventSource::Explicit,
            seq,
        });
    }
    for (seq, event) in plan_events.iter().enumerate() {
        if event.symbol == *symbol {
            events.push(TimelineEvent {
                date: event.date,
                kind: EventKind::Trade(event.amount.clone()),
                source: EventSource::Planned,
                seq,
            });
        }
    }
    events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    events
}

/// Replay a symbol's timeline up to `as_of` and snapshot the result.
#[must_use]
pub fn position(
    model: &Model,
    symbol: &Symbol,
    plan_events: &[ScheduleEvent],
    as_of: NaiveDate,
) -> PositionSnapshot {
    let events = timeline(model, symbol, plan_events);
    let mut contributions = Decimal::ZERO;
    let mut last_mark = None;
    let mut unit = None;
    for event in events.iter().take_while(|e| e.date <= as_of) {
        match &event.kind {
            EventKind::Trade(amount) => {
                contributions += amount.number;
                if unit.is_none() {
                    unit = Some(amount.unit.clone());
                }
            }
            EventKind::Mark(value) => {
                last_mark = Some(MarkPoint {
                    date: event.date,
                    value: value.number,
                });
                if unit.is_none() {
                    unit = Some(value.unit.clone());
                }
            }
        }
    }
    PositionSnapshot {
        symbol: symbol.clone(),
        as_of,
        contributions,
        last_mark,
        unit,
    }
}

/// Snapshot a portfolio by aggregating member positions.
#[must_use]
pub fn portfolio(
    model: &Model,
    definition: &PortfolioDefinition,
    plan_events: &[ScheduleEvent],
    as_of: NaiveDate,
) -> PortfolioSnapshot {
    let mut value = Decimal::ZERO;
    let mut contributions = Decimal::ZERO;
    let mut stale = Vec::new();
    for member in &definition.members {
        let snapshot = position(model, member, plan_events, as_of);
        contributions += snapshot.contributions;
        match snapshot.last_mark {
            Some(mark) => value += mark.value,
            None => stale.push(member.clone()),
        }
    }
    PortfolioSnapshot {
        name: definition.name.clone(),
        as_of,
        value,
        contributions,
        stale,
    }
}

/// Extract the mark series from a timeline.
#[must_use]
pub fn marks(events: &[TimelineEvent]) -> Vec<MarkPoint> {
    events
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::Mark(value) => Some(MarkPoint {
                date: event.date,
                value: value.number,
            }),
            EventKind::Trade(_) => None,
        })
        .collect()
}

/// Extract the signed cash-flow series from a timeline.
#[must_use]
pub fn cash_flows(events: &[TimelineEvent]) -> Vec<CashFlow> {
    events
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::Trade(amount) => Some(CashFlow {
                date: event.date,
                amount: amount.number,
            }),
            EventKind::Mark(_) => None,
        })
        .collect()
}

/// Aggregate mark series for a portfolio: one point per date on which any
/// member was marked, valuing the whole portfolio at that date.
#[must_use]
pub fn portfolio_marks(
    model: &Model,
    definition: &PortfolioDefinition,
    plan_events: &[ScheduleEvent],
) -> Vec<MarkPoint> {
    let member_marks: Vec<Vec<MarkPoint>> = definition
        .members
        .iter()
        .map(|member| marks(&timeline(model, member, plan_events)))
        .collect();

    let mut dates: Vec<NaiveDate> = member_marks
        .iter()
        .flatten()
        .map(|mark| mark.date)
        .collect();
    dates.sort_unstable();
    dates.dedup();

    dates
        .into_iter()
        .map(|date| {
            let value = member_marks
                .iter()
                .filter_map(|series| {
                    series
                        .iter()
                        .take_while(|mark| mark.date <= date)
                        .last()
                        .map(|mark| mark.value)
                })
                .sum();
            MarkPoint { date, value }
        })
        .collect()
}

/// Merged cash-flow series for a portfolio, ordered by date.
#[must_use]
pub fn portfolio_cash_flows(
    model: &Model,
    definition: &PortfolioDefinition,
    plan_events: &[ScheduleEvent],
) -> Vec<CashFlow> {
    let mut flows: Vec<CashFlow> = definition
        .members
        .iter()
        .flat_map(|member| cash_flows(&timeline(model, member, plan_events)))
        .collect();
    flows.sort_by_key(|flow| flow.date);
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{MarkRecord, TradeRecord};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sym() -> Symbol {
        Symbol::new("ETF", "510300")
    }

    fn trade(y: i32, m: u32, d: u32, amount: Decimal) -> Record {
        Record::Trade(TradeRecord::new(
            date(y, m, d),
            sym(),
            Amount::new(amount, "CNY"),
        ))
    }

    fn mark(y: i32, m: u32, d: u32, value: Decimal) -> Record {
        Record::Mark(MarkRecord::new(
            date(y, m, d),
            sym(),
            Amount::new(value, "CNY"),
        ))
    }

    fn model_of(records: Vec<Record>) -> Model {
        Model::from_parts(vec![], vec![], vec![], records)
    }

    #[test]
    fn same_day_mark_applies_after_trade() {
        // Mark written before the trade in the source; replay must still
        // apply the trade first.
        let model = model_of(vec![
            mark(2024, 1, 15, dec!(5100)),
            trade(2024, 1, 15, dec!(5000)),
        ]);
        let events = timeline(&model, &sym(), &[]);
        assert!(!events[0].is_mark());
        assert!(events[1].is_mark());

        let snapshot = position(&model, &sym(), &[], date(2024, 1, 15));
        assert_eq!(snapshot.contributions, dec!(5000));
        assert_eq!(snapshot.last_mark.unwrap().value, dec!(5100));
    }

    #[test]
    fn explicit_trades_precede_planned_on_same_date() {
        let model = model_of(vec![trade(2024, 1, 1, dec!(100))]);
        let planned = vec![ScheduleEvent {
            date: date(2024, 1, 1),
            symbol: sym(),
            amount: Amount::new(dec!(200), "CNY"),
        }];
        let events = timeline(&model, &sym(), &planned);
        assert_eq!(events[0].source, EventSource::Explicit);
        assert_eq!(events[1].source, EventSource::Planned);
    }

    #[test]
    fn ties_preserve_source_order() {
        let model = model_of(vec![
            trade(2024, 1, 1, dec!(1)),
            trade(2024, 1, 1, dec!(2)),
            trade(2024, 1, 1, dec!(3)),
        ]);
        let amounts: Vec<Decimal> = timeline(&model, &sym(), &[])
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Trade(a) => Some(a.number),
                EventKind::Mark(_) => None,
            })
            .collect();
        assert_eq!(amounts, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn contributions_include_planned_events_up_to_query_date() {
        let model = model_of(vec![trade(2024, 1, 1, dec!(1000))]);
        let planned = vec![
            ScheduleEvent {
                date: date(2024, 2, 1),
                symbol: sym(),
                amount: Amount::new(dec!(500), "CNY"),
            },
            ScheduleEvent {
                date: date(2024, 3, 1),
                symbol: sym(),
                amount: Amount::new(dec!(500), "CNY"),
            },
        ];
        let snapshot = position(&model, &sym(), &planned, date(2024, 2, 15));
        assert_eq!(snapshot.contributions, dec!(1500));
    }

    #[test]
    fn withdrawal_can_drive_contributions_negative() {
        let model = model_of(vec![
            trade(2024, 1, 1, dec!(1000)),
            trade(2024, 2, 1, dec!(-2500)),
        ]);
        let snapshot = position(&model, &sym(), &[], date(2024, 12, 31));
        assert_eq!(snapshot.contributions, dec!(-1500));
    }

    #[test]
    fn marks_after_query_date_are_ignored() {
        let model = model_of(vec![
            mark(2024, 1, 31, dec!(1000)),
            mark(2024, 3, 31, dec!(2000)),
        ]);
        let snapshot = position(&model, &sym(), &[], date(2024, 2, 15));
        let last = snapshot.last_mark.unwrap();
        assert_eq!(last.date, date(2024, 1, 31));
        assert_eq!(last.value, dec!(1000));
    }

    #[test]
    fn empty_position_has_no_unit() {
        let model = model_of(vec![]);
        let snapshot = position(&model, &sym(), &[], date(2024, 1, 1));
        assert_eq!(snapshot.contributions, Decimal::ZERO);
        assert!(snapshot.last_mark.is_none());
        assert!(snapshot.unit.is_none());
    }

    #[test]
    fn portfolio_flags_unmarked_members_as_stale() {
        let other = Symbol::new("ETF", "159915");
        let records = vec![
            mark(2024, 1, 31, dec!(5000)),
            Record::Trade(TradeRecord::new(
                date(2024, 1, 1),
                other.clone(),
                Amount::new(dec!(2000), "CNY"),
            )),
        ];
        let definition = PortfolioDefinition::new("Core", vec![sym(), other.clone()]);
        let model = Model::from_parts(vec![], vec![definition.clone()], vec![], records);
        let snapshot = portfolio(&model, &definition, &[], date(2024, 2, 1));
        assert_eq!(snapshot.value, dec!(5000));
        assert_eq!(snapshot.contributions, dec!(2000));
        assert_eq!(snapshot.stale, vec![other]);
    }

    #[test]
    fn portfolio_mark_series_carries_members_forward() {
        let other = Symbol::new("ETF", "159915");
        let records = vec![
            mark(2024, 1, 31, dec!(1000)),
            Record::Mark(MarkRecord::new(
                date(2024, 2, 29),
                other.clone(),
                Amount::new(dec!(500), "CNY"),
            )),
            mark(2024, 3, 31, dec!(1200)),
        ];
        let definition = PortfolioDefinition::new("Core", vec![sym(), other]);
        let model = Model::from_parts(vec![], vec![definition.clone()], vec![], records);
        let series = portfolio_marks(&model, &definition, &[]);
        assert_eq!(
            series,
            vec![
                MarkPoint {
                    date: date(2024, 1, 31),
                    value: dec!(1000)
                },
                MarkPoint {
                    date: date(2024, 2, 29),
                    value: dec!(1500)
                },
                MarkPoint {
                    date: date(2024, 3, 31),
                    value: dec!(1700)
                },
            ]
        );
    }
}
