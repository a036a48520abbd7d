//! Property-based tests over the full parse/resolve pipeline.

use chrono::NaiveDate;
use folio::{parse, resolve};
use proptest::prelude::*;

// ============================================================================
// Test Strategies
// ============================================================================

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2026, 1u32..13, 1u32..29)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn ticker_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "510300".to_string(),
        "159915".to_string(),
        "007339".to_string(),
        "SPY".to_string(),
        "VTI".to_string(),
    ])
}

fn record_strategy() -> impl Strategy<Value = String> {
    (
        date_strategy(),
        ticker_strategy(),
        1i64..100_000,
        prop::bool::ANY,
    )
        .prop_map(|(date, ticker, amount, is_mark)| {
            if is_mark {
                format!("{date} MARK ETF:{ticker} VALUE {amount} CNY")
            } else {
                format!("{date} TRADE ETF:{ticker} +{amount} CNY")
            }
        })
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(record_strategy(), 0..12).prop_map(|lines| {
        let mut source = lines.join("\n");
        source.push('\n');
        source
    })
}

// ============================================================================
// Pipeline Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Parsing and resolving the same text twice yields structurally
    /// identical models and diagnostics.
    #[test]
    fn prop_pipeline_deterministic(source in document_strategy()) {
        let run = |text: &str| {
            let document = parse(text).expect("generated records parse");
            resolve(&document).expect("generated records resolve")
        };
        let first = run(&source);
        let second = run(&source);
        prop_assert_eq!(first.records(), second.records());
        prop_assert_eq!(first.assets(), second.assets());
    }

    /// Every generated record survives the pipeline: statement count in
    /// equals record count out.
    #[test]
    fn prop_no_records_lost(source in document_strategy()) {
        let document = parse(&source).expect("generated records parse");
        let statements = document.statements().len();
        let model = resolve(&document).expect("generated records resolve");
        prop_assert_eq!(model.records().len(), statements);
    }

    /// A legacy BUY line normalizes to exactly the record its unified
    /// TRADE spelling produces.
    #[test]
    fn prop_legacy_buy_equals_unified_trade(
        date in date_strategy(),
        ticker in ticker_strategy(),
        amount in 1i64..100_000,
    ) {
        let legacy = format!("{date} BUY {amount} CNY OF ETF:{ticker}\n");
        let unified = format!("{date} TRADE ETF:{ticker} +{amount} CNY\n");
        let legacy_model = resolve(&parse(&legacy).unwrap()).unwrap();
        let unified_model = resolve(&parse(&unified).unwrap()).unwrap();
        prop_assert_eq!(legacy_model.records(), unified_model.records());
    }

    /// Appending to a document never changes the statements already
    /// parsed in its earlier generation.
    #[test]
    fn prop_append_preserves_prefix(
        base in document_strategy(),
        extra in record_strategy(),
    ) {
        let first = parse(&base).expect("generated records parse");
        let before: Vec<_> = first.statements().to_vec();
        let second = first.append(&extra).expect("appended record parses");
        prop_assert_eq!(&second.statements()[..before.len()], &before[..]);
        prop_assert_eq!(second.statements().len(), before.len() + 1);
        prop_assert_eq!(first.statements().len(), before.len());
    }
}
