//! Integration tests for the parser crate.
//!
//! Tests cover both record grammars, block statements, error recovery,
//! and mixed real-world documents.

use folio_core::{Frequency, Record, Statement, Symbol};
use folio_parser::{parse, parse_statements, ParseErrorKind, ParseResult};
use rust_decimal_macros::dec;

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_ok(source: &str) -> ParseResult {
    let result = parse(source);
    assert!(
        result.errors.is_empty(),
        "expected no errors, got: {:?}",
        result.errors
    );
    result
}

fn count_statement_type(result: &ParseResult, type_name: &str) -> usize {
    result
        .statements
        .iter()
        .filter(|s| match &s.value {
            Statement::Record(Record::Trade(_)) => type_name == "trade",
            Statement::Record(Record::Mark(_)) => type_name == "mark",
            Statement::Define(_) => type_name == "define",
            Statement::Portfolio(_) => type_name == "portfolio",
            Statement::Plan(_) => type_name == "plan",
        })
        .count()
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_parse_trade_record() {
    let result = parse_ok("2024-01-01 TRADE ETF:510300 +5000 CNY @ 4.56");
    assert_eq!(count_statement_type(&result, "trade"), 1);

    if let Statement::Record(Record::Trade(trade)) = &result.statements[0].value {
        assert_eq!(trade.symbol, Symbol::new("ETF", "510300"));
        assert_eq!(trade.amount.number, dec!(5000));
        assert_eq!(trade.amount.unit, "CNY");
        assert_eq!(trade.price, Some(dec!(4.56)));
        assert!(trade.is_inflow());
    } else {
        panic!("expected trade record");
    }
}

#[test]
fn test_parse_withdrawal() {
    let result = parse_ok("2024-03-01 TRADE ETF:510300 -2000 CNY @ 4.65");
    if let Statement::Record(Record::Trade(trade)) = &result.statements[0].value {
        assert_eq!(trade.amount.number, dec!(-2000));
        assert!(trade.is_outflow());
    } else {
        panic!("expected trade record");
    }
}

#[test]
fn test_parse_mark_record() {
    let result = parse_ok("2024-03-31 MARK ETF:510300 VALUE 7200 CNY");
    assert_eq!(count_statement_type(&result, "mark"), 1);

    if let Statement::Record(Record::Mark(mark)) = &result.statements[0].value {
        assert_eq!(mark.symbol, Symbol::new("ETF", "510300"));
        assert_eq!(mark.value.number, dec!(7200));
        assert_eq!(mark.value.unit, "CNY");
    } else {
        panic!("expected mark record");
    }
}

#[test]
fn test_note_attaches_to_preceding_record() {
    let source = "2024-01-01 TRADE ETF:510300 +5000 CNY\nNOTE \"first buy of the year\"";
    let result = parse_ok(source);
    assert_eq!(result.statements.len(), 1);
    if let Statement::Record(record) = &result.statements[0].value {
        assert_eq!(record.note(), Some("first buy of the year"));
    } else {
        panic!("expected record");
    }
}

#[test]
fn test_legacy_buy_equals_unified_trade() {
    let (legacy, errs1) = parse_statements("2024-01-05 BUY 4000 CNY OF ETF:159915 @ 2.45");
    let (unified, errs2) = parse_statements("2024-01-05 TRADE ETF:159915 +4000 CNY @ 2.45");
    assert!(errs1.is_empty() && errs2.is_empty());
    assert_eq!(legacy[0].value, unified[0].value);
}

#[test]
fn test_legacy_sell_is_negative() {
    let (legacy, errs1) = parse_statements("2024-06-01 SELL 1500 CNY OF ETF:510300");
    let (unified, errs2) = parse_statements("2024-06-01 TRADE ETF:510300 -1500 CNY");
    assert!(errs1.is_empty() && errs2.is_empty());
    assert_eq!(legacy[0].value, unified[0].value);
}

#[test]
fn test_legacy_note_survives_normalization() {
    let result = parse_ok("2024-01-05 BUY 4000 CNY OF ETF:159915\nNOTE \"monthly top-up\"");
    if let Statement::Record(record) = &result.statements[0].value {
        assert_eq!(record.note(), Some("monthly top-up"));
    } else {
        panic!("expected record");
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_parse_define_block() {
    let source = r#"
DEFINE ETF:510300
    ALIAS "CSI 300 ETF"
    TARGET RETURN 0.09
END
"#;
    let result = parse_ok(source);
    if let Statement::Define(def) = &result.statements[0].value {
        assert_eq!(def.symbol, Symbol::new("ETF", "510300"));
        assert_eq!(def.alias.as_deref(), Some("CSI 300 ETF"));
        assert_eq!(def.target_return, Some(dec!(0.09)));
    } else {
        panic!("expected define");
    }
}

#[test]
fn test_define_sub_rules_are_optional() {
    let result = parse_ok("DEFINE BOND:019547\nEND");
    if let Statement::Define(def) = &result.statements[0].value {
        assert!(def.alias.is_none());
        assert!(def.target_return.is_none());
    } else {
        panic!("expected define");
    }
}

#[test]
fn test_parse_portfolio_block() {
    let source = r#"
PORTFOLIO "Long Term"
    ASSETS ETF:510300, ETF:159915, BOND:019547
    TARGET RETURN 0.08
END
"#;
    let result = parse_ok(source);
    if let Statement::Portfolio(p) = &result.statements[0].value {
        assert_eq!(p.name, "Long Term");
        assert_eq!(p.members.len(), 3);
        assert_eq!(p.members[2], Symbol::new("BOND", "019547"));
    } else {
        panic!("expected portfolio");
    }
}

#[test]
fn test_parse_plan_block_with_multiple_schedules() {
    let source = r#"
PLAN "DCA 2024"
    SCHEDULE MONTHLY 3000 CNY INTO ETF:510300
    SCHEDULE WEEKLY 500 CNY INTO ETF:159915
    START 2024-01-01
    END_DATE 2024-12-31
END
"#;
    let result = parse_ok(source);
    if let Statement::Plan(plan) = &result.statements[0].value {
        assert_eq!(plan.rules.len(), 2);
        assert_eq!(plan.rules[0].frequency, Frequency::Monthly);
        assert_eq!(plan.rules[1].frequency, Frequency::Weekly);
        assert!(!plan.is_open_ended());
    } else {
        panic!("expected plan");
    }
}

#[test]
fn test_plan_without_end_date_is_open_ended() {
    let source = "PLAN \"Forever\"\nSCHEDULE MONTHLY 100 CNY INTO ETF:510300\nSTART 2024-01-01\nEND";
    let result = parse_ok(source);
    if let Statement::Plan(plan) = &result.statements[0].value {
        assert!(plan.is_open_ended());
    } else {
        panic!("expected plan");
    }
}

#[test]
fn test_duplicate_start_in_plan_is_error() {
    let source = "PLAN \"P\"\nSTART 2024-01-01\nSTART 2024-02-01\nEND";
    let result = parse(source);
    assert!(result.errors.iter().any(|e| matches!(
        e.kind,
        ParseErrorKind::DuplicateRule {
            rule: "START",
            block: "PLAN"
        }
    )));
    // First occurrence wins.
    if let Statement::Plan(plan) = &result.statements[0].value {
        assert_eq!(
            plan.start_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    } else {
        panic!("expected plan");
    }
}

// ============================================================================
// Errors and Recovery
// ============================================================================

#[test]
fn test_unexpected_character() {
    let result = parse("2024-01-01 TRADE ETF:510300 +5000 CNY @ $4.56");
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e.kind, ParseErrorKind::UnexpectedChar('$'))));
}

#[test]
fn test_invalid_calendar_date() {
    let result = parse("2024-02-30 TRADE ETF:510300 100 CNY");
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(&e.kind, ParseErrorKind::InvalidDate(s) if s == "2024-02-30")));
    assert!(result.statements.is_empty());
}

#[test]
fn test_recovery_collects_multiple_errors() {
    let source = "\
2024-01-01 TRADE ETF:510300 CNY
2024-01-02 MARK ETF:510300 7200 CNY
2024-01-03 TRADE ETF:510300 100 CNY
";
    let result = parse(source);
    // Two broken statements, one good one.
    assert_eq!(result.statements.len(), 1);
    assert!(result.errors.len() >= 2);
}

#[test]
fn test_bad_statement_does_not_poison_blocks() {
    let source = "\
NONSENSE TOKENS HERE
DEFINE ETF:510300
    ALIAS \"ok\"
END
";
    let result = parse(source);
    assert_eq!(count_statement_type(&result, "define"), 1);
    assert!(!result.errors.is_empty());
}

#[test]
fn test_missing_end_halts_block_only() {
    let source = "\
2024-01-01 TRADE ETF:510300 100 CNY
PORTFOLIO \"Core\"
    ASSETS ETF:510300
";
    let result = parse(source);
    assert_eq!(count_statement_type(&result, "trade"), 1);
    assert_eq!(count_statement_type(&result, "portfolio"), 0);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e.kind, ParseErrorKind::UnexpectedEof)));
}

#[test]
fn test_empty_and_comment_only_sources() {
    assert!(parse("").statements.is_empty());
    assert!(parse("").errors.is_empty());
    let result = parse("# just a comment\n\n# another\n");
    assert!(result.statements.is_empty());
    assert!(result.errors.is_empty());
}

// ============================================================================
// Full Documents
// ============================================================================

#[test]
fn test_mixed_document() {
    let source = r#"
# Holdings
DEFINE ETF:510300
    ALIAS "CSI 300 ETF"
    TARGET RETURN 0.09
END

PORTFOLIO "Long Term"
    ASSETS ETF:510300, ETF:159915
END

PLAN "DCA"
    SCHEDULE MONTHLY 3000 CNY INTO ETF:510300
    START 2024-01-01
    END_DATE 2024-12-31
END

2024-01-15 TRADE ETF:510300 +5000 CNY @ 4.56
NOTE "opening position"
2024-02-01 BUY 4000 CNY OF ETF:159915 @ 2.45
2024-03-31 MARK ETF:510300 VALUE 8800 CNY
"#;
    let result = parse_ok(source);
    assert_eq!(result.statements.len(), 6);
    assert_eq!(count_statement_type(&result, "define"), 1);
    assert_eq!(count_statement_type(&result, "portfolio"), 1);
    assert_eq!(count_statement_type(&result, "plan"), 1);
    assert_eq!(count_statement_type(&result, "trade"), 2);
    assert_eq!(count_statement_type(&result, "mark"), 1);
}

#[test]
fn test_statements_preserve_source_order() {
    let source = "\
2024-03-01 TRADE ETF:510300 300 CNY
2024-01-01 TRADE ETF:510300 100 CNY
2024-02-01 TRADE ETF:510300 200 CNY
";
    let result = parse_ok(source);
    let amounts: Vec<_> = result
        .statements
        .iter()
        .filter_map(|s| match &s.value {
            Statement::Record(Record::Trade(t)) => Some(t.amount.number),
            _ => None,
        })
        .collect();
    // Parser does not sort; chronology is the evaluator's job.
    assert_eq!(amounts, vec![dec!(300), dec!(100), dec!(200)]);
}
