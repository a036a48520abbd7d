//! Token-based parser using the Logos lexer + Chumsky combinators.
//!
//! ```text
//! Source (&str) → tokenize() → Vec<SpannedToken> → Chumsky parser → Statements
//! ```
//!
//! The parser runs over the token slice with error recovery: a failed
//! statement is skipped up to the next statement boundary (a date or a
//! `DEFINE`/`PORTFOLIO`/`PLAN` keyword) and parsing continues, so one pass
//! accumulates every diagnostic in the file.
//!
//! Block bodies (`DEFINE`, `PORTFOLIO`, `PLAN`) are parsed as unordered
//! sub-rule lists and folded into their definitions afterwards; folding is
//! where duplicate single-valued sub-rules are detected.

use chrono::NaiveDate;
use chumsky::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use folio_core::{
    Amount, AssetDefinition, Frequency, MarkRecord, PlanDefinition, PortfolioDefinition, Record,
    ScheduleRule, Statement, Symbol, TradeRecord,
};

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize, Token};
use crate::span::{Span, Spanned};
use crate::ParseResult;

// ============================================================================
// Token Input Types
// ============================================================================

/// A token paired with its byte offset span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'src> {
    /// The token.
    pub token: Token<'src>,
    /// Byte offset span (start, end).
    pub span: (usize, usize),
}

impl<'src> SpannedToken<'src> {
    /// Create a new spanned token.
    pub const fn new(token: Token<'src>, start: usize, end: usize) -> Self {
        Self {
            token,
            span: (start, end),
        }
    }
}

/// Type alias for parser extra with our token type.
type TokExtra<'src> = extra::Err<Rich<'src, SpannedToken<'src>>>;

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a YYYY-MM-DD token slice into a calendar-checked date.
fn date_from_token(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '-');
    let y: i32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Get the byte span from a slice index span, using the token spans.
fn index_to_byte_span(tokens: &[SpannedToken<'_>], start_idx: usize, end_idx: usize) -> Span {
    let Some(last) = tokens.last() else {
        return Span::new(0, 0);
    };
    let start = if start_idx < tokens.len() {
        tokens[start_idx].span.0
    } else {
        last.span.1
    };
    let end = if end_idx > 0 && end_idx <= tokens.len() {
        tokens[end_idx - 1].span.1
    } else {
        last.span.1
    };
    Span::new(start, end)
}

// ============================================================================
// Token Matchers (Primitives)
// ============================================================================

/// Match a date token and extract the `NaiveDate`.
///
/// Calendar validity was already checked by the lexer post-pass, which
/// replaces invalid dates with error tokens, so the conversion here is
/// expected to succeed.
fn tok_date<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], NaiveDate, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::Date(_)))
        .try_map(|t: SpannedToken<'src>, span| {
            if let Token::Date(s) = t.token {
                date_from_token(s).ok_or_else(|| Rich::custom(span, "invalid date"))
            } else {
                Err(Rich::custom(span, "expected date"))
            }
        })
}

/// Match a number token and extract the Decimal.
fn tok_number<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Decimal, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::Number(_)))
        .try_map(|t: SpannedToken<'src>, span| {
            if let Token::Number(s) = t.token {
                Decimal::from_str(s).map_err(|_| Rich::custom(span, "invalid number"))
            } else {
                Err(Rich::custom(span, "expected number"))
            }
        })
}

/// Match a string token and extract the content (without quotes).
fn tok_string<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], String, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::String(_)))
        .map(|t: SpannedToken<'src>| {
            if let Token::String(s) = t.token {
                s[1..s.len() - 1].to_string()
            } else {
                String::new()
            }
        })
}

/// Match an identifier token and extract the slice.
fn tok_ident<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], &'src str, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::Ident(_)))
        .map(|t: SpannedToken<'src>| {
            if let Token::Ident(s) = t.token {
                s
            } else {
                ""
            }
        })
}

/// Match a ticker: an identifier or an all-digit number (tickers like
/// `510300` lex as numbers; the raw slice keeps any leading zeros).
fn tok_ticker<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], &'src str, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| match t.token {
            Token::Ident(_) => true,
            Token::Number(s) => !s.contains('.'),
            _ => false,
        })
        .map(|t: SpannedToken<'src>| match t.token {
            Token::Ident(s) | Token::Number(s) => s,
            _ => "",
        })
}

/// Match a frequency keyword.
fn tok_frequency<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Frequency, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| {
            matches!(
                t.token,
                Token::Daily | Token::Weekly | Token::Monthly | Token::Quarterly | Token::Yearly
            )
        })
        .map(|t: SpannedToken<'src>| match t.token {
            Token::Daily => Frequency::Daily,
            Token::Weekly => Frequency::Weekly,
            Token::Quarterly => Frequency::Quarterly,
            Token::Yearly => Frequency::Yearly,
            _ => Frequency::Monthly,
        })
}

/// Match a specific keyword or punctuation token.
macro_rules! tok_keyword {
    ($name:ident, $variant:ident) => {
        fn $name<'src>() -> impl Parser<'src, &'src [SpannedToken<'src>], (), TokExtra<'src>> + Clone
        {
            any()
                .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::$variant))
                .to(())
        }
    };
}

tok_keyword!(tok_trade, Trade);
tok_keyword!(tok_mark, Mark);
tok_keyword!(tok_value, Value);
tok_keyword!(tok_define, Define);
tok_keyword!(tok_alias, Alias);
tok_keyword!(tok_target, Target);
tok_keyword!(tok_return, Return);
tok_keyword!(tok_portfolio, Portfolio);
tok_keyword!(tok_assets, Assets);
tok_keyword!(tok_plan, Plan);
tok_keyword!(tok_schedule, Schedule);
tok_keyword!(tok_into, Into);
tok_keyword!(tok_start, Start);
tok_keyword!(tok_end_date, EndDate);
tok_keyword!(tok_end, End);
tok_keyword!(tok_note, Note);
tok_keyword!(tok_buy, Buy);
tok_keyword!(tok_sell, Sell);
tok_keyword!(tok_of, Of);
tok_keyword!(tok_colon, Colon);
tok_keyword!(tok_comma, Comma);
tok_keyword!(tok_at, At);
tok_keyword!(tok_plus, Plus);
tok_keyword!(tok_minus, Minus);

// ============================================================================
// Grammar Rules
// ============================================================================

/// Match a `CLASS:TICKER` symbol.
fn tok_symbol<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Symbol, TokExtra<'src>> + Clone {
    tok_ident()
        .then_ignore(tok_colon())
        .then(tok_ticker())
        .map(|(class, ticker)| Symbol::new(class, ticker))
}

/// Match a number with an optional `+`/`-` sign prefix. No sign means
/// positive.
fn tok_signed_number<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Decimal, TokExtra<'src>> + Clone {
    choice((tok_minus().to(true), tok_plus().to(false)))
        .or_not()
        .then(tok_number())
        .map(|(negate, n)| if negate == Some(true) { -n } else { n })
}

/// The body of a record, before the date and note are attached.
enum RecordBody<'src> {
    Trade {
        symbol: Symbol,
        number: Decimal,
        unit: &'src str,
        price: Option<Decimal>,
    },
    Mark {
        symbol: Symbol,
        value: Decimal,
        unit: &'src str,
    },
}

impl RecordBody<'_> {
    fn into_record(self, date: NaiveDate, note: Option<String>) -> Record {
        match self {
            Self::Trade {
                symbol,
                number,
                unit,
                price,
            } => {
                let mut trade = TradeRecord::new(date, symbol, Amount::new(number, unit));
                if let Some(price) = price {
                    trade = trade.with_price(price);
                }
                if let Some(note) = note {
                    trade = trade.with_note(note);
                }
                Record::Trade(trade)
            }
            Self::Mark {
                symbol,
                value,
                unit,
            } => {
                let mut mark = MarkRecord::new(date, symbol, Amount::new(value, unit));
                if let Some(note) = note {
                    mark = mark.with_note(note);
                }
                Record::Mark(mark)
            }
        }
    }
}

/// Match a dated record: unified `TRADE`/`MARK` or the legacy `BUY`/`SELL`
/// form, plus an optional trailing `NOTE`.
///
/// The legacy form is normalized immediately: `BUY n` becomes a trade of
/// `+n`, `SELL n` a trade of `-n`. Nothing downstream sees the legacy shape.
fn tok_record<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Record, TokExtra<'src>> + Clone {
    let price = tok_at().ignore_then(tok_number()).or_not();

    // TRADE <symbol> <signed> <unit> [@ <price>]
    let trade = tok_trade()
        .ignore_then(tok_symbol())
        .then(tok_signed_number())
        .then(tok_ident())
        .then(price.clone())
        .map(|(((symbol, number), unit), price)| RecordBody::Trade {
            symbol,
            number,
            unit,
            price,
        });

    // MARK <symbol> VALUE <signed> <unit>
    // A negative value is accepted here and rejected by the resolver, so
    // the diagnostic can be semantic rather than a token error.
    let mark = tok_mark()
        .ignore_then(tok_symbol())
        .then_ignore(tok_value())
        .then(tok_signed_number())
        .then(tok_ident())
        .map(|((symbol, value), unit)| RecordBody::Mark {
            symbol,
            value,
            unit,
        });

    // BUY|SELL <number> <unit> OF <symbol> [@ <price>]
    let legacy = choice((tok_sell().to(true), tok_buy().to(false)))
        .then(tok_number())
        .then(tok_ident())
        .then_ignore(tok_of())
        .then(tok_symbol())
        .then(price)
        .map(|((((sell, number), unit), symbol), price)| RecordBody::Trade {
            symbol,
            number: if sell { -number } else { number },
            unit,
            price,
        });

    tok_date()
        .then(choice((trade, mark, legacy)))
        .then(tok_note().ignore_then(tok_string()).or_not())
        .map(|((date, body), note)| body.into_record(date, note))
}

// ============================================================================
// Block Statements
// ============================================================================

/// A sub-rule of a `DEFINE` block.
#[derive(Clone)]
enum DefineRule {
    Alias(String),
    TargetReturn(Decimal),
}

/// A sub-rule of a `PORTFOLIO` block.
#[derive(Clone)]
enum PortfolioRule {
    Assets(Vec<Symbol>),
    TargetReturn(Decimal),
}

/// A sub-rule of a `PLAN` block.
#[derive(Clone)]
enum PlanRule {
    Schedule(ScheduleRule),
    Start(NaiveDate),
    End(NaiveDate),
}

/// A sub-rule with its token index span, for later byte-span conversion.
type IndexedRule<R> = (R, usize, usize);

/// A parsed top-level item with block bodies still in raw sub-rule form.
#[derive(Clone)]
enum ParsedItem {
    Record(Record),
    Define {
        symbol: Symbol,
        rules: Vec<IndexedRule<DefineRule>>,
    },
    Portfolio {
        name: String,
        rules: Vec<IndexedRule<PortfolioRule>>,
    },
    Plan {
        name: String,
        rules: Vec<IndexedRule<PlanRule>>,
    },
}

/// `TARGET RETURN <signed>` appears in both DEFINE and PORTFOLIO bodies.
fn tok_target_return<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Decimal, TokExtra<'src>> + Clone {
    tok_target()
        .ignore_then(tok_return())
        .ignore_then(tok_signed_number())
}

/// Match a `DEFINE <symbol> ... END` block.
fn tok_define_block<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], ParsedItem, TokExtra<'src>> + Clone {
    let rule = choice((
        tok_alias().ignore_then(tok_string()).map(DefineRule::Alias),
        tok_target_return().map(DefineRule::TargetReturn),
    ))
    .map_with(|rule, e| (rule, e.span().start, e.span().end));

    tok_define()
        .ignore_then(tok_symbol())
        .then(rule.repeated().collect::<Vec<_>>())
        .then_ignore(tok_end())
        .map(|(symbol, rules)| ParsedItem::Define { symbol, rules })
}

/// Match a `PORTFOLIO "<name>" ... END` block.
fn tok_portfolio_block<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], ParsedItem, TokExtra<'src>> + Clone {
    let members = tok_symbol()
        .separated_by(tok_comma())
        .at_least(1)
        .collect::<Vec<_>>();

    let rule = choice((
        tok_assets().ignore_then(members).map(PortfolioRule::Assets),
        tok_target_return().map(PortfolioRule::TargetReturn),
    ))
    .map_with(|rule, e| (rule, e.span().start, e.span().end));

    tok_portfolio()
        .ignore_then(tok_string())
        .then(rule.repeated().collect::<Vec<_>>())
        .then_ignore(tok_end())
        .map(|(name, rules)| ParsedItem::Portfolio { name, rules })
}

/// Match a `PLAN "<name>" ... END` block.
fn tok_plan_block<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], ParsedItem, TokExtra<'src>> + Clone {
    // SCHEDULE <freq> <number> <unit> INTO <symbol>
    let schedule = tok_schedule()
        .ignore_then(tok_frequency())
        .then(tok_signed_number())
        .then(tok_ident())
        .then_ignore(tok_into())
        .then(tok_symbol())
        .map(|(((frequency, number), unit), target)| {
            PlanRule::Schedule(ScheduleRule::new(
                frequency,
                Amount::new(number, unit),
                target,
            ))
        });

    let rule = choice((
        schedule,
        tok_start().ignore_then(tok_date()).map(PlanRule::Start),
        tok_end_date().ignore_then(tok_date()).map(PlanRule::End),
    ))
    .map_with(|rule, e| (rule, e.span().start, e.span().end));

    tok_plan()
        .ignore_then(tok_string())
        .then(rule.repeated().collect::<Vec<_>>())
        .then_ignore(tok_end())
        .map(|(name, rules)| ParsedItem::Plan { name, rules })
}

/// Parse a single top-level statement.
fn tok_statement<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], ParsedItem, TokExtra<'src>> {
    choice((
        tok_record().map(ParsedItem::Record),
        tok_define_block(),
        tok_portfolio_block(),
        tok_plan_block(),
    ))
}

/// Skip tokens until the next statement boundary (for error recovery).
/// Consumes at least one token to make progress.
fn tok_skip_statement<'src>() -> impl Parser<'src, &'src [SpannedToken<'src>], (), TokExtra<'src>> {
    any()
        .then(
            any()
                .filter(|t: &SpannedToken<'_>| !t.token.starts_statement())
                .repeated(),
        )
        .to(())
}

/// Parse a complete file with error recovery.
fn tok_file<'src>(
) -> impl Parser<'src, &'src [SpannedToken<'src>], Vec<(ParsedItem, usize, usize)>, TokExtra<'src>>
{
    tok_statement()
        .map_with(|item, e| Some((item, e.span().start, e.span().end)))
        .recover_with(via_parser(
            // On error, skip to the next statement boundary and emit None
            tok_skip_statement().to(None),
        ))
        .repeated()
        .collect::<Vec<_>>()
        .map(|items| items.into_iter().flatten().collect())
}

// ============================================================================
// Block Folding
// ============================================================================

fn fold_define(
    symbol: Symbol,
    rules: Vec<IndexedRule<DefineRule>>,
    tokens: &[SpannedToken<'_>],
    errors: &mut Vec<ParseError>,
) -> AssetDefinition {
    let mut def = AssetDefinition::new(symbol);
    for (rule, start, end) in rules {
        let span = index_to_byte_span(tokens, start, end);
        match rule {
            DefineRule::Alias(alias) => {
                if def.alias.is_some() {
                    errors.push(duplicate_rule("ALIAS", "DEFINE", span));
                } else {
                    def = def.with_alias(alias);
                }
            }
            DefineRule::TargetReturn(target) => {
                if def.target_return.is_some() {
                    errors.push(duplicate_rule("TARGET RETURN", "DEFINE", span));
                } else {
                    def = def.with_target_return(target);
                }
            }
        }
    }
    def
}

fn fold_portfolio(
    name: String,
    rules: Vec<IndexedRule<PortfolioRule>>,
    tokens: &[SpannedToken<'_>],
    errors: &mut Vec<ParseError>,
) -> PortfolioDefinition {
    let mut members: Option<Vec<Symbol>> = None;
    let mut target_return = None;
    for (rule, start, end) in rules {
        let span = index_to_byte_span(tokens, start, end);
        match rule {
            PortfolioRule::Assets(symbols) => {
                if members.is_some() {
                    errors.push(duplicate_rule("ASSETS", "PORTFOLIO", span));
                } else {
                    members = Some(symbols);
                }
            }
            PortfolioRule::TargetReturn(target) => {
                if target_return.is_some() {
                    errors.push(duplicate_rule("TARGET RETURN", "PORTFOLIO", span));
                } else {
                    target_return = Some(target);
                }
            }
        }
    }
    let mut portfolio = PortfolioDefinition::new(name, members.unwrap_or_default());
    if let Some(target) = target_return {
        portfolio = portfolio.with_target_return(target);
    }
    portfolio
}

fn fold_plan(
    name: String,
    rules: Vec<IndexedRule<PlanRule>>,
    tokens: &[SpannedToken<'_>],
    errors: &mut Vec<ParseError>,
) -> PlanDefinition {
    let mut plan = PlanDefinition::new(name);
    for (rule, start, end) in rules {
        let span = index_to_byte_span(tokens, start, end);
        match rule {
            PlanRule::Schedule(schedule) => plan = plan.with_rule(schedule),
            PlanRule::Start(date) => {
                if plan.start_date.is_some() {
                    errors.push(duplicate_rule("START", "PLAN", span));
                } else {
                    plan = plan.with_start(date);
                }
            }
            PlanRule::End(date) => {
                if plan.end_date.is_some() {
                    errors.push(duplicate_rule("END_DATE", "PLAN", span));
                } else {
                    plan = plan.with_end(date);
                }
            }
        }
    }
    plan
}

fn duplicate_rule(rule: &'static str, block: &'static str, span: Span) -> ParseError {
    ParseError::new(ParseErrorKind::DuplicateRule { rule, block }, span)
}

// ============================================================================
// Public API
// ============================================================================

/// Parse folio source code.
pub fn parse(source: &str) -> ParseResult {
    let mut errors = Vec::new();

    // Lexical pass: surface error tokens and invalid calendar dates before
    // the grammar runs. Invalid dates are demoted to error tokens so the
    // statement containing them fails and recovers like any other error.
    let mut tokens: Vec<SpannedToken<'_>> = Vec::new();
    for (token, span) in tokenize(source) {
        let token = match token {
            Token::Error => {
                let text = span.text(source);
                let kind = if text.starts_with('"') {
                    ParseErrorKind::UnclosedString
                } else {
                    ParseErrorKind::UnexpectedChar(text.chars().next().unwrap_or('\0'))
                };
                errors.push(ParseError::new(kind, span));
                Token::Error
            }
            Token::Date(s) if date_from_token(s).is_none() => {
                errors.push(ParseError::new(
                    ParseErrorKind::InvalidDate(s.to_string()),
                    span,
                ));
                Token::Error
            }
            other => other,
        };
        tokens.push(SpannedToken::new(token, span.start, span.end));
    }

    let (items, errs) = tok_file().parse(tokens.as_slice()).into_output_errors();
    let items = items.unwrap_or_default();

    let mut statements = Vec::new();
    for (item, start_idx, end_idx) in items {
        let span = index_to_byte_span(&tokens, start_idx, end_idx);
        let statement = match item {
            ParsedItem::Record(record) => Statement::Record(record),
            ParsedItem::Define { symbol, rules } => {
                Statement::Define(fold_define(symbol, rules, &tokens, &mut errors))
            }
            ParsedItem::Portfolio { name, rules } => {
                Statement::Portfolio(fold_portfolio(name, rules, &tokens, &mut errors))
            }
            ParsedItem::Plan { name, rules } => {
                Statement::Plan(fold_plan(name, rules, &tokens, &mut errors))
            }
        };
        statements.push(Spanned::new(statement, span));
    }

    for e in errs {
        // Error tokens already produced a lexical diagnostic in the
        // pre-pass; reporting the grammar failure too would double up.
        if let Some(found) = e.found() {
            if matches!(found.token, Token::Error) {
                continue;
            }
        }
        let span = index_to_byte_span(&tokens, e.span().start, e.span().end);
        let kind = if e.found().is_none() {
            ParseErrorKind::UnexpectedEof
        } else {
            let found = e.found().map(|t| t.token.to_string()).unwrap_or_default();
            ParseErrorKind::SyntaxError(format!("unexpected token '{found}'"))
        };
        errors.push(ParseError::new(kind, span));
    }

    errors.sort_by_key(|e| e.span.start);

    ParseResult { statements, errors }
}
