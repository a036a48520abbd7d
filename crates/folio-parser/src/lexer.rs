//! DFA-based lexer using Logos.
//!
//! Tokenizes folio source text into a flat vector of spanned tokens.
//! Whitespace (including newlines) and `#` comments are skipped; statement
//! boundaries are recovered by the parser from dates and block keywords
//! rather than from line structure.

use logos::Logos;
use std::fmt;

use crate::Span;

/// Token types produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")] // Whitespace is only a separator
#[logos(skip r"#[^\n]*")] // Comments run to end of line
pub enum Token<'src> {
    // ===== Literals =====
    /// A date in YYYY-MM-DD shape. Calendar validity is checked in a
    /// post-pass so the error can carry the offending text.
    #[regex(r"\d{4}-\d{2}-\d{2}")]
    Date(&'src str),

    /// An unsigned decimal number: digits with an optional single
    /// fractional part. No exponent, no grouping separators, no sign
    /// (sign is a separate token, consumed contextually).
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number(&'src str),

    /// A double-quoted string. No escape processing; terminated by the
    /// next `"`. The slice includes the quotes.
    #[regex(r#""[^"\n]*""#)]
    String(&'src str),

    // ===== Keywords =====
    /// The `TRADE` record keyword.
    #[token("TRADE")]
    Trade,
    /// The `MARK` record keyword.
    #[token("MARK")]
    Mark,
    /// The `VALUE` keyword inside a `MARK` record.
    #[token("VALUE")]
    Value,
    /// The `DEFINE` block keyword.
    #[token("DEFINE")]
    Define,
    /// The `ALIAS` sub-rule keyword.
    #[token("ALIAS")]
    Alias,
    /// The `TARGET` keyword (always followed by `RETURN`).
    #[token("TARGET")]
    Target,
    /// The `RETURN` keyword.
    #[token("RETURN")]
    Return,
    /// The `PORTFOLIO` block keyword.
    #[token("PORTFOLIO")]
    Portfolio,
    /// The `ASSETS` sub-rule keyword.
    #[token("ASSETS")]
    Assets,
    /// The `PLAN` block keyword.
    #[token("PLAN")]
    Plan,
    /// The `SCHEDULE` sub-rule keyword.
    #[token("SCHEDULE")]
    Schedule,
    /// The `INTO` keyword inside a schedule rule.
    #[token("INTO")]
    Into,
    /// The `START` sub-rule keyword.
    #[token("START")]
    Start,
    /// The `END_DATE` sub-rule keyword.
    #[token("END_DATE")]
    EndDate,
    /// The `END` block terminator.
    #[token("END")]
    End,
    /// The `NOTE` trailer keyword.
    #[token("NOTE")]
    Note,
    /// The legacy `BUY` record keyword.
    #[token("BUY")]
    Buy,
    /// The legacy `SELL` record keyword.
    #[token("SELL")]
    Sell,
    /// The `OF` keyword in the legacy record form.
    #[token("OF")]
    Of,
    /// The `DAILY` frequency.
    #[token("DAILY")]
    Daily,
    /// The `WEEKLY` frequency.
    #[token("WEEKLY")]
    Weekly,
    /// The `MONTHLY` frequency.
    #[token("MONTHLY")]
    Monthly,
    /// The `QUARTERLY` frequency.
    #[token("QUARTERLY")]
    Quarterly,
    /// The `YEARLY` frequency.
    #[token("YEARLY")]
    Yearly,

    /// An uppercase identifier: asset class, ticker, or currency unit.
    /// Keywords take priority via exact-match tokens above.
    #[regex(r"[A-Z][A-Z0-9_]*")]
    Ident(&'src str),

    // ===== Punctuation =====
    /// Colon `:` separating asset class from ticker.
    #[token(":")]
    Colon,
    /// Comma `,` separating symbols in an `ASSETS` list.
    #[token(",")]
    Comma,
    /// At-sign `@` introducing a unit price.
    #[token("@")]
    At,
    /// Plus `+` sign prefix.
    #[token("+")]
    Plus,
    /// Minus `-` sign prefix.
    #[token("-")]
    Minus,

    /// Error token for unrecognized input.
    Error,
}

impl Token<'_> {
    /// Returns true if this keyword opens a top-level block.
    #[must_use]
    pub const fn is_block_keyword(&self) -> bool {
        matches!(self, Self::Define | Self::Portfolio | Self::Plan)
    }

    /// Returns true if this token can begin a top-level statement.
    /// Used by error recovery to find the next statement boundary.
    #[must_use]
    pub const fn starts_statement(&self) -> bool {
        matches!(self, Self::Date(_)) || self.is_block_keyword()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(s) | Self::Number(s) | Self::String(s) | Self::Ident(s) => {
                write!(f, "{s}")
            }
            Self::Trade => write!(f, "TRADE"),
            Self::Mark => write!(f, "MARK"),
            Self::Value => write!(f, "VALUE"),
            Self::Define => write!(f, "DEFINE"),
            Self::Alias => write!(f, "ALIAS"),
            Self::Target => write!(f, "TARGET"),
            Self::Return => write!(f, "RETURN"),
            Self::Portfolio => write!(f, "PORTFOLIO"),
            Self::Assets => write!(f, "ASSETS"),
            Self::Plan => write!(f, "PLAN"),
            Self::Schedule => write!(f, "SCHEDULE"),
            Self::Into => write!(f, "INTO"),
            Self::Start => write!(f, "START"),
            Self::EndDate => write!(f, "END_DATE"),
            Self::End => write!(f, "END"),
            Self::Note => write!(f, "NOTE"),
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Of => write!(f, "OF"),
            Self::Daily => write!(f, "DAILY"),
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
            Self::Quarterly => write!(f, "QUARTERLY"),
            Self::Yearly => write!(f, "YEARLY"),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::At => write!(f, "@"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Error => write!(f, "<error>"),
        }
    }
}

/// Tokenize source code into a vector of (Token, Span) pairs.
///
/// Lexer errors become [`Token::Error`] entries rather than aborting:
/// an unterminated string consumes the rest of its line as one error
/// token, and runs of adjacent unrecognized characters are merged into
/// a single error token.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Span)> {
    let mut tokens: Vec<(Token<'_>, Span)> = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span().into())),
            Err(()) => {
                if lexer.slice().starts_with('"') {
                    // Unterminated string: swallow the rest of the line so
                    // its contents do not lex as spurious tokens.
                    let rest = &source[lexer.span().end..];
                    let line_len = rest.find('\n').unwrap_or(rest.len());
                    lexer.bump(line_len);
                    tokens.push((Token::Error, lexer.span().into()));
                } else {
                    let span: Span = lexer.span().into();
                    match tokens.last_mut() {
                        Some((Token::Error, prev)) if prev.end == span.start => {
                            prev.end = span.end;
                        }
                        _ => tokens.push((Token::Error, span)),
                    }
                }
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lexes_trade_record() {
        let toks = kinds("2024-01-01 TRADE ETF:510300 +5000 CNY @ 4.56");
        assert_eq!(
            toks,
            vec![
                Token::Date("2024-01-01"),
                Token::Trade,
                Token::Ident("ETF"),
                Token::Colon,
                Token::Number("510300"),
                Token::Plus,
                Token::Number("5000"),
                Token::Ident("CNY"),
                Token::At,
                Token::Number("4.56"),
            ]
        );
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(kinds("END END_DATE ENDX"), vec![
            Token::End,
            Token::EndDate,
            Token::Ident("ENDX"),
        ]);
    }

    #[test]
    fn comments_and_newlines_are_skipped() {
        let toks = kinds("# heading\nDEFINE ETF:510300 # trailing\nEND\n");
        assert_eq!(
            toks,
            vec![
                Token::Define,
                Token::Ident("ETF"),
                Token::Colon,
                Token::Number("510300"),
                Token::End,
            ]
        );
    }

    #[test]
    fn strings_keep_quotes_in_slice() {
        let toks = tokenize(r#"ALIAS "CSI 300 ETF""#);
        assert_eq!(toks[1].0, Token::String("\"CSI 300 ETF\""));
    }

    #[test]
    fn unterminated_string_is_one_error_to_end_of_line() {
        let source = "ALIAS \"no close\n2024-01-01";
        let toks = tokenize(source);
        assert_eq!(toks[0].0, Token::Alias);
        assert_eq!(toks[1].0, Token::Error);
        assert_eq!(toks[1].1.text(source), "\"no close");
        assert_eq!(toks[2].0, Token::Date("2024-01-01"));
    }

    #[test]
    fn adjacent_bad_characters_merge() {
        let source = "abc TRADE";
        let toks = tokenize(source);
        assert_eq!(toks[0].0, Token::Error);
        assert_eq!(toks[0].1.text(source), "abc");
        assert_eq!(toks[1].0, Token::Trade);
    }

    #[test]
    fn ticker_with_leading_zeros_survives_as_number_slice() {
        let toks = kinds("FUND:007339");
        assert_eq!(toks, vec![
            Token::Ident("FUND"),
            Token::Colon,
            Token::Number("007339"),
        ]);
    }
}
