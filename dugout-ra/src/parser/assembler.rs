//! Row assembler: folds classified tokens into fixed-arity player rows
//!
//! A two-state automaton over the token stream: awaiting a record start
//! (no open row), or accumulating fields into the open row. Rows seal at
//! exact arity; anything left open when the stream ends, or displaced by
//! the next record start, is discarded. No partial row ever reaches the
//! store.

use crate::parser::classifier::{classify, TokenClass};
use crate::types::{normalize_player_name, BattingLine, PitchingLine, StatFamily};
use tracing::debug;

/// Literal zero token, as OCR emits it
const ZERO_TOKEN: &str = "0";

/// Rate fields at or above this value lost their leading "0." to OCR
const RATE_MISREAD_THRESHOLD: f64 = 2.0;

/// Assemble batting rows from one image's token stream.
pub fn assemble_batting(tokens: &[String]) -> Vec<BattingLine> {
    assemble_rows(tokens, StatFamily::Batting)
        .into_iter()
        .map(|(name, f)| BattingLine {
            player_name: normalize_player_name(&name),
            ab: coerce_count(&f[0]),
            h: coerce_count(&f[1]),
            bb: coerce_count(&f[2]),
            slg: coerce_rate(&f[3]),
            bbk: coerce_rate(&f[4]),
            hr: coerce_count(&f[5]),
            so: coerce_count(&f[6]),
            sb: coerce_count(&f[7]),
            sb_pct: coerce_count(&f[8]),
        })
        .collect()
}

/// Assemble pitching rows from one image's token stream.
pub fn assemble_pitching(tokens: &[String]) -> Vec<PitchingLine> {
    assemble_rows(tokens, StatFamily::Pitching)
        .into_iter()
        .map(|(name, f)| PitchingLine {
            player_name: normalize_player_name(&name),
            outs: innings_to_outs(&f[0]),
            r: coerce_count(&f[1]),
            h: coerce_count(&f[2]),
            bb: coerce_count(&f[3]),
            slg: coerce_number(&f[4]),
            hr: coerce_count(&f[5]),
            so: coerce_count(&f[6]),
            g: coerce_count(&f[7]),
        })
        .collect()
}

/// Run the automaton, returning `(name, fields)` pairs at exact arity.
///
/// `current == None` is the awaiting-record-start state. A record-start
/// token while a row is open replaces it: the unfinished row is dropped,
/// matching the lenient posture the lossy input demands.
fn assemble_rows(tokens: &[String], family: StatFamily) -> Vec<(String, Vec<String>)> {
    let arity = family.numeric_arity();
    let mut rows = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for token in tokens {
        match classify(token, family) {
            TokenClass::Skip => continue,
            TokenClass::RecordStart => {
                if let Some((name, fields)) = current.take() {
                    debug!(
                        player = %name,
                        fields = fields.len(),
                        "Discarding partial row displaced by new record start"
                    );
                }
                current = Some((token.clone(), Vec::with_capacity(arity)));
            }
            TokenClass::Continuation => {
                let Some((_, fields)) = current.as_mut() else {
                    debug!(token = %token, "Dropping continuation token with no open record");
                    continue;
                };
                fields.push(token.clone());

                // Trailing stolen-base-rate correction: a zero stolen-base
                // count implies a zero attempt rate, and OCR drops the rate
                // token in that situation
                if family == StatFamily::Batting
                    && fields.len() == arity - 1
                    && fields.last().map(String::as_str) == Some(ZERO_TOKEN)
                {
                    fields.push(ZERO_TOKEN.to_string());
                }

                if fields.len() == arity {
                    if let Some(sealed) = current.take() {
                        rows.push(sealed);
                    }
                }
            }
        }
    }

    if let Some((name, fields)) = current {
        debug!(
            player = %name,
            fields = fields.len(),
            "Discarding partial row at end of stream"
        );
    }

    rows
}

/// Parse a numeric token: integer if it has no decimal point, decimal
/// otherwise. Failures degrade to the zero sentinel.
fn coerce_number(token: &str) -> f64 {
    if token.contains('.') {
        token.parse::<f64>().unwrap_or(0.0)
    } else {
        token.parse::<i64>().map(|v| v as f64).unwrap_or(0.0)
    }
}

fn coerce_count(token: &str) -> i64 {
    coerce_number(token) as i64
}

/// Coerce a batting rate field, recovering values whose leading "0." the
/// OCR dropped (0.500 read as 500).
fn coerce_rate(token: &str) -> f64 {
    let value = coerce_number(token);
    if value >= RATE_MISREAD_THRESHOLD {
        value / 1000.0
    } else {
        value
    }
}

/// Convert a fractional innings-pitched token to outs.
///
/// Innings are scored in thirds: `N.1` is N innings plus one out, `N.2`
/// plus two. Any other fractional digit is OCR noise and counts as a
/// whole number of innings.
fn innings_to_outs(token: &str) -> i64 {
    match token.split_once('.') {
        Some((whole, frac)) => {
            let innings = whole.parse::<i64>().unwrap_or(0);
            match frac {
                "1" => innings * 3 + 1,
                "2" => innings * 3 + 2,
                _ => innings * 3,
            }
        }
        None => token.parse::<i64>().unwrap_or(0) * 3,
    }
}
