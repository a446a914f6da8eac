//! Line classifier: decides whether an OCR token opens a new player record
//!
//! The table layout puts the player name first in reading order, so a
//! token opening with an uppercase letter starts a record. OCR adds one
//! wrinkle: a missing placeholder field is often fused with the next name
//! glyph and comes back as `0.<letter>`, which must also count as a start.

use crate::types::StatFamily;

/// Ellipsis artifact the OCR emits between pitching fields
const SKIP_MARKER: &str = "...";

/// Classification of one raw OCR token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Token opens a new player record (it is the player name)
    RecordStart,
    /// Token belongs to the currently open record
    Continuation,
    /// OCR artifact, neither starts nor continues a record
    Skip,
}

/// Classify one token within its statistic family.
///
/// The skip marker is only transparent for the pitching layout; in the
/// batting layout the same glyphs would be a (malformed) field and fall
/// through to the zero sentinel during coercion.
pub fn classify(token: &str, family: StatFamily) -> TokenClass {
    if family == StatFamily::Pitching && token == SKIP_MARKER {
        return TokenClass::Skip;
    }

    if is_record_start(token) {
        TokenClass::RecordStart
    } else {
        TokenClass::Continuation
    }
}

/// A token starts a record if its first character is an uppercase letter,
/// or it matches the zero-period-letter misread pattern.
fn is_record_start(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => true,
        Some('0') => matches!(
            (chars.next(), chars.next()),
            (Some('.'), Some(third)) if third.is_alphabetic()
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_name_starts_record() {
        assert_eq!(
            classify("Trout", StatFamily::Batting),
            TokenClass::RecordStart
        );
        assert_eq!(
            classify("Ohtani", StatFamily::Pitching),
            TokenClass::RecordStart
        );
    }

    #[test]
    fn test_numeric_token_is_continuation() {
        assert_eq!(classify("42", StatFamily::Batting), TokenClass::Continuation);
        assert_eq!(
            classify("0.500", StatFamily::Batting),
            TokenClass::Continuation
        );
    }

    #[test]
    fn test_zero_period_letter_starts_record() {
        // OCR misread of a placeholder field fused with the next name
        assert_eq!(classify("0.A", StatFamily::Batting), TokenClass::RecordStart);
        assert_eq!(
            classify("0.Buxton", StatFamily::Pitching),
            TokenClass::RecordStart
        );
    }

    #[test]
    fn test_zero_period_digit_is_continuation() {
        assert_eq!(
            classify("0.123", StatFamily::Batting),
            TokenClass::Continuation
        );
    }

    #[test]
    fn test_ellipsis_skipped_for_pitching_only() {
        assert_eq!(classify("...", StatFamily::Pitching), TokenClass::Skip);
        assert_eq!(classify("...", StatFamily::Batting), TokenClass::Continuation);
    }

    #[test]
    fn test_lowercase_name_is_continuation() {
        // Deliberate: leniency means a garbled name simply never opens a
        // record, and its fields are dropped with it
        assert_eq!(
            classify("trout", StatFamily::Batting),
            TokenClass::Continuation
        );
    }

    #[test]
    fn test_empty_token_is_continuation() {
        assert_eq!(classify("", StatFamily::Batting), TokenClass::Continuation);
    }
}
