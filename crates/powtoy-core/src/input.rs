//! Lenient parsing of raw form fields.
//!
//! Anything that does not parse becomes zero, so the hashing and mining
//! functions only ever receive well-formed values.

use crate::difficulty::{Difficulty, DifficultyError};
use crate::encoding::{Amount, Transaction};

/// Parse the leading integer of `raw`, ignoring surrounding whitespace and
/// anything after the digits. No digits at all yields 0.
pub fn parse_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            break;
        }
        seen = true;
        let digit = i64::from(c - b'0');
        value = match value.checked_mul(10).and_then(|v| v.checked_add(digit)) {
            Some(v) => v,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }

    match (seen, negative) {
        (false, _) => 0,
        (true, true) => -value,
        (true, false) => value,
    }
}

/// Parse a nonce field. Negative or unparsable input is 0.
pub fn parse_nonce(raw: &str) -> u64 {
    u64::try_from(parse_int(raw)).unwrap_or(0)
}

/// Parse a transaction-count field. Negative or unparsable input is 0.
pub fn parse_count(raw: &str) -> usize {
    usize::try_from(parse_int(raw)).unwrap_or(0)
}

/// Parse an amount field. Unparsable or non-finite input is 0.
pub fn parse_amount(raw: &str) -> Amount {
    raw.trim().parse::<f64>().map(Amount::new).unwrap_or(Amount::ZERO)
}

/// Parse a difficulty field. Negative or unparsable input is 0; values that
/// can never be met are rejected.
pub fn parse_difficulty(raw: &str) -> Result<Difficulty, DifficultyError> {
    Difficulty::coerce(parse_int(raw))
}

impl Transaction {
    /// Build a transaction from the three raw form fields.
    pub fn from_fields(from: &str, to: &str, amount: &str) -> Self {
        Transaction::new(from, to, parse_amount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  -7"), -7);
        assert_eq!(parse_int("+3"), 3);
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("3.9"), 3);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int("-"), 0);
        assert_eq!(parse_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_parse_nonce_and_count() {
        assert_eq!(parse_nonce("17"), 17);
        assert_eq!(parse_nonce("-1"), 0);
        assert_eq!(parse_nonce("NaN"), 0);
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10"), Amount::from(10i64));
        assert_eq!(parse_amount(" 2.5 "), Amount::from(2.5));
        assert_eq!(parse_amount(""), Amount::ZERO);
        assert_eq!(parse_amount("ten"), Amount::ZERO);
        assert_eq!(parse_amount("inf"), Amount::ZERO);
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!(parse_difficulty(""), Ok(Difficulty::ZERO));
        assert_eq!(parse_difficulty("-2"), Ok(Difficulty::ZERO));
        assert_eq!(parse_difficulty("4").unwrap().zeros(), 4);
        assert!(parse_difficulty("44").is_err());
    }

    #[test]
    fn test_transaction_from_fields() {
        let tx = Transaction::from_fields("alice", "bob", "oops");
        assert_eq!(tx, Transaction::new("alice", "bob", 0));
    }
}
