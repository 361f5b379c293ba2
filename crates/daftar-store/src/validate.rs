//! Boundary validation helpers.
//!
//! The repositories themselves never validate: callers run these checks
//! before handing values to the store. Rejections surface as
//! [`StoreError::Invalid`].

use crate::error::{Result, StoreError};

/// Reject empty or whitespace-only names, returning the trimmed text.
pub fn require_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Invalid("name must not be empty".into()));
    }
    Ok(trimmed)
}

/// Parse decimal currency text into fixed-point minor units.
///
/// Accepts an optional sign, thousands separators and at most two fractional
/// digits: `"1,234.5"` becomes `123450`. Anything else is rejected.
pub fn parse_amount(text: &str) -> Result<i64> {
    let invalid = || StoreError::Invalid(format!("not a valid amount: {text:?}"));

    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > 2 {
        return Err(StoreError::Invalid(format!(
            "more than two decimal places: {text:?}"
        )));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    // Pad the fraction to two places: ".5" means 50 minor units.
    let frac_units: i64 = match frac.as_bytes() {
        [] => 0,
        [d] => i64::from(d - b'0') * 10,
        [d1, d2] => i64::from(d1 - b'0') * 10 + i64::from(d2 - b'0'),
        _ => unreachable!("fraction length checked above"),
    };

    let minor = whole_units
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(invalid)?;

    Ok(if negative { -minor } else { minor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_have_substance() {
        assert_eq!(require_name("  Ahmed ").unwrap(), "Ahmed");
        assert!(require_name("").is_err());
        assert!(require_name("   ").is_err());
    }

    #[test]
    fn amounts_parse_to_minor_units() {
        assert_eq!(parse_amount("1234").unwrap(), 123_400);
        assert_eq!(parse_amount("1,234.5").unwrap(), 123_450);
        assert_eq!(parse_amount("0.05").unwrap(), 5);
        assert_eq!(parse_amount(".75").unwrap(), 75);
        assert_eq!(parse_amount("-20").unwrap(), -2_000);
        assert_eq!(parse_amount(" 7.00 ").unwrap(), 700);
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        for bad in ["", "   ", "abc", "12.345", "1.2.3", "12a", "--5", "."] {
            assert!(parse_amount(bad).is_err(), "accepted {bad:?}");
        }
        // Saturation guard.
        assert!(parse_amount("92233720368547758079").is_err());
    }
}
