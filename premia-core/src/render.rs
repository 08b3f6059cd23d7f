//! Text rendering of dates and numbers for export.
//!
//! Numbers are rounded half-away-from-zero at a fixed number of decimal
//! places, then trailing zeros and a bare point are trimmed, so `3.0`
//! renders as `3` and `0.050000` as `0.05`. Rounding works on the shortest
//! round-trip decimal form of the value, which keeps boundary cases like
//! `0.1234565` rounding the way the printed digits suggest.

use chrono::NaiveDate;

/// Decimal places for value columns in full exports.
pub const FULL_DECIMAL_PLACES: usize = 6;
/// Decimal places for condensed percentile exports.
pub const CONDENSED_DECIMAL_PLACES: usize = 4;

/// ISO-8601 calendar date.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render a number at up to `places` decimal places.
pub fn format_number(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // Display for f64 is the shortest decimal that round-trips, never
    // scientific notation.
    let repr = format!("{value}");
    let (negative, unsigned) = match repr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, repr.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };

    let rounded = if frac_part.len() <= places {
        trim_trailing(int_part, frac_part)
    } else {
        let kept = &frac_part[..places];
        let round_up = frac_part.as_bytes()[places] >= b'5';
        let mut combined: String = format!("{int_part}{kept}");
        if round_up {
            combined = increment_decimal(&combined);
        }
        let split = combined.len() - places;
        trim_trailing(&combined[..split], &combined[split..])
    };

    if negative && rounded != "0" {
        format!("-{rounded}")
    } else {
        rounded
    }
}

fn trim_trailing(int_part: &str, frac_part: &str) -> String {
    let frac = frac_part.trim_end_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac}")
    }
}

/// Add one to a string of ASCII digits, carrying as needed.
fn increment_decimal(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8(bytes).unwrap_or_default();
        }
    }
    bytes.insert(0, b'1');
    String::from_utf8(bytes).unwrap_or_default()
}
