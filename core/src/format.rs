//! Display formatting for derived values and dates.

use chrono::NaiveDate;

/// Placeholder shown for a derived value that has no meaningful number.
pub const NO_VALUE: &str = "-";

/// Extra digits inspected past the rounding position to detect exact ties.
const GUARD_DIGITS: usize = 40;

/// Format `value` with `digits` fractional digits.
///
/// Exact binary ties round away from zero (`0.125` -> `"0.13"`), matching the
/// browser's `toFixed`; everything else is correctly rounded.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let widened = format!("{:.*}", digits + 1 + GUARD_DIGITS, value);
    let (head, guard) = widened.split_at(widened.len() - GUARD_DIGITS);
    let is_tie = head.ends_with('5') && guard.bytes().all(|b| b == b'0');
    if !is_tie {
        return format!("{:.*}", digits, value);
    }

    let truncated = head[..head.len() - 1].trim_end_matches('.');
    round_up_last_digit(truncated)
}

/// Add one unit in the last place to the magnitude of a decimal string.
fn round_up_last_digit(truncated: &str) -> String {
    let (sign, body) = match truncated.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", truncated),
    };

    let mut digits: Vec<u8> = body.bytes().collect();
    let mut carry = true;
    for b in digits.iter_mut().rev() {
        if !carry {
            break;
        }
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                carry = false;
            }
        }
    }

    let mut out = String::from(sign);
    if carry {
        out.push('1');
    }
    out.extend(digits.into_iter().map(char::from));
    out
}

/// Format a derived value, or [`NO_VALUE`] when it is not strictly positive.
pub fn display_or_dash(value: f64, digits: usize) -> String {
    if value > 0.0 {
        to_fixed(value, digits)
    } else {
        NO_VALUE.to_string()
    }
}

/// Render an ISO `YYYY-MM-DD` date as `DD/MM/YYYY`.
///
/// Input that is not an ISO date is returned unchanged.
pub fn format_date_br(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => iso.to_string(),
    }
}
