//! Lenient numeric coercion for form inputs.
//!
//! Parameter fields hold whatever the inspector typed. They are read the way a
//! browser's `parseFloat(x) || 0` reads them: leading whitespace is skipped,
//! the longest numeric prefix is taken, and anything without one counts as 0.

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    IResult, Parser,
};

/// Coerce raw field text to a number. Never fails.
///
/// Missing, non-numeric and non-finite input all become `0.0`.
pub fn coerce(raw: &str) -> f64 {
    match numeric_prefix(raw) {
        Ok((_, text)) => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(0.0),
        Err(_) => 0.0,
    }
}

/// Recognize `[+-](digits[.digits]|.digits)[(e|E)[+-]digits]` after optional whitespace.
fn numeric_prefix(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(input)?;
    recognize((
        opt(one_of("+-")),
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}
