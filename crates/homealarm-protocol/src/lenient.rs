//! Lenient numeric parsing of device values.
//!
//! Switch and digit readings arrive as free text in the value field. They are
//! read the way a C `sscanf("%d")` / `sscanf("%lf")` reads them: leading
//! whitespace is skipped, the longest numeric prefix is taken, and anything
//! after it is ignored. Text with no numeric prefix reads as zero instead of
//! failing, so a garbled reading still reaches the handler.
//!
//! ```
//! use homealarm_protocol::lenient::{parse_float, parse_int};
//!
//! assert_eq!(parse_int(" 1"), 1);
//! assert_eq!(parse_int("12abc"), 12);
//! assert_eq!(parse_int("on"), 0);
//! assert_eq!(parse_float("21.5C"), 21.5);
//! assert_eq!(parse_float(""), 0.0);
//! ```

/// Read an integer prefix, or `0` when there is none or it overflows.
pub fn parse_int(text: &str) -> i32 {
    numeric_prefix(text.trim_start(), false)
        .parse()
        .unwrap_or(0)
}

/// Read a decimal floating-point prefix, or `0.0` when there is none.
pub fn parse_float(text: &str) -> f64 {
    numeric_prefix(text.trim_start(), true)
        .parse()
        .unwrap_or(0.0)
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
///
/// Fraction and exponent parts are only considered when `fractional` is set.
/// Returns an empty slice if the prefix holds no mantissa digit.
fn numeric_prefix(s: &str, fractional: bool) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
            + start
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if fractional {
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            mantissa_digits += frac_end - end - 1;
            if mantissa_digits > 0 {
                end = frac_end;
            }
        }

        if mantissa_digits > 0 && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_start = end + 1;
            if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
                exp_start += 1;
            }
            let exp_end = digits_from(exp_start);
            if exp_end > exp_start {
                end = exp_end;
            }
        }
    }

    if mantissa_digits == 0 { "" } else { &s[..end] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("1", 1)]
    #[case("2", 2)]
    #[case("  42", 42)]
    #[case("-7", -7)]
    #[case("+3", 3)]
    #[case("12abc", 12)]
    #[case("1.9", 1)]
    #[case("", 0)]
    #[case("abc", 0)]
    #[case("-", 0)]
    #[case("99999999999", 0)]
    fn test_parse_int(#[case] text: &str, #[case] expected: i32) {
        assert_eq!(parse_int(text), expected);
    }

    #[rstest]
    #[case("21.5", 21.5)]
    #[case(" 0.25", 0.25)]
    #[case("-3.5", -3.5)]
    #[case("5.", 5.0)]
    #[case(".5", 0.5)]
    #[case("1e3", 1000.0)]
    #[case("2.5E-1", 0.25)]
    #[case("7e", 7.0)]
    #[case("7e+", 7.0)]
    #[case("40%", 40.0)]
    #[case("", 0.0)]
    #[case(".", 0.0)]
    #[case("smoke", 0.0)]
    fn test_parse_float(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(parse_float(text), expected);
    }
}
