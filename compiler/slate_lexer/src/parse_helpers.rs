//! Numeric Parsing Helpers
//!
//! Zero-allocation parsing utilities for numeric literals with underscore separators.

/// Parse integer skipping underscores without allocation.
///
/// Returns `None` on overflow past `i64::MAX` or on a digit outside `radix`.
#[inline]
pub(crate) fn parse_int_skip_underscores(s: &str, radix: u32) -> Option<i64> {
    let mut result: i64 = 0;
    for c in s.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix)?;
        result = result.checked_mul(i64::from(radix))?;
        result = result.checked_add(i64::from(digit))?;
    }
    Some(result)
}

/// Parse float - only allocate if underscores present.
#[inline]
pub(crate) fn parse_float_skip_underscores(s: &str) -> Option<f64> {
    if s.contains('_') {
        s.replace('_', "").parse().ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_skip_underscores() {
        assert_eq!(parse_int_skip_underscores("123", 10), Some(123));
        assert_eq!(parse_int_skip_underscores("1_000_000", 10), Some(1_000_000));
        assert_eq!(parse_int_skip_underscores("ff", 16), Some(255));
        assert_eq!(parse_int_skip_underscores("1010", 2), Some(10));
        assert_eq!(parse_int_skip_underscores("777", 8), Some(511));
    }

    #[test]
    fn test_parse_int_overflow() {
        assert_eq!(parse_int_skip_underscores("9223372036854775807", 10), Some(i64::MAX));
        assert_eq!(parse_int_skip_underscores("9223372036854775808", 10), None);
    }

    #[test]
    fn test_parse_float_skip_underscores() {
        assert_eq!(parse_float_skip_underscores("2.5"), Some(2.5));
        assert_eq!(parse_float_skip_underscores("1_000.5"), Some(1000.5));
        assert_eq!(parse_float_skip_underscores("1e3"), Some(1000.0));
        assert_eq!(parse_float_skip_underscores(".5"), Some(0.5));
        assert_eq!(parse_float_skip_underscores("1."), Some(1.0));
    }
}
