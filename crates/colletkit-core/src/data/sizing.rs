//! Lenient size parsing
//!
//! Sizes arrive as "6", "6mm", "3,175", "Ø 3.175 mm (1/8\")" and so on.
//! The first unsigned decimal number in the text wins.

use regex::Regex;
use std::sync::OnceLock;

static SIZE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Extract a millimeter value from a loosely formatted size string
///
/// The first comma is read as a decimal separator. Returns `None` when the
/// text holds no number at all; never panics.
pub fn parse_size(raw: &str) -> Option<f64> {
    let regex = SIZE_REGEX.get_or_init(|| Regex::new(r"[0-9]+(\.[0-9]+)?").expect("invalid size pattern"));
    let normalized = raw.replacen(',', ".", 1);
    regex
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_size("6"), Some(6.0));
        assert_eq!(parse_size("3.175"), Some(3.175));
    }

    #[test]
    fn test_units_and_labels() {
        assert_eq!(parse_size("6mm"), Some(6.0));
        assert_eq!(parse_size("Pinça 3.175 mm"), Some(3.175));
        assert_eq!(parse_size("Ø 5 mm"), Some(5.0));
    }

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_size("3,175"), Some(3.175));
        assert_eq!(parse_size("3,175mm"), Some(3.175));
    }

    #[test]
    fn test_first_number_wins() {
        assert_eq!(parse_size("3.175 (1/8\")"), Some(3.175));
        assert_eq!(parse_size("1/8\""), Some(1.0));
    }

    #[test]
    fn test_unsigned_only() {
        assert_eq!(parse_size("-6"), Some(6.0));
    }

    #[test]
    fn test_no_number() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("abc"), None);
        assert_eq!(parse_size("   "), None);
        assert_eq!(parse_size("mm"), None);
    }

    #[test]
    fn test_only_ascii_digits_count() {
        assert_eq!(parse_size("Ø٣ 6mm"), Some(6.0));
        assert_eq!(parse_size("٣"), None);
    }

    #[test]
    fn test_trailing_dot_is_integer() {
        assert_eq!(parse_size("6."), Some(6.0));
    }
}
