//! String clean-up operations used by the field derivation engine.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_FLOAT_ZERO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.0$").unwrap());
static LEADING_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s*,)+\s*").unwrap());
static TRAILING_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*,)+\s*$").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static SPACE_BEFORE_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+,").unwrap());

/// Strip the `.0` a float-typed export leaves on phones and postal codes.
///
/// `"62704.0"` becomes `"62704"`; anything else is returned unchanged.
pub fn strip_float_suffix(value: &str) -> String {
    TRAILING_FLOAT_ZERO.replace(value, "").into_owned()
}

/// Join address parts as `street, city state zip` and normalize the result.
///
/// Missing parts are passed as `""`; the normalization pass removes the
/// separators they leave behind.
pub fn build_address(street: &str, city: &str, state: &str, zip: &str) -> String {
    normalize_address(&format!("{}, {} {} {}", street, city, state, zip))
}

/// Clean up punctuation and spacing in a concatenated address.
///
/// Idempotent: normalizing an already-normalized address is a no-op.
pub fn normalize_address(address: &str) -> String {
    let s = LEADING_COMMAS.replace(address, "");
    let s = TRAILING_COMMAS.replace(&s, "");
    let s = WHITESPACE_RUNS.replace_all(&s, " ");
    let s = SPACE_BEFORE_COMMA.replace_all(&s, ",");
    s.trim().to_string()
}

/// Case- and whitespace-insensitive equality.
pub fn loosely_equals(value: &str, expected: &str) -> bool {
    value.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_float_suffix() {
        assert_eq!(strip_float_suffix("62704.0"), "62704");
        assert_eq!(strip_float_suffix("5551234567.0"), "5551234567");
        assert_eq!(strip_float_suffix("62704"), "62704");
        assert_eq!(strip_float_suffix("1.05"), "1.05");
        assert_eq!(strip_float_suffix("10.00"), "10.00");
        assert_eq!(strip_float_suffix(""), "");
    }

    #[test]
    fn test_full_address() {
        assert_eq!(
            build_address("12 Elm St", "Springfield", "IL", "62704"),
            "12 Elm St, Springfield IL 62704"
        );
    }

    #[test]
    fn test_missing_components() {
        assert_eq!(build_address("", "Springfield", "IL", "62704"), "Springfield IL 62704");
        assert_eq!(build_address("12 Elm St", "", "", ""), "12 Elm St");
        assert_eq!(build_address("12 Elm St", "", "IL", "62704"), "12 Elm St, IL 62704");
        assert_eq!(build_address("12 Elm St", "Springfield", "", "62704"), "12 Elm St, Springfield 62704");
        assert_eq!(build_address("", "", "", ""), "");
    }

    #[test]
    fn test_space_before_comma_removed() {
        assert_eq!(build_address("12 Elm St ", "Springfield", "IL", "62704"), "12 Elm St, Springfield IL 62704");
        assert_eq!(normalize_address("a  ,  b"), "a, b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "12 Elm St, Springfield IL 62704",
            ", , Springfield   IL ,",
            "  ,12 Elm St ,,  IL  ",
            "12 Elm St,\t\tSpringfield",
            "",
            ",",
        ];
        for sample in samples {
            let once = normalize_address(sample);
            assert_eq!(normalize_address(&once), once, "input: {:?}", sample);
            assert!(!once.starts_with(','));
            assert!(!once.ends_with(','));
            assert!(!once.contains("  "));
        }
    }

    #[test]
    fn test_loosely_equals() {
        assert!(loosely_equals(" HOME owner ", "home owner"));
        assert!(loosely_equals("Yes", "yes"));
        assert!(!loosely_equals("renter", "home owner"));
    }
}
