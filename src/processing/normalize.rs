//! Asset-code normalization.

use crate::types::Value;

/// Canonical form of a raw asset-code cell.
///
/// Text cells have every character that is not an ASCII decimal digit removed. Any other
/// value (null, numbers, booleans) is returned unchanged. No range validation is done, so very
/// long digit runs pass through as-is.
pub fn normalize_code(raw: &Value) -> Value {
    match raw {
        Value::Utf8(s) => Value::Utf8(digits_only(s)),
        other => other.clone(),
    }
}

/// Keep only the ASCII decimal digits of `s`.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::{digits_only, normalize_code};
    use crate::types::Value;

    #[test]
    fn strips_every_non_digit() {
        assert_eq!(normalize_code(&Value::text("A-123/45")), Value::text("12345"));
        assert_eq!(normalize_code(&Value::text(" 00 12 ")), Value::text("0012"));
    }

    #[test]
    fn empty_and_non_text_pass_through() {
        assert_eq!(normalize_code(&Value::text("")), Value::text(""));
        assert_eq!(normalize_code(&Value::Null), Value::Null);
        assert_eq!(normalize_code(&Value::Int64(42)), Value::Int64(42));
    }

    #[test]
    fn text_without_digits_becomes_empty() {
        assert_eq!(digits_only("Computer"), "");
        assert_eq!(digits_only("ไม่มี"), "");
    }

    #[test]
    fn long_digit_runs_are_kept() {
        let long = "9".repeat(64);
        assert_eq!(digits_only(&long), long);
    }
}
