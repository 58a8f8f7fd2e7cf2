//! Friend ID format contract
//!
//! Friend IDs are user-chosen, globally unique, human-shareable identifiers
//! in ####-####-####-#### format, distinct from the internal account id.
//! They appear both as URL path segments and as the profile uniqueness key,
//! so the format is validated before any lookup or write.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FRIEND_ID_RE: Regex = Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{4}$").unwrap();
}

/// Check a friend ID against the ####-####-####-#### format
pub fn is_valid(friend_id: &str) -> bool {
    FRIEND_ID_RE.is_match(friend_id)
}

/// Re-format free-typed input: strip everything that is not a digit, insert a
/// hyphen after every full group of four, and cap at 16 digits.
///
/// Mirrors the input masking on the profile form, so pasting
/// "1234567890123456" yields "1234-5678-9012-3456".
pub fn format_partial(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(16)
        .collect();

    let mut out = String::with_capacity(19);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push('-');
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_friend_id() {
        assert!(is_valid("1234-5678-9012-3456"));
        assert!(is_valid("0000-0000-0000-0000"));
    }

    #[test]
    fn rejects_missing_hyphens() {
        assert!(!is_valid("1234567890123456"));
    }

    #[test]
    fn rejects_short_groups() {
        assert!(!is_valid("1234-5678-9012-345"));
        assert!(!is_valid("123-5678-9012-3456"));
    }

    #[test]
    fn rejects_non_digit_groups() {
        assert!(!is_valid("abcd-efgh-ijkl-mnop"));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(!is_valid("1234-5678-9012-3456 "));
        assert!(!is_valid("1234-5678-9012-34567"));
    }

    #[test]
    fn format_partial_inserts_hyphens() {
        assert_eq!(format_partial("1234567890123456"), "1234-5678-9012-3456");
        assert_eq!(format_partial("12345"), "1234-5");
    }

    #[test]
    fn format_partial_strips_non_digits() {
        assert_eq!(format_partial("12ab34-5678"), "1234-5678");
        assert_eq!(format_partial(""), "");
    }

    #[test]
    fn format_partial_caps_at_sixteen_digits() {
        assert_eq!(
            format_partial("12345678901234567890"),
            "1234-5678-9012-3456"
        );
    }

    #[test]
    fn format_partial_round_trips_to_valid() {
        assert!(is_valid(&format_partial("9999888877776666")));
    }
}
