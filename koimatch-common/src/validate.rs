//! Input validation rules for user identity fields
//!
//! A registered display name is 2-20 characters of full-width katakana
//! (including the prolonged sound mark), no whitespace. Birthdays are
//! `YYYY-MM-DD` text compared by string equality only - they are never
//! parsed as calendar dates, so `2001-02-30` is accepted here and simply
//! never matches a real person's entry.
//!
//! Declared crush targets are deliberately NOT validated or normalized:
//! matching is exact string equality, so a target written in the wrong
//! script is silently treated as "no match".

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum display name length in characters
pub const NAME_MAX_CHARS: usize = 20;

/// Minimum display name length in characters
pub const NAME_MIN_CHARS: usize = 2;

static KANA_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ァ-ヶー]{2,20}$").expect("valid kana name regex"));

static BIRTHDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid birthday regex"));

/// Check whether a display name satisfies the registration name rule:
/// 2-20 full-width katakana characters, no whitespace.
pub fn is_valid_kana_name(name: &str) -> bool {
    KANA_NAME_RE.is_match(name)
}

/// Check whether a birthday string matches the literal `YYYY-MM-DD` pattern.
pub fn is_valid_birthday(birthday: &str) -> bool {
    BIRTHDAY_RE.is_match(birthday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_katakana_names() {
        assert!(is_valid_kana_name("タナカハナコ"));
        assert!(is_valid_kana_name("サトー"));
        assert!(is_valid_kana_name("アア"));
    }

    #[test]
    fn rejects_non_katakana_names() {
        assert!(!is_valid_kana_name("たなかはなこ")); // hiragana
        assert!(!is_valid_kana_name("田中花子")); // kanji
        assert!(!is_valid_kana_name("Tanaka")); // latin
        assert!(!is_valid_kana_name("タナカ ハナコ")); // whitespace
        assert!(!is_valid_kana_name("ﾀﾅｶ")); // half-width katakana
    }

    #[test]
    fn rejects_out_of_range_name_lengths() {
        assert!(!is_valid_kana_name(""));
        assert!(!is_valid_kana_name("ア")); // 1 char
        assert!(!is_valid_kana_name(&"ア".repeat(21))); // 21 chars
        assert!(is_valid_kana_name(&"ア".repeat(20)));
    }

    #[test]
    fn accepts_pattern_shaped_birthdays() {
        assert!(is_valid_birthday("1995-05-05"));
        // Literal pattern match only - not calendar-validated
        assert!(is_valid_birthday("2001-02-30"));
        assert!(is_valid_birthday("0000-00-00"));
    }

    #[test]
    fn rejects_malformed_birthdays() {
        assert!(!is_valid_birthday("2000/01/15"));
        assert!(!is_valid_birthday("2000-1-15"));
        assert!(!is_valid_birthday("15-01-2000"));
        assert!(!is_valid_birthday(""));
        assert!(!is_valid_birthday("2000-01-15 ")); // trailing whitespace
    }
}
