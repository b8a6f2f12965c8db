//! Limits mirroring the backend's domain rules.
//!
//! These match `NAME_MIN`/`NAME_MAX` and `NOTE_MAX` in the backend's domain
//! module. Keeping them in sync ensures generated data is always accepted
//! when replayed through the backend services.
//!
//! # Validation Rules
//!
//! - Account and category names: 1 to 25 characters after trimming
//! - Record notes: at most 50 characters
//! - Currency codes: three upper-case ASCII letters

/// Shortest accepted account or category name, in characters.
pub const NAME_MIN: usize = 1;

/// Longest accepted account or category name, in characters.
pub const NAME_MAX: usize = 25;

/// Longest accepted record note, in characters.
pub const NOTE_MAX: usize = 50;

/// Validates an account or category name against backend constraints.
///
/// # Examples
///
/// ```
/// use budget_fixtures::is_valid_name;
///
/// assert!(is_valid_name("Groceries"));
/// assert!(!is_valid_name("   "));
/// assert!(!is_valid_name("A name that is far too long"));
/// ```
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    (NAME_MIN..=NAME_MAX).contains(&name.trim().chars().count())
}

/// Validates a record note against backend constraints.
///
/// Empty notes are allowed.
#[must_use]
pub fn is_valid_note(note: &str) -> bool {
    note.chars().count() <= NOTE_MAX
}

/// Whether `code` looks like an ISO-4217 code.
#[must_use]
pub fn is_valid_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Cut `text` down to at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim_end().to_owned()
}

/// Lower-case ASCII letters and digits of `part`, for use in an email
/// local part.
pub(crate) fn email_local_part(part: &str) -> String {
    part.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    //! Covers limit checks and text clean-up helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a", true)]
    #[case("Eating out", true)]
    #[case("abcdefghijklmnopqrstuvwxy", true)]
    #[case("abcdefghijklmnopqrstuvwxyz", false)]
    #[case("", false)]
    #[case("   ", false)]
    fn name_limits(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_valid_name(name), expected);
    }

    #[rstest]
    #[case(0, true)]
    #[case(NOTE_MAX, true)]
    #[case(NOTE_MAX + 1, false)]
    fn note_limits(#[case] length: usize, #[case] expected: bool) {
        assert_eq!(is_valid_note(&"n".repeat(length)), expected);
    }

    #[rstest]
    #[case("AED", true)]
    #[case("usd", false)]
    #[case("EURO", false)]
    #[case("E1R", false)]
    fn currency_codes(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_valid_currency_code(code), expected);
    }

    #[rstest]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("Café crème", 4), "Café");
        assert_eq!(truncate_chars("ab cd", 3), "ab");
    }

    #[rstest]
    #[case("O'Brien", "obrien")]
    #[case("Marie-Claire", "marieclaire")]
    #[case("Zoë", "zo")]
    fn email_parts_are_plain_ascii(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(email_local_part(raw), expected);
    }
}
