//! Name rules shared by accounts and categories.

/// Shortest accepted name, in characters.
pub const NAME_MIN: usize = 1;

/// Longest accepted name, in characters.
pub const NAME_MAX: usize = 25;

/// Trim `raw` and check its length, returning the trimmed name or the
/// diagnostic to attach to the `name` field.
pub(crate) fn checked_name(raw: &str) -> Result<&str, String> {
    let name = raw.trim();
    let length = name.chars().count();
    if length < NAME_MIN {
        return Err("name must not be empty".to_owned());
    }
    if length > NAME_MAX {
        return Err(format!("name must be at most {NAME_MAX} characters"));
    }
    Ok(name)
}

/// Title-case a name: first character upper case, the rest lower case.
///
/// # Examples
/// ```
/// use backend::domain::title_case;
///
/// assert_eq!(title_case("HEALTH"), "Health");
/// assert_eq!(title_case("eating Out"), "Eating out");
/// ```
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
