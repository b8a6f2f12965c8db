//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{AuditInfo, Error, UserId};

/// Longest address accepted (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        // addr-spec with a dot-atom local part and a dotted domain.
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A parsed email address.
///
/// A bare `addr-spec` is accepted, as is a `Display Name <addr-spec>` form;
/// the display name is discarded.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::parse("Jack <jack@x.com>").expect("valid");
/// assert_eq!(email.as_ref(), "jack@x.com");
/// assert!(EmailAddress::parse("jack.x.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::user_email_invalid`] when the input is not an
    /// address.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        let address = match (trimmed.rfind('<'), trimmed.strip_suffix('>')) {
            (Some(open), Some(inner)) => inner.get(open + 1..).unwrap_or_default(),
            _ => trimmed,
        };
        if address.len() > EMAIL_MAX || !email_regex().is_match(address) {
            return Err(Error::user_email_invalid(format!(
                "'{raw}' is not a valid email address"
            ))
            .with_field("email", "must be a valid email address"));
        }
        Ok(Self(address.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application user.
///
/// Users are created once and never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    audit: AuditInfo,
}

impl User {
    /// Build a user, parsing the email address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::user_email_invalid`] for malformed addresses.
    pub fn new(id: UserId, email: &str, audit: AuditInfo) -> Result<Self, Error> {
        Ok(Self {
            id,
            email: EmailAddress::parse(email)?,
            audit,
        })
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Audit metadata.
    #[must_use]
    pub const fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, UpdatedBy};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn audit() -> AuditInfo {
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).single().expect("valid");
        AuditInfo::make_for_creation(UpdatedBy::ZERO, now)
    }

    #[rstest]
    #[case("jack@x.com", "jack@x.com")]
    #[case("  jack@x.com ", "jack@x.com")]
    #[case("Jack Sparrow <jack@x.com>", "jack@x.com")]
    #[case("first.last+tag@sub.example.org", "first.last+tag@sub.example.org")]
    fn parses_addresses(#[case] raw: &str, #[case] expected: &str) {
        let id = UserId::new(1).expect("valid id");
        let user = User::new(id, raw, audit()).expect("valid email");
        assert_eq!(user.email().as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("jack")]
    #[case("jack@")]
    #[case("@x.com")]
    #[case("jack@@x.com")]
    #[case("ja ck@x.com")]
    #[case(".jack@x.com")]
    #[case("Jack <jack@>")]
    fn rejects_malformed_addresses(#[case] raw: &str) {
        let id = UserId::new(1).expect("valid id");
        let err = User::new(id, raw, audit()).expect_err("invalid email");
        assert_eq!(err.code(), ErrorCode::UserEmailInvalid);
        assert!(err.fields().contains_key("email"));
    }
}
