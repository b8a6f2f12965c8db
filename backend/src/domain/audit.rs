//! Audit metadata attached to every aggregate.
//!
//! Audit values record who created and last modified an aggregate, when,
//! and the optimistic-concurrency `version`. A never-modified aggregate has
//! no modification principal and no modification time; this is kept distinct
//! from an aggregate modified at the Unix epoch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Error, UserId};

const USER_PREFIX: &str = "user:";

/// Principal attached to audit fields.
///
/// The textual form is `user:<id>`; the empty string is the zero principal.
///
/// # Examples
/// ```
/// use backend::domain::{UpdatedBy, UserId};
///
/// let by: UpdatedBy = "user:42".parse().expect("well formed");
/// assert_eq!(by.user_id(), UserId::new(42).ok());
/// assert!("".parse::<UpdatedBy>().expect("zero principal").is_zero());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UpdatedBy(Option<UserId>);

impl UpdatedBy {
    /// The "nobody" principal.
    pub const ZERO: Self = Self(None);

    /// Principal for a user.
    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self(Some(id))
    }

    /// Whether this is the zero principal.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// The user behind the principal, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.0
    }
}

impl fmt::Display for UpdatedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{USER_PREFIX}{id}"),
            None => Ok(()),
        }
    }
}

impl FromStr for UpdatedBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::ZERO);
        }
        s.strip_prefix(USER_PREFIX)
            .and_then(|raw| raw.parse::<UserId>().ok())
            .map(Self::user)
            .ok_or_else(|| {
                Error::audit_updated_by_bad_format(format!(
                    "expected '{USER_PREFIX}<id>', got '{s}'"
                ))
            })
    }
}

/// Creation and modification metadata plus the optimistic version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditInfo {
    created_by: UpdatedBy,
    created_at: DateTime<Utc>,
    modified_by: UpdatedBy,
    modified_at: Option<DateTime<Utc>>,
    version: u32,
}

impl AuditInfo {
    /// Audit values for a freshly created aggregate: version 1, never
    /// modified.
    #[must_use]
    pub const fn make_for_creation(created_by: UpdatedBy, now: DateTime<Utc>) -> Self {
        Self {
            created_by,
            created_at: now,
            modified_by: UpdatedBy::ZERO,
            modified_at: None,
            version: 1,
        }
    }

    /// Rebuild audit values loaded from storage or supplied by a caller.
    ///
    /// Timestamps in any zone are coerced to UTC. `modified_at = None`
    /// stays "never modified".
    ///
    /// # Errors
    ///
    /// Returns [`Error::audit_validation`] when the creator is the zero
    /// principal, the creation time is missing, or the version is zero.
    pub fn make_for_modification<Tz: TimeZone>(
        created_by: UpdatedBy,
        created_at: Option<DateTime<Tz>>,
        modified_by: UpdatedBy,
        modified_at: Option<DateTime<Tz>>,
        version: u32,
    ) -> Result<Self, Error> {
        if created_by.is_zero() {
            return Err(Error::audit_validation("created by must not be zero")
                .with_field("createdBy", "must not be zero"));
        }
        let Some(created_at) = created_at else {
            return Err(Error::audit_validation("created at must be present")
                .with_field("createdAt", "must be present"));
        };
        if version == 0 {
            return Err(Error::audit_validation("version must be positive")
                .with_field("version", "must be positive"));
        }
        Ok(Self {
            created_by,
            created_at: created_at.with_timezone(&Utc),
            modified_by,
            modified_at: modified_at.map(|at| at.with_timezone(&Utc)),
            version,
        })
    }

    /// Audit values after a successful update by `by` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::audit_validation`] if the version cannot be
    /// incremented.
    pub fn touched(&self, by: UpdatedBy, now: DateTime<Utc>) -> Result<Self, Error> {
        let version = self
            .version
            .checked_add(1)
            .ok_or_else(|| Error::audit_validation("version exhausted"))?;
        Ok(Self {
            modified_by: by,
            modified_at: Some(now),
            version,
            ..*self
        })
    }

    /// Principal that created the aggregate.
    #[must_use]
    pub const fn created_by(&self) -> UpdatedBy {
        self.created_by
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Principal of the last modification; zero if never modified.
    #[must_use]
    pub const fn modified_by(&self) -> UpdatedBy {
        self.modified_by
    }

    /// Time of the last modification; `None` if never modified.
    #[must_use]
    pub const fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Optimistic-concurrency version, starting at 1.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }
}
