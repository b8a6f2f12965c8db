//! Category aggregate.

use chrono::{DateTime, Utc};

use crate::domain::names::{checked_name, title_case};
use crate::domain::{AuditInfo, CategoryId, Error, UpdatedBy};

/// Spending or income category owned by a user.
///
/// Names are stored title-cased so that `health` and `HEALTH` collide on the
/// per-user unique index.
///
/// # Examples
/// ```
/// use backend::domain::{AuditInfo, Category, CategoryId, UpdatedBy};
/// use chrono::Utc;
///
/// let audit = AuditInfo::make_for_creation(UpdatedBy::ZERO, Utc::now());
/// let id = CategoryId::new(1).expect("valid id");
/// let category = Category::new(id, "HEALTH", audit).expect("valid category");
/// assert_eq!(category.name(), "Health");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
    last_used_at: Option<DateTime<Utc>>,
    audit: AuditInfo,
}

impl Category {
    /// Build a never-used category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::category_validation`] when the name is empty or
    /// longer than 25 characters.
    pub fn new(id: CategoryId, name: &str, audit: AuditInfo) -> Result<Self, Error> {
        let name = checked_name(name).map_err(|message| {
            Error::category_validation(message.clone()).with_field("name", message)
        })?;
        Ok(Self {
            id,
            name: title_case(name),
            last_used_at: None,
            audit,
        })
    }

    /// Set the time of the most recent record referencing the category.
    #[must_use]
    pub fn with_last_used_at(mut self, last_used_at: Option<DateTime<Utc>>) -> Self {
        self.last_used_at = last_used_at;
        self
    }

    /// A copy renamed by `by` at `now`, with the version bumped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::category_validation`] for an invalid name.
    pub fn renamed(&self, name: &str, by: UpdatedBy, now: DateTime<Utc>) -> Result<Self, Error> {
        let audit = self.audit.touched(by, now)?;
        Ok(Self::new(self.id, name, audit)?.with_last_used_at(self.last_used_at))
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.id
    }

    /// Title-cased name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Date of the latest record saved against the category.
    #[must_use]
    pub const fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    /// Audit metadata.
    #[must_use]
    pub const fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}
