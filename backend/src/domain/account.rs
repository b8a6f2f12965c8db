//! Account aggregate.
//!
//! An account is a named pot of money in a single currency. Names are unique
//! per owning user; that rule lives at the persistence boundary and surfaces
//! as [`ErrorCode::AccountNameDuplicated`](crate::domain::ErrorCode).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::names::checked_name;
use crate::domain::{AccountId, AuditInfo, Currency, Error, ErrorCode, Money, UpdatedBy};

/// Kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    /// Day-to-day spending.
    Current,
    /// Money set aside; transfers into it count as savings.
    Saving,
}

impl AccountType {
    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Saving => "Saving",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "saving" | "savings" => Ok(Self::Saving),
            _ => Err(Error::account_validation(format!("No such account type '{s}'"))
                .with_field("type", "must be Current or Saving")),
        }
    }
}

/// Named account owned by a user.
///
/// # Examples
/// ```
/// use backend::domain::{Account, AccountId, AuditInfo, UpdatedBy};
/// use chrono::Utc;
///
/// let audit = AuditInfo::make_for_creation(UpdatedBy::ZERO, Utc::now());
/// let id = AccountId::new(1).expect("valid id");
/// let account = Account::try_from_strings(id, "Current", "Current", "AED", audit)
///     .expect("valid account");
/// assert_eq!(account.currency().code(), "AED");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    account_type: AccountType,
    currency: Currency,
    audit: AuditInfo,
}

impl Account {
    /// Build an account from validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::account_validation`] when the name is empty or
    /// longer than 25 characters.
    pub fn new(
        id: AccountId,
        name: &str,
        account_type: AccountType,
        currency: Currency,
        audit: AuditInfo,
    ) -> Result<Self, Error> {
        let name = checked_name(name).map_err(|message| {
            Error::account_validation(message.clone()).with_field("name", message)
        })?;
        Ok(Self {
            id,
            name: name.to_owned(),
            account_type,
            currency,
            audit,
        })
    }

    /// Build an account from request strings, reporting every failure as
    /// [`ErrorCode::AccountValidationFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::account_validation`] for an invalid name, type, or
    /// currency code.
    pub fn try_from_strings(
        id: AccountId,
        name: &str,
        account_type: &str,
        currency: &str,
        audit: AuditInfo,
    ) -> Result<Self, Error> {
        let currency =
            Currency::from_code(currency).map_err(|err| err.recode(ErrorCode::AccountValidationFailed))?;
        let account_type = account_type.parse::<AccountType>()?;
        Self::new(id, name, account_type, currency, audit)
    }

    /// A copy renamed by `by` at `now`, with the version bumped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::account_validation`] for an invalid name.
    pub fn renamed(&self, name: &str, by: UpdatedBy, now: DateTime<Utc>) -> Result<Self, Error> {
        let audit = self.audit.touched(by, now)?;
        Self::new(self.id, name, self.account_type, self.currency, audit)
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current or saving.
    #[must_use]
    pub const fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Currency of every record in the account.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Audit metadata.
    #[must_use]
    pub const fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}

/// An account paired with its balance, summed by the store over every
/// record of the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    /// The account.
    pub account: Account,
    /// Sum of all record amounts.
    pub balance: Money,
}
