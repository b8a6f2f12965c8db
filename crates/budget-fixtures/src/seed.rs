//! Generated seed types.
//!
//! These types are independent of backend domain types to avoid circular
//! dependencies. Enum values serialise to the strings the backend's HTTP
//! adapter and services accept.

use serde::{Deserialize, Serialize};

/// Kind of a generated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKindSeed {
    /// Day-to-day spending; every record is filed here.
    Current,
    /// Receives the monthly transfer.
    Saving,
}

impl AccountKindSeed {
    /// Name understood by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Saving => "Saving",
        }
    }
}

/// Kind of a generated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKindSeed {
    /// Monthly salary.
    Income,
    /// Everyday spending.
    Expense,
    /// Current to Saving.
    Transfer,
}

impl RecordKindSeed {
    /// Name understood by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

/// A generated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleAccountSeed {
    /// Account name, unique per user.
    pub name: String,
    /// Account kind.
    #[serde(rename = "type")]
    pub kind: AccountKindSeed,
}

/// A generated record, always filed against the user's Current account.
///
/// `value` is a positive number of minor units; the backend applies the sign
/// for the record kind. Transfers go to the user's Saving account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRecordSeed {
    /// Free-text note.
    pub note: String,
    /// Name of one of the user's categories.
    pub category: String,
    /// Positive amount in minor units of the user's currency.
    pub value: i64,
    /// RFC 3339 timestamp in UTC.
    pub date: String,
    /// Record kind.
    #[serde(rename = "type")]
    pub kind: RecordKindSeed,
}

/// A generated user with accounts, categories and activity.
///
/// # Example
///
/// ```
/// use budget_fixtures::{AccountKindSeed, ExampleAccountSeed, ExampleUserSeed};
///
/// let user = ExampleUserSeed {
///     email: "ada.lovelace.0@example.com".to_owned(),
///     currency: "AED".to_owned(),
///     accounts: vec![ExampleAccountSeed {
///         name: "Current".to_owned(),
///         kind: AccountKindSeed::Current,
///     }],
///     categories: vec!["Salary".to_owned()],
///     records: vec![],
/// };
///
/// assert_eq!(user.currency, "AED");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleUserSeed {
    /// Unique email address.
    pub email: String,
    /// Currency shared by every account and record of the user.
    pub currency: String,
    /// Accounts in creation order.
    pub accounts: Vec<ExampleAccountSeed>,
    /// Category names in creation order.
    pub categories: Vec<String>,
    /// Records in date order.
    pub records: Vec<ExampleRecordSeed>,
}

impl ExampleUserSeed {
    /// The account of the given kind.
    #[must_use]
    pub fn account(&self, kind: AccountKindSeed) -> Option<&ExampleAccountSeed> {
        self.accounts.iter().find(|account| account.kind == kind)
    }
}
