//! Record aggregate: one monetary movement on an account.
//!
//! Records are append-only. A transfer is two records, one per account,
//! sharing a [`TransferLink::reference`]; neither side points at the other
//! directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AccountId, AccountType, AuditInfo, CategoryId, Error, Money, RecordId};

/// Longest accepted note, in characters.
pub const NOTE_MAX: usize = 50;

/// Direction of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    /// Money coming in; stored positive.
    Income,
    /// Money going out; stored negative.
    Expense,
    /// Half of a movement between two of the user's accounts.
    Transfer,
}

impl RecordType {
    /// Every type, in wire order.
    pub const ALL: [Self; 3] = [Self::Income, Self::Expense, Self::Transfer];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::record_validation(format!("No such record type '{s}'"))
                    .with_field("type", "must be INCOME, EXPENSE or TRANSFER")
            })
    }
}

/// The category a record was filed under, denormalised for projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCategory {
    /// Category id.
    pub id: CategoryId,
    /// Category name at the time of reading.
    pub name: String,
}

/// The receiving account of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beneficiary {
    /// Receiving account.
    pub id: AccountId,
    /// Its name.
    pub name: String,
    /// Its type; transfers into a saving account count as savings.
    pub account_type: AccountType,
}

/// Link shared by both halves of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLink {
    /// Sending account.
    pub source_account_id: AccountId,
    /// Receiving account.
    pub beneficiary: Beneficiary,
    /// Opaque reference shared by the sender and receiver records.
    pub reference: Uuid,
}

/// Unvalidated record fields.
///
/// Transfer fields are optional here so that an income or expense carrying
/// stray transfer data, or a transfer missing some, is reported as a
/// validation failure instead of being unrepresentable.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    /// Issued record id.
    pub id: RecordId,
    /// Free text, up to [`NOTE_MAX`] characters.
    pub note: String,
    /// Category the record is filed under.
    pub category: RecordCategory,
    /// Signed amount; the sign is canonicalised on validation.
    pub amount: Money,
    /// When the movement happened.
    pub date: Option<DateTime<Utc>>,
    /// Direction.
    pub record_type: RecordType,
    /// Sending account, transfers only.
    pub source_account_id: Option<AccountId>,
    /// Receiving account, transfers only.
    pub beneficiary: Option<Beneficiary>,
    /// Shared transfer reference, transfers only.
    pub transfer_reference: Option<Uuid>,
    /// Audit metadata.
    pub audit: AuditInfo,
}

/// A validated record.
///
/// # Examples
/// ```
/// use backend::domain::{
///     AuditInfo, CategoryId, Money, Record, RecordCategory, RecordDraft, RecordId, RecordType,
///     UpdatedBy,
/// };
/// use chrono::Utc;
///
/// let draft = RecordDraft {
///     id: RecordId::new(1).expect("valid id"),
///     note: "Groceries".into(),
///     category: RecordCategory { id: CategoryId::new(1).expect("valid id"), name: "Food".into() },
///     amount: Money::new("AED", 4_550).expect("valid currency"),
///     date: Some(Utc::now()),
///     record_type: RecordType::Expense,
///     source_account_id: None,
///     beneficiary: None,
///     transfer_reference: None,
///     audit: AuditInfo::make_for_creation(UpdatedBy::ZERO, Utc::now()),
/// };
/// let record = Record::try_from(draft).expect("valid record");
/// assert!(record.amount().is_negative());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    note: String,
    category: RecordCategory,
    amount: Money,
    date: DateTime<Utc>,
    record_type: RecordType,
    transfer: Option<TransferLink>,
    audit: AuditInfo,
}

impl TryFrom<RecordDraft> for Record {
    type Error = Error;

    fn try_from(draft: RecordDraft) -> Result<Self, Self::Error> {
        let RecordDraft {
            id,
            note,
            category,
            amount,
            date,
            record_type,
            source_account_id,
            beneficiary,
            transfer_reference,
            audit,
        } = draft;

        if note.chars().count() > NOTE_MAX {
            return Err(invalid("note", format!("note must be at most {NOTE_MAX} characters")));
        }
        if amount.minor_units()? == 0 {
            return Err(invalid("amount", "amount must not be zero"));
        }
        let Some(date) = date else {
            return Err(invalid("date", "date must be present"));
        };

        let transfer = match (record_type, source_account_id, beneficiary, transfer_reference) {
            (RecordType::Transfer, Some(source_account_id), Some(beneficiary), Some(reference)) => {
                if reference.is_nil() {
                    return Err(invalid("transferReference", "transfer reference must not be empty"));
                }
                if beneficiary.id == source_account_id {
                    return Err(invalid(
                        "beneficiary",
                        "cannot transfer to the sending account",
                    ));
                }
                Some(TransferLink {
                    source_account_id,
                    beneficiary,
                    reference,
                })
            }
            (RecordType::Transfer, _, _, _) => {
                return Err(invalid(
                    "beneficiary",
                    "transfers need a source account, a beneficiary and a reference",
                ));
            }
            (_, None, None, None) => None,
            (kind, _, _, _) => {
                return Err(invalid(
                    "type",
                    format!("{kind} records must not carry transfer details"),
                ));
            }
        };

        let amount = match record_type {
            RecordType::Expense if amount.is_positive() => amount.negate(),
            RecordType::Income => amount.abs(),
            RecordType::Expense | RecordType::Transfer => amount,
        };

        Ok(Self {
            id,
            note,
            category,
            amount,
            date,
            record_type,
            transfer,
            audit,
        })
    }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
    let message = message.into();
    Error::record_validation(message.clone()).with_field(field, message)
}

impl Record {
    /// The receiving half of this transfer: the same link and category,
    /// the opposite amount, a new id and its own audit values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::record_validation`] when `self` is not a transfer,
    /// or [`Error::amount_overflow`] when the amount cannot be negated.
    pub fn counterpart(&self, id: RecordId, audit: AuditInfo) -> Result<Self, Error> {
        let Some(transfer) = self.transfer.clone() else {
            return Err(invalid("type", "only transfers have a counterpart"));
        };
        Self::try_from(RecordDraft {
            id,
            note: self.note.clone(),
            category: self.category.clone(),
            amount: self.amount.negate(),
            date: Some(self.date),
            record_type: RecordType::Transfer,
            source_account_id: Some(transfer.source_account_id),
            beneficiary: Some(transfer.beneficiary),
            transfer_reference: Some(transfer.reference),
            audit,
        })
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Free-text note.
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Category reference.
    #[must_use]
    pub const fn category(&self) -> &RecordCategory {
        &self.category
    }

    /// Signed amount in canonical form.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// When the movement happened.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Direction.
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Transfer link, present exactly for transfers.
    #[must_use]
    pub const fn transfer(&self) -> Option<&TransferLink> {
        self.transfer.as_ref()
    }

    /// Whether this is a transfer into a saving account.
    #[must_use]
    pub fn is_saving_transfer(&self) -> bool {
        self.transfer
            .as_ref()
            .is_some_and(|link| link.beneficiary.account_type == AccountType::Saving)
    }

    /// Audit metadata.
    #[must_use]
    pub const fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
