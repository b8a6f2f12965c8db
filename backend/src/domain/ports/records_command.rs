//! Driving port for creating records.

use async_trait::async_trait;

use crate::domain::{AccountBalance, AccountId, CategoryId, Error, Money, Record, RequestContext};

/// A `{currency, value}` amount as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountInput {
    /// ISO-4217 code.
    pub currency: String,
    /// Signed minor units.
    pub value: i64,
}

impl AmountInput {
    /// Validate into [`Money`].
    ///
    /// # Errors
    ///
    /// `CURRENCY_INVALID_CODE` for unknown currencies.
    pub fn to_money(&self) -> Result<Money, Error> {
        Money::new(&self.currency, self.value)
    }
}

/// Request to record one movement on the context's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordRequest {
    /// Free text, up to 50 characters.
    pub note: String,
    /// Category owned by the caller.
    pub category_id: CategoryId,
    /// Amount; the sign is canonicalised by type.
    pub amount: AmountInput,
    /// RFC-3339 timestamp.
    pub date: String,
    /// `INCOME`, `EXPENSE` or `TRANSFER`.
    pub record_type: String,
    /// Receiving account, transfers only.
    pub beneficiary_account_id: Option<AccountId>,
}

/// The sender-side record and the owning account's new balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    /// Record saved against the context's account.
    pub record: Record,
    /// Owning account after the write.
    pub account: AccountBalance,
}

/// Records movements, atomically pairing both halves of a transfer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsCommand: Send + Sync {
    /// Create a record, or both records of a transfer.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID`, `SERVICE_REQUIRED_ACCOUNT_ID`,
    /// `ACCOUNT_NOT_FOUND`, `CATEGORIES_NOT_FOUND`,
    /// `RECORD_VALIDATION_FAILED`, `AMOUNT_MISMATCHING_CURRENCIES`, or a
    /// system error. Nothing is written on failure.
    async fn create_record(
        &self,
        ctx: RequestContext,
        request: CreateRecordRequest,
    ) -> Result<CreatedRecord, Error>;
}
