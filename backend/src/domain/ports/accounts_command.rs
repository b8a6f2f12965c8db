//! Driving port for account writes.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Error, RequestContext};

/// One account to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Display name, unique per user.
    pub name: String,
    /// ISO-4217 code.
    pub currency: String,
    /// `Current` or `Saving`.
    pub account_type: String,
}

/// Rename an account under an optimistic version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAccountRequest {
    /// Account to rename.
    pub account_id: AccountId,
    /// New name.
    pub name: String,
    /// Version the caller last read.
    pub expected_version: u32,
}

/// Creates and renames accounts for the calling user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create every account in one transaction. An empty list writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID`, `ACCOUNT_VALIDATION_FAILED`,
    /// `ACCOUNT_NAME_DUPLICATED`, or a system error.
    async fn create_accounts(
        &self,
        ctx: RequestContext,
        accounts: Vec<NewAccount>,
    ) -> Result<Vec<Account>, Error>;

    /// Rename an account, bumping its version.
    ///
    /// # Errors
    ///
    /// `ACCOUNT_NOT_FOUND`, `ACCOUNT_NAME_DUPLICATED`, or `DATABASE_STATE`
    /// when the version is stale.
    async fn update_account(
        &self,
        ctx: RequestContext,
        request: UpdateAccountRequest,
    ) -> Result<Account, Error>;
}
