//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{AccountBalance, Error, RequestContext};

/// Lists the calling user's accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Every account of the caller with its current balance.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID` or a system error.
    async fn list_accounts(&self, ctx: RequestContext) -> Result<Vec<AccountBalance>, Error>;
}
