//! Driving port for listing budgets.

use async_trait::async_trait;

use crate::domain::{Budget, Error, RequestContext};

/// Lists budgets with spending for the current period.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BudgetsQuery: Send + Sync {
    /// Every budget of the caller with `amount_spent` filled in.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID` or a system error.
    async fn list_budgets(&self, ctx: RequestContext) -> Result<Vec<Budget>, Error>;
}
