//! Driving port for creating budgets.

use async_trait::async_trait;

use crate::domain::ports::AmountInput;
use crate::domain::{AccountId, Budget, CategoryId, Error, RequestContext};

/// Limit for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategoryLimit {
    /// Limited category.
    pub category_id: CategoryId,
    /// Maximum spending per period.
    pub max_limit: AmountInput,
}

/// Request to create a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBudgetRequest {
    /// Accounts whose combined spending is limited.
    pub account_ids: Vec<AccountId>,
    /// `WEEK` or `MONTH`.
    pub period_type: String,
    /// Per-category limits; limits for unknown categories are dropped.
    pub limits: Vec<NewCategoryLimit>,
}

/// Creates budgets for the calling user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BudgetsCommand: Send + Sync {
    /// Create a budget with its category limits and account links.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID`, `ACCOUNT_NOT_FOUND`,
    /// `BUDGET_VALIDATION_FAILED`, `AMOUNT_MISMATCHING_CURRENCIES`, or a
    /// system error.
    async fn create_budget(
        &self,
        ctx: RequestContext,
        request: CreateBudgetRequest,
    ) -> Result<Budget, Error>;
}
