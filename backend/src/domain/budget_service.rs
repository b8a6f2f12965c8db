//! Budget creation and listing with derived spending.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    BudgetsCommand, BudgetsQuery, CreateBudgetRequest, Sequence, Store, StoreTransaction,
};
use crate::domain::transaction::{begin, finish, mint, store_error};
use crate::domain::{
    AuditInfo, Budget, BudgetDraft, BudgetId, Category, CategoryId, Error, ErrorCode, PeriodType,
    RecordFilter, RecordType, RequestContext, UpdatedBy, UserId, account_service,
};

/// Manages the caller's budgets through a [`Store`].
#[derive(Clone)]
pub struct BudgetService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> BudgetService<S> {
    /// Create a service over `store`, reading the current period from
    /// `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: Store> BudgetService<S> {
    async fn create(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
        request: &CreateBudgetRequest,
    ) -> Result<Budget, Error> {
        let period_type: PeriodType = request.period_type.parse()?;
        let known: BTreeSet<CategoryId> = tx
            .list_categories(owner)
            .await
            .map_err(store_error)?
            .iter()
            .map(Category::id)
            .collect();
        let mut limits = Vec::with_capacity(request.limits.len());
        for limit in &request.limits {
            if !known.contains(&limit.category_id) {
                debug!(category_id = %limit.category_id, "dropping limit for unknown category");
                continue;
            }
            let max_limit = limit
                .max_limit
                .to_money()
                .map_err(|err| err.recode(ErrorCode::BudgetValidationFailed))?;
            limits.push((limit.category_id, max_limit));
        }

        let mut accounts = Vec::with_capacity(request.account_ids.len());
        for id in &request.account_ids {
            let account = tx
                .find_account(owner, *id)
                .await
                .map_err(store_error)?
                .ok_or_else(|| account_service::not_found(*id))?;
            accounts.push(account);
        }

        let id: BudgetId = mint(tx, Sequence::Budget).await?;
        let budget = Budget::try_from(BudgetDraft {
            id,
            account_ids: request.account_ids.clone(),
            period_type,
            limits,
            audit: AuditInfo::make_for_creation(UpdatedBy::user(owner), self.clock.utc()),
        })?;
        let currency = budget
            .category_budgets()
            .first()
            .map(|limit| limit.max_limit().currency());
        if let Some(account) = accounts
            .iter()
            .find(|account| Some(account.currency()) != currency)
        {
            return Err(Error::budget_validation(format!(
                "account {} holds {}, unlike the budget limits",
                account.id(),
                account.currency()
            ))
            .with_field("accounts", "must share the limits' currency"));
        }

        tx.insert_budget(owner, &budget).await.map_err(store_error)?;
        tx.insert_budget_categories(budget.id(), budget.category_budgets())
            .await
            .map_err(store_error)?;
        tx.insert_budget_accounts(budget.id(), budget.account_ids())
            .await
            .map_err(store_error)?;
        info!(
            user_id = %owner,
            budget_id = %budget.id(),
            period_type = %budget.period_type(),
            categories = budget.category_budgets().len(),
            "budget created"
        );
        Ok(budget)
    }

    async fn list(
        &self,
        tx: &mut dyn StoreTransaction,
        owner: UserId,
    ) -> Result<Vec<Budget>, Error> {
        let now = self.clock.utc();
        let budgets = tx.list_budgets(owner).await.map_err(store_error)?;
        let mut listed = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let (from, to) = budget.period_type().bounds(now);
            let mut filter = RecordFilter::between(from, to);
            filter.types.insert(RecordType::Expense);
            let mut records = Vec::new();
            for account_id in budget.account_ids() {
                records.extend(
                    tx.list_records(owner, *account_id, &filter)
                        .await
                        .map_err(store_error)?,
                );
            }
            listed.push(budget.with_spending(&records)?);
        }
        Ok(listed)
    }
}

#[async_trait]
impl<S: Store> BudgetsCommand for BudgetService<S> {
    async fn create_budget(
        &self,
        ctx: RequestContext,
        request: CreateBudgetRequest,
    ) -> Result<Budget, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.create(tx.as_mut(), owner, &request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl<S: Store> BudgetsQuery for BudgetService<S> {
    async fn list_budgets(&self, ctx: RequestContext) -> Result<Vec<Budget>, Error> {
        let owner = ctx.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.list(tx.as_mut(), owner).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "budget_service_tests.rs"]
mod tests;
