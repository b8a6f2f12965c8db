//! Tables of the in-memory store and the constraints they enforce.
//!
//! Constraint and column names match the PostgreSQL schema so that duplicate
//! keys look the same whichever store raised them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::ports::{DuplicateKey, StoreError};
use crate::domain::{
    Account, AccountBalance, AccountId, AuditInfo, Budget, BudgetDraft, BudgetId, Category,
    CategoryBudget, CategoryId, Money, PeriodType, Record, RecordFilter, User, UserId,
};

#[derive(Debug, Clone)]
struct BudgetRow {
    owner: UserId,
    period_type: PeriodType,
    audit: AuditInfo,
}

#[derive(Debug, Clone)]
struct RecordRow {
    owner: UserId,
    account_id: AccountId,
    record: Record,
}

/// Every table. Cloned at `begin` and swapped back in on commit.
#[derive(Debug, Clone, Default)]
pub(super) struct MemoryState {
    users: BTreeMap<UserId, User>,
    accounts: BTreeMap<AccountId, (UserId, Account)>,
    categories: BTreeMap<CategoryId, (UserId, Category)>,
    records: Vec<RecordRow>,
    budgets: BTreeMap<BudgetId, BudgetRow>,
    budget_categories: Vec<(BudgetId, CategoryBudget)>,
    budget_accounts: Vec<(BudgetId, AccountId)>,
}

fn pkey(table: &str, id: u64) -> StoreError {
    StoreError::duplicate(
        DuplicateKey::new(format!("{table}_pkey")).with_column("id", id.to_string()),
    )
}

fn owned_name(table: &str, owner: UserId, name: &str) -> StoreError {
    StoreError::duplicate(
        DuplicateKey::new(format!("{table}_user_id_name_key"))
            .with_column("user_id", owner.to_string())
            .with_column("name", name),
    )
}

impl MemoryState {
    pub(super) fn record_count(&self) -> usize {
        self.records.len()
    }

    pub(super) fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        if self.users.contains_key(&user.id()) {
            return Err(pkey("users", user.id().get()));
        }
        if self.users.values().any(|existing| existing.email() == user.email()) {
            return Err(StoreError::duplicate(
                DuplicateKey::new("users_email_key").with_column("email", user.email().as_ref()),
            ));
        }
        self.users.insert(user.id(), user.clone());
        Ok(())
    }

    pub(super) fn find_user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub(super) fn insert_accounts(
        &mut self,
        owner: UserId,
        accounts: &[Account],
    ) -> Result<(), StoreError> {
        for account in accounts {
            if self.accounts.contains_key(&account.id()) {
                return Err(pkey("accounts", account.id().get()));
            }
            if self.account_named(owner, account.name(), None) {
                return Err(owned_name("accounts", owner, account.name()));
            }
            self.accounts.insert(account.id(), (owner, account.clone()));
        }
        Ok(())
    }

    fn account_named(&self, owner: UserId, name: &str, except: Option<AccountId>) -> bool {
        self.accounts.values().any(|(user, account)| {
            *user == owner && account.name() == name && Some(account.id()) != except
        })
    }

    pub(super) fn find_account(&self, owner: UserId, id: AccountId) -> Option<Account> {
        self.accounts
            .get(&id)
            .filter(|(user, _)| *user == owner)
            .map(|(_, account)| account.clone())
    }

    pub(super) fn balance(
        &self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<AccountBalance>, StoreError> {
        let Some(account) = self.find_account(owner, id) else {
            return Ok(None);
        };
        let balance = self
            .records
            .iter()
            .filter(|row| row.owner == owner && row.account_id == id)
            .try_fold(Money::zero(account.currency()), |sum, row| {
                sum.try_add(&row.record.amount())
            })
            .map_err(|err| StoreError::query(err.to_string()))?;
        Ok(Some(AccountBalance { account, balance }))
    }

    pub(super) fn account_ids(&self, owner: UserId) -> Vec<AccountId> {
        self.accounts
            .iter()
            .filter(|(_, (user, _))| *user == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    pub(super) fn update_account(
        &mut self,
        owner: UserId,
        account: &Account,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let stale = || StoreError::conflict("account", account.id().get(), expected_version);
        let current = self.find_account(owner, account.id()).ok_or_else(stale)?;
        if current.audit().version() != expected_version {
            return Err(stale());
        }
        if self.account_named(owner, account.name(), Some(account.id())) {
            return Err(owned_name("accounts", owner, account.name()));
        }
        self.accounts.insert(account.id(), (owner, account.clone()));
        Ok(())
    }

    pub(super) fn insert_categories(
        &mut self,
        owner: UserId,
        categories: &[Category],
    ) -> Result<(), StoreError> {
        for category in categories {
            if self.categories.contains_key(&category.id()) {
                return Err(pkey("categories", category.id().get()));
            }
            if self.category_named(owner, category.name(), None) {
                return Err(owned_name("categories", owner, category.name()));
            }
            self.categories
                .insert(category.id(), (owner, category.clone()));
        }
        Ok(())
    }

    fn category_named(&self, owner: UserId, name: &str, except: Option<CategoryId>) -> bool {
        self.categories.values().any(|(user, category)| {
            *user == owner && category.name() == name && Some(category.id()) != except
        })
    }

    pub(super) fn find_category(&self, owner: UserId, id: CategoryId) -> Option<Category> {
        self.categories
            .get(&id)
            .filter(|(user, _)| *user == owner)
            .map(|(_, category)| category.clone())
    }

    pub(super) fn list_categories(&self, owner: UserId) -> Vec<Category> {
        self.categories
            .values()
            .filter(|(user, _)| *user == owner)
            .map(|(_, category)| category.clone())
            .collect()
    }

    pub(super) fn update_category(
        &mut self,
        owner: UserId,
        category: &Category,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let stale = || StoreError::conflict("category", category.id().get(), expected_version);
        let current = self.find_category(owner, category.id()).ok_or_else(stale)?;
        if current.audit().version() != expected_version {
            return Err(stale());
        }
        if self.category_named(owner, category.name(), Some(category.id())) {
            return Err(owned_name("categories", owner, category.name()));
        }
        self.categories
            .insert(category.id(), (owner, category.clone()));
        Ok(())
    }

    pub(super) fn touch_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
        used_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let Some((_, category)) = self.categories.get_mut(&id).filter(|(user, _)| *user == owner)
        else {
            return Err(StoreError::query(format!("category {id} does not exist")));
        };
        let last_used_at = category.last_used_at().map_or(used_at, |at| at.max(used_at));
        *category = category.clone().with_last_used_at(Some(last_used_at));
        Ok(())
    }

    pub(super) fn insert_record(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        record: &Record,
    ) -> Result<(), StoreError> {
        if self.find_account(owner, account_id).is_none() {
            return Err(StoreError::query(format!("account {account_id} does not exist")));
        }
        if self.records.iter().any(|row| row.record.id() == record.id()) {
            return Err(pkey("records", record.id().get()));
        }
        self.records.push(RecordRow {
            owner,
            account_id,
            record: record.clone(),
        });
        Ok(())
    }

    fn account_records(
        &self,
        owner: UserId,
        account_id: AccountId,
    ) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |row| row.owner == owner && row.account_id == account_id)
            .map(|row| &row.record)
    }

    pub(super) fn latest_record_date(
        &self,
        owner: UserId,
        account_id: AccountId,
    ) -> Option<DateTime<Utc>> {
        self.account_records(owner, account_id).map(Record::date).max()
    }

    pub(super) fn list_records(
        &self,
        owner: UserId,
        account_id: AccountId,
        filter: &RecordFilter,
    ) -> Vec<Record> {
        self.account_records(owner, account_id)
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    pub(super) fn insert_budget(
        &mut self,
        owner: UserId,
        budget: &Budget,
    ) -> Result<(), StoreError> {
        if self.budgets.contains_key(&budget.id()) {
            return Err(pkey("budgets", budget.id().get()));
        }
        self.budgets.insert(
            budget.id(),
            BudgetRow {
                owner,
                period_type: budget.period_type(),
                audit: *budget.audit(),
            },
        );
        Ok(())
    }

    pub(super) fn insert_budget_categories(
        &mut self,
        budget_id: BudgetId,
        limits: &[CategoryBudget],
    ) -> Result<(), StoreError> {
        let row = self
            .budgets
            .get(&budget_id)
            .ok_or_else(|| StoreError::query(format!("budget {budget_id} does not exist")))?;
        let owner = row.owner;
        for limit in limits {
            if self.find_category(owner, limit.category_id()).is_none() {
                return Err(StoreError::query(format!(
                    "category {} does not exist",
                    limit.category_id()
                )));
            }
            self.budget_categories.push((budget_id, *limit));
        }
        Ok(())
    }

    pub(super) fn insert_budget_accounts(
        &mut self,
        budget_id: BudgetId,
        account_ids: &[AccountId],
    ) -> Result<(), StoreError> {
        let row = self
            .budgets
            .get(&budget_id)
            .ok_or_else(|| StoreError::query(format!("budget {budget_id} does not exist")))?;
        let owner = row.owner;
        for account_id in account_ids {
            if self.find_account(owner, *account_id).is_none() {
                return Err(StoreError::query(format!("account {account_id} does not exist")));
            }
            self.budget_accounts.push((budget_id, *account_id));
        }
        Ok(())
    }

    pub(super) fn list_budgets(&self, owner: UserId) -> Result<Vec<Budget>, StoreError> {
        self.budgets
            .iter()
            .filter(|(_, row)| row.owner == owner)
            .map(|(id, row)| {
                let draft = BudgetDraft {
                    id: *id,
                    account_ids: self
                        .budget_accounts
                        .iter()
                        .filter(|(budget, _)| budget == id)
                        .map(|(_, account)| *account)
                        .collect(),
                    period_type: row.period_type,
                    limits: self
                        .budget_categories
                        .iter()
                        .filter(|(budget, _)| budget == id)
                        .map(|(_, limit)| (limit.category_id(), limit.max_limit()))
                        .collect(),
                    audit: row.audit,
                };
                Budget::try_from(draft).map_err(|err| StoreError::query(err.to_string()))
            })
            .collect()
    }
}
