//! PostgreSQL-backed [`Store`].
//!
//! Each [`StoreTransaction`] owns one pooled connection with an open
//! database transaction, started and ended through `diesel-async`'s
//! `AnsiTransactionManager`. Every read and update is scoped by `user_id`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text, Timestamptz};
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{Sequence, Store, StoreError, StoreTransaction};
use crate::domain::{
    Account, AccountBalance, AccountId, Beneficiary, Budget, BudgetDraft, BudgetId, Category,
    CategoryBudget, CategoryId, Money, Record, RecordCategory, RecordDraft, RecordFilter, User,
    UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    AccountRow, AccountUpdate, BudgetAccountRow, BudgetCategoryRow, BudgetRow, CategoryRow,
    CategoryUpdate, NewAccountRow, NewBudgetRow, NewCategoryRow, NewRecordRow, NewUserRow,
    RecordRow, UserRow, corrupt, db_id, db_version, domain_id,
};
use super::pool::{DbPool, OwnedConnection};
use super::schema::{
    accounts, budget_accounts, budget_categories, budgets, categories, records, users,
};

diesel::define_sql_function! {
    /// PostgreSQL `nextval(regclass)`.
    fn nextval(sequence: Text) -> BigInt;
}

/// [`Store`] over a [`DbPool`].
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    /// Create a store drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for DieselStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselTransaction { conn: Some(conn) }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }
}

/// Open transaction on an owned connection. `None` once finished.
struct DieselTransaction {
    conn: Option<OwnedConnection>,
}

fn finished() -> StoreError {
    StoreError::query("transaction already finished")
}

impl DieselTransaction {
    fn conn(&mut self) -> Result<&mut AsyncPgConnection, StoreError> {
        self.conn.as_deref_mut().ok_or_else(finished)
    }
}

async fn load_account(
    conn: &mut AsyncPgConnection,
    owner: i64,
    id: i64,
) -> Result<Option<Account>, StoreError> {
    accounts::table
        .filter(accounts::id.eq(id))
        .filter(accounts::user_id.eq(owner))
        .select(AccountRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(AccountRow::into_domain)
        .transpose()
}

async fn load_accounts(
    conn: &mut AsyncPgConnection,
    owner: i64,
) -> Result<Vec<(i64, Account)>, StoreError> {
    let rows: Vec<AccountRow> = accounts::table
        .filter(accounts::user_id.eq(owner))
        .order(accounts::id.asc())
        .select(AccountRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    rows.into_iter()
        .map(|row| Ok((row.id, row.into_domain()?)))
        .collect()
}

// SUM over BIGINT yields NUMERIC, so the total is range-checked before the cast.
const CLAMPED_BALANCE: &str = "GREATEST(LEAST(COALESCE(SUM(amount), 0), \
     9223372036854775807), -9223372036854775808)::BIGINT";
const BALANCE_OUT_OF_RANGE: &str = "COALESCE(SUM(amount), 0) \
     NOT BETWEEN -9223372036854775808 AND 9223372036854775807";

async fn balance_of(
    conn: &mut AsyncPgConnection,
    owner: i64,
    account: Account,
) -> Result<AccountBalance, StoreError> {
    let (total, overflowed): (i64, bool) = records::table
        .filter(records::user_id.eq(owner))
        .filter(records::account_id.eq(db_id(account.id())?))
        .select((sql::<BigInt>(CLAMPED_BALANCE), sql::<Bool>(BALANCE_OUT_OF_RANGE)))
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;
    let balance = if overflowed {
        Money::saturated(account.currency(), total)
    } else {
        Money::of(account.currency(), total)
    };
    Ok(AccountBalance { balance, account })
}

/// Escape LIKE wildcards so keywords match literally.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn record_from_row(
    row: RecordRow,
    categories: &BTreeMap<i64, String>,
    accounts: &BTreeMap<i64, Account>,
) -> Result<Record, StoreError> {
    let name = categories
        .get(&row.category_id)
        .cloned()
        .ok_or_else(|| corrupt(format!("record {} has no category", row.id)))?;
    let beneficiary = row
        .beneficiary_account_id
        .map(|id| {
            accounts
                .get(&id)
                .map(|account| Beneficiary {
                    id: account.id(),
                    name: account.name().to_owned(),
                    account_type: account.account_type(),
                })
                .ok_or_else(|| corrupt(format!("record {} has no beneficiary", row.id)))
        })
        .transpose()?;
    Record::try_from(RecordDraft {
        id: domain_id(row.id)?,
        note: row.note.clone(),
        category: RecordCategory {
            id: domain_id(row.category_id)?,
            name,
        },
        amount: row.amount()?,
        date: Some(row.date),
        record_type: row.record_type.parse().map_err(corrupt)?,
        source_account_id: row.source_account_id.map(domain_id).transpose()?,
        beneficiary,
        transfer_reference: row.transfer_reference,
        audit: row.audit()?,
    })
    .map_err(corrupt)
}

#[async_trait]
impl StoreTransaction for DieselTransaction {
    async fn commit(&mut self) -> Result<(), StoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Err(finished());
        };
        AnsiTransactionManager::commit_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        debug!("transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };
        AnsiTransactionManager::rollback_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        debug!("transaction rolled back");
        Ok(())
    }

    async fn next_id(&mut self, sequence: Sequence) -> Result<u64, StoreError> {
        let raw: i64 = diesel::select(nextval(sequence.name()))
            .get_result(self.conn()?)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(raw).map_err(|_| corrupt(format!("{} issued {raw}", sequence.name())))
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        let row = NewUserRow::from_domain(user)?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        users::table
            .find(db_id(id)?)
            .select(UserRow::as_select())
            .first(self.conn()?)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(UserRow::into_domain)
            .transpose()
    }

    async fn insert_accounts(
        &mut self,
        owner: UserId,
        accounts: &[Account],
    ) -> Result<(), StoreError> {
        if accounts.is_empty() {
            return Ok(());
        }
        let rows = accounts
            .iter()
            .map(|account| NewAccountRow::from_domain(owner, account))
            .collect::<Result<Vec<_>, _>>()?;
        diesel::insert_into(accounts::table)
            .values(&rows)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn find_account(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        load_account(self.conn()?, db_id(owner)?, db_id(id)?).await
    }

    async fn find_account_balance(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<AccountBalance>, StoreError> {
        let owner = db_id(owner)?;
        let conn = self.conn()?;
        match load_account(conn, owner, db_id(id)?).await? {
            Some(account) => balance_of(conn, owner, account).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_account_balances(
        &mut self,
        owner: UserId,
    ) -> Result<Vec<AccountBalance>, StoreError> {
        let owner = db_id(owner)?;
        let conn = self.conn()?;
        let mut balances = Vec::new();
        for (_, account) in load_accounts(conn, owner).await? {
            balances.push(balance_of(conn, owner, account).await?);
        }
        Ok(balances)
    }

    async fn update_account(
        &mut self,
        owner: UserId,
        account: &Account,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let changes = AccountUpdate::from_domain(account)?;
        let updated = diesel::update(
            accounts::table
                .filter(accounts::id.eq(db_id(account.id())?))
                .filter(accounts::user_id.eq(db_id(owner)?))
                .filter(accounts::version.eq(db_version(expected_version)?)),
        )
        .set(&changes)
        .execute(self.conn()?)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(StoreError::conflict("account", account.id().get(), expected_version));
        }
        Ok(())
    }

    async fn insert_categories(
        &mut self,
        owner: UserId,
        categories: &[Category],
    ) -> Result<(), StoreError> {
        if categories.is_empty() {
            return Ok(());
        }
        let rows = categories
            .iter()
            .map(|category| NewCategoryRow::from_domain(owner, category))
            .collect::<Result<Vec<_>, _>>()?;
        diesel::insert_into(categories::table)
            .values(&rows)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn find_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
    ) -> Result<Option<Category>, StoreError> {
        categories::table
            .filter(categories::id.eq(db_id(id)?))
            .filter(categories::user_id.eq(db_id(owner)?))
            .select(CategoryRow::as_select())
            .first(self.conn()?)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(CategoryRow::into_domain)
            .transpose()
    }

    async fn list_categories(&mut self, owner: UserId) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::user_id.eq(db_id(owner)?))
            .order(categories::id.asc())
            .select(CategoryRow::as_select())
            .load(self.conn()?)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(CategoryRow::into_domain).collect()
    }

    async fn update_category(
        &mut self,
        owner: UserId,
        category: &Category,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        let changes = CategoryUpdate::from_domain(category)?;
        let updated = diesel::update(
            categories::table
                .filter(categories::id.eq(db_id(category.id())?))
                .filter(categories::user_id.eq(db_id(owner)?))
                .filter(categories::version.eq(db_version(expected_version)?)),
        )
        .set(&changes)
        .execute(self.conn()?)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(StoreError::conflict(
                "category",
                category.id().get(),
                expected_version,
            ));
        }
        Ok(())
    }

    async fn touch_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
        used_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let updated = diesel::sql_query(
            "UPDATE categories SET last_used_at = GREATEST(last_used_at, $1) \
             WHERE id = $2 AND user_id = $3",
        )
        .bind::<Timestamptz, _>(used_at)
        .bind::<BigInt, _>(db_id(id)?)
        .bind::<BigInt, _>(db_id(owner)?)
        .execute(self.conn()?)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(StoreError::query(format!("category {id} does not exist")));
        }
        Ok(())
    }

    async fn insert_record(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        record: &Record,
    ) -> Result<(), StoreError> {
        let row = NewRecordRow::from_domain(owner, account_id, record)?;
        diesel::insert_into(records::table)
            .values(&row)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn latest_record_date(
        &mut self,
        owner: UserId,
        account_id: AccountId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        records::table
            .filter(records::user_id.eq(db_id(owner)?))
            .filter(records::account_id.eq(db_id(account_id)?))
            .select(diesel::dsl::max(records::date))
            .get_result(self.conn()?)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_records(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, StoreError> {
        let owner = db_id(owner)?;
        let conn = self.conn()?;
        let category_rows: Vec<CategoryRow> = categories::table
            .filter(categories::user_id.eq(owner))
            .select(CategoryRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let category_names: BTreeMap<i64, String> = category_rows
            .into_iter()
            .map(|row| (row.id, row.name))
            .collect();

        let mut query = records::table
            .filter(records::user_id.eq(owner))
            .filter(records::account_id.eq(db_id(account_id)?))
            .filter(records::date.ge(filter.from))
            .filter(records::date.lt(filter.to))
            .order((records::date.desc(), records::id.desc()))
            .select(RecordRow::as_select())
            .into_boxed();
        if !filter.categories.is_empty() {
            let wanted: Vec<i64> = category_names
                .iter()
                .filter(|(_, name)| filter.categories.contains(*name))
                .map(|(id, _)| *id)
                .collect();
            if wanted.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(records::category_id.eq_any(wanted));
        }
        if !filter.types.is_empty() {
            let types: Vec<&'static str> = filter.types.iter().map(|kind| kind.as_str()).collect();
            query = query.filter(records::record_type.eq_any(types));
        }
        for keyword in filter.term.keywords() {
            query = query.filter(records::note.ilike(like_pattern(keyword)));
        }
        let rows: Vec<RecordRow> = query.load(&mut *conn).await.map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let accounts: BTreeMap<i64, Account> =
            load_accounts(conn, owner).await?.into_iter().collect();
        rows.into_iter()
            .map(|row| record_from_row(row, &category_names, &accounts))
            .collect()
    }

    async fn insert_budget(&mut self, owner: UserId, budget: &Budget) -> Result<(), StoreError> {
        let row = NewBudgetRow::from_domain(owner, budget)?;
        diesel::insert_into(budgets::table)
            .values(&row)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn insert_budget_categories(
        &mut self,
        budget_id: BudgetId,
        limits: &[CategoryBudget],
    ) -> Result<(), StoreError> {
        if limits.is_empty() {
            return Ok(());
        }
        let budget_id = db_id(budget_id)?;
        let rows = limits
            .iter()
            .map(|limit| {
                Ok(BudgetCategoryRow {
                    budget_id,
                    category_id: db_id(limit.category_id())?,
                    max_limit: limit.max_limit().minor_units().map_err(corrupt)?,
                    currency: limit.max_limit().currency().code().to_owned(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        diesel::insert_into(budget_categories::table)
            .values(&rows)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn insert_budget_accounts(
        &mut self,
        budget_id: BudgetId,
        account_ids: &[AccountId],
    ) -> Result<(), StoreError> {
        if account_ids.is_empty() {
            return Ok(());
        }
        let budget_id = db_id(budget_id)?;
        let rows = account_ids
            .iter()
            .map(|id| {
                Ok(BudgetAccountRow {
                    budget_id,
                    account_id: db_id(*id)?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        diesel::insert_into(budget_accounts::table)
            .values(&rows)
            .execute(self.conn()?)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn list_budgets(&mut self, owner: UserId) -> Result<Vec<Budget>, StoreError> {
        let conn = self.conn()?;
        let rows: Vec<BudgetRow> = budgets::table
            .filter(budgets::user_id.eq(db_id(owner)?))
            .order(budgets::id.asc())
            .select(BudgetRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let limit_rows: Vec<BudgetCategoryRow> = budget_categories::table
            .filter(budget_categories::budget_id.eq_any(ids.clone()))
            .order((budget_categories::budget_id.asc(), budget_categories::category_id.asc()))
            .select(BudgetCategoryRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let mut limits: BTreeMap<i64, Vec<(CategoryId, Money)>> = BTreeMap::new();
        for row in limit_rows {
            let limit = (domain_id(row.category_id)?, row.max_limit()?);
            limits.entry(row.budget_id).or_default().push(limit);
        }

        let account_rows: Vec<BudgetAccountRow> = budget_accounts::table
            .filter(budget_accounts::budget_id.eq_any(ids))
            .order((budget_accounts::budget_id.asc(), budget_accounts::account_id.asc()))
            .select(BudgetAccountRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let mut linked: BTreeMap<i64, Vec<AccountId>> = BTreeMap::new();
        for row in account_rows {
            linked
                .entry(row.budget_id)
                .or_default()
                .push(domain_id(row.account_id)?);
        }

        rows.into_iter()
            .map(|row| {
                Budget::try_from(BudgetDraft {
                    id: domain_id(row.id)?,
                    account_ids: linked.remove(&row.id).unwrap_or_default(),
                    period_type: row.period_type.parse().map_err(corrupt)?,
                    limits: limits.remove(&row.id).unwrap_or_default(),
                    audit: row.audit()?,
                })
                .map_err(corrupt)
            })
            .collect()
    }
}
