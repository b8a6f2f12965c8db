//! Internal Diesel row structs and their translation to domain types.
//!
//! Rows never leave the persistence layer. Loading a row re-runs the domain
//! constructors, so a row that no longer satisfies them surfaces as a query
//! error rather than a half-valid aggregate.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{
    Account, AccountId, AuditInfo, Budget, Category, Currency, InvalidId, Money, Record,
    UpdatedBy, User, UserId,
};

use super::schema::{
    accounts, budget_accounts, budget_categories, budgets, categories, records, users,
};

/// Convert a domain id for a BIGINT column.
pub(crate) fn db_id(raw: impl Into<u64>) -> Result<i64, StoreError> {
    let raw = raw.into();
    i64::try_from(raw).map_err(|_| StoreError::query(format!("id {raw} does not fit BIGINT")))
}

/// Convert a BIGINT column into a typed id.
pub(crate) fn domain_id<I>(raw: i64) -> Result<I, StoreError>
where
    I: TryFrom<u64, Error = InvalidId>,
{
    u64::try_from(raw)
        .map_err(|_| StoreError::query(format!("negative id {raw}")))
        .and_then(|raw| I::try_from(raw).map_err(|err| StoreError::query(err.to_string())))
}

pub(crate) fn db_version(version: u32) -> Result<i32, StoreError> {
    i32::try_from(version).map_err(|_| StoreError::query(format!("version {version} overflows")))
}

pub(crate) fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::query(format!("stored row is invalid: {err}"))
}

/// Audit columns as stored.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AuditColumns {
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl AuditColumns {
    pub(crate) fn from_domain(audit: &AuditInfo) -> Result<Self, StoreError> {
        Ok(Self {
            created_by: principal_column(audit.created_by())?,
            created_at: audit.created_at(),
            modified_by: principal_column(audit.modified_by())?,
            modified_at: audit.modified_at(),
            version: db_version(audit.version())?,
        })
    }

    fn into_domain(self) -> Result<AuditInfo, StoreError> {
        let version = u32::try_from(self.version).map_err(corrupt)?;
        AuditInfo::make_for_modification(
            principal(self.created_by)?,
            Some(self.created_at),
            principal(self.modified_by)?,
            self.modified_at,
            version,
        )
        .map_err(corrupt)
    }
}

fn principal_column(by: UpdatedBy) -> Result<Option<i64>, StoreError> {
    by.user_id().map(db_id).transpose()
}

fn principal(column: Option<i64>) -> Result<UpdatedBy, StoreError> {
    column
        .map(domain_id::<UserId>)
        .transpose()
        .map(|id| id.map_or(UpdatedBy::ZERO, UpdatedBy::user))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, StoreError> {
        let audit = AuditColumns {
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            version: self.version,
        }
        .into_domain()?;
        User::new(domain_id(self.id)?, &self.email, audit).map_err(corrupt)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: i64,
    pub email: &'a str,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_domain(user: &'a User) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(user.audit())?;
        Ok(Self {
            id: db_id(user.id())?,
            email: user.email().as_ref(),
            created_by: audit.created_by,
            created_at: audit.created_at,
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i64,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl AccountRow {
    pub(crate) fn into_domain(self) -> Result<Account, StoreError> {
        let audit = AuditColumns {
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            version: self.version,
        }
        .into_domain()?;
        Account::new(
            domain_id(self.id)?,
            &self.name,
            self.account_type.parse().map_err(corrupt)?,
            Currency::from_code(&self.currency).map_err(corrupt)?,
            audit,
        )
        .map_err(corrupt)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: i64,
    pub user_id: i64,
    pub name: &'a str,
    pub account_type: &'static str,
    pub currency: &'static str,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> NewAccountRow<'a> {
    pub(crate) fn from_domain(owner: UserId, account: &'a Account) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(account.audit())?;
        Ok(Self {
            id: db_id(account.id())?,
            user_id: db_id(owner)?,
            name: account.name(),
            account_type: account.account_type().as_str(),
            currency: account.currency().code(),
            created_by: audit.created_by,
            created_at: audit.created_at,
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

/// Columns an account rename rewrites.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AccountUpdate<'a> {
    pub name: &'a str,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> AccountUpdate<'a> {
    pub(crate) fn from_domain(account: &'a Account) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(account.audit())?;
        Ok(Self {
            name: account.name(),
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl CategoryRow {
    pub(crate) fn into_domain(self) -> Result<Category, StoreError> {
        let audit = AuditColumns {
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            version: self.version,
        }
        .into_domain()?;
        Category::new(domain_id(self.id)?, &self.name, audit)
            .map(|category| category.with_last_used_at(self.last_used_at))
            .map_err(corrupt)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: i64,
    pub user_id: i64,
    pub name: &'a str,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> NewCategoryRow<'a> {
    pub(crate) fn from_domain(owner: UserId, category: &'a Category) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(category.audit())?;
        Ok(Self {
            id: db_id(category.id())?,
            user_id: db_id(owner)?,
            name: category.name(),
            last_used_at: category.last_used_at(),
            created_by: audit.created_by,
            created_at: audit.created_at,
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

/// Columns a category rename rewrites.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CategoryUpdate<'a> {
    pub name: &'a str,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> CategoryUpdate<'a> {
    pub(crate) fn from_domain(category: &'a Category) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(category.audit())?;
        Ok(Self {
            name: category.name(),
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored record. Category and beneficiary names are joined in by the
/// store when the row is turned into a domain record.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecordRow {
    pub id: i64,
    pub category_id: i64,
    pub note: String,
    pub amount: i64,
    pub currency: String,
    pub date: DateTime<Utc>,
    pub record_type: String,
    pub source_account_id: Option<i64>,
    pub beneficiary_account_id: Option<i64>,
    pub transfer_reference: Option<Uuid>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl RecordRow {
    pub(crate) fn audit(&self) -> Result<AuditInfo, StoreError> {
        AuditColumns {
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            version: self.version,
        }
        .into_domain()
    }

    pub(crate) fn amount(&self) -> Result<Money, StoreError> {
        Money::new(&self.currency, self.amount).map_err(corrupt)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = records)]
pub(crate) struct NewRecordRow<'a> {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: i64,
    pub note: &'a str,
    pub amount: i64,
    pub currency: &'static str,
    pub date: DateTime<Utc>,
    pub record_type: &'static str,
    pub source_account_id: Option<i64>,
    pub beneficiary_account_id: Option<i64>,
    pub transfer_reference: Option<Uuid>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl<'a> NewRecordRow<'a> {
    pub(crate) fn from_domain(
        owner: UserId,
        account_id: AccountId,
        record: &'a Record,
    ) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(record.audit())?;
        let transfer = record.transfer();
        Ok(Self {
            id: db_id(record.id())?,
            user_id: db_id(owner)?,
            account_id: db_id(account_id)?,
            category_id: db_id(record.category().id)?,
            note: record.note(),
            amount: record.amount().minor_units().map_err(corrupt)?,
            currency: record.amount().currency().code(),
            date: record.date(),
            record_type: record.record_type().as_str(),
            source_account_id: transfer.map(|t| db_id(t.source_account_id)).transpose()?,
            beneficiary_account_id: transfer.map(|t| db_id(t.beneficiary.id)).transpose()?,
            transfer_reference: transfer.map(|t| t.reference),
            created_by: audit.created_by,
            created_at: audit.created_at,
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BudgetRow {
    pub id: i64,
    pub period_type: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl BudgetRow {
    pub(crate) fn audit(&self) -> Result<AuditInfo, StoreError> {
        AuditColumns {
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            version: self.version,
        }
        .into_domain()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = budgets)]
pub(crate) struct NewBudgetRow {
    pub id: i64,
    pub user_id: i64,
    pub period_type: &'static str,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl NewBudgetRow {
    pub(crate) fn from_domain(owner: UserId, budget: &Budget) -> Result<Self, StoreError> {
        let audit = AuditColumns::from_domain(budget.audit())?;
        Ok(Self {
            id: db_id(budget.id())?,
            user_id: db_id(owner)?,
            period_type: budget.period_type().as_str(),
            created_by: audit.created_by,
            created_at: audit.created_at,
            modified_by: audit.modified_by,
            modified_at: audit.modified_at,
            version: audit.version,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = budget_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BudgetCategoryRow {
    pub budget_id: i64,
    pub category_id: i64,
    pub max_limit: i64,
    pub currency: String,
}

impl BudgetCategoryRow {
    pub(crate) fn max_limit(&self) -> Result<Money, StoreError> {
        Money::new(&self.currency, self.max_limit).map_err(corrupt)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = budget_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BudgetAccountRow {
    pub budget_id: i64,
    pub account_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    use crate::domain::AccountType;

    fn created() -> AuditInfo {
        let at = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).single().expect("valid date");
        AuditInfo::make_for_creation(UpdatedBy::user(UserId::new(1).expect("valid id")), at)
    }

    #[rstest]
    fn zero_principals_are_stored_as_null() {
        let columns = AuditColumns::from_domain(&created()).expect("columns");

        assert_eq!(columns.created_by, Some(1));
        assert_eq!(columns.modified_by, None);
        assert_eq!(columns.modified_at, None);
        assert_eq!(columns.version, 1);
        assert_eq!(columns.into_domain().expect("audit"), created());
    }

    #[rstest]
    fn rows_are_revalidated_on_load() {
        let audit = created();
        let row = AccountRow {
            id: 3,
            name: "Current".to_owned(),
            account_type: "PIGGYBANK".to_owned(),
            currency: "AED".to_owned(),
            created_by: Some(1),
            created_at: audit.created_at(),
            modified_by: None,
            modified_at: None,
            version: 1,
        };

        let err = row.into_domain().expect_err("unknown account type");
        assert!(err.is_query());
    }

    #[rstest]
    fn account_rows_round_trip() {
        let account = Account::new(
            AccountId::new(3).expect("valid id"),
            "Current",
            AccountType::Current,
            Currency::from_code("AED").expect("known currency"),
            created(),
        )
        .expect("valid account");
        let owner = UserId::new(1).expect("valid id");
        let new_row = NewAccountRow::from_domain(owner, &account).expect("row");

        let loaded = AccountRow {
            id: new_row.id,
            name: new_row.name.to_owned(),
            account_type: new_row.account_type.to_owned(),
            currency: new_row.currency.to_owned(),
            created_by: new_row.created_by,
            created_at: new_row.created_at,
            modified_by: new_row.modified_by,
            modified_at: new_row.modified_at,
            version: new_row.version,
        }
        .into_domain()
        .expect("valid row");
        assert_eq!(loaded, account);
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn non_positive_ids_are_rejected(#[case] raw: i64) {
        assert!(domain_id::<AccountId>(raw).is_err());
    }

    #[rstest]
    fn currency_codes_are_revalidated() {
        let row = BudgetCategoryRow {
            budget_id: 1,
            category_id: 2,
            max_limit: 100,
            currency: "XXX".to_owned(),
        };
        let err = row.max_limit().expect_err("unknown currency");
        assert!(err.is_query());
    }
}
