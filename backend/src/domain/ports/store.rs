//! Driven port for transactional persistence.
//!
//! Services open a [`StoreTransaction`] per request, issue every read and
//! write through it, then commit or roll back. All reads are scoped to the
//! owning user, so another user's rows behave as missing.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountBalance, AccountId, Budget, BudgetId, Category, CategoryBudget, CategoryId,
    Record, RecordFilter, User, UserId,
};

use super::define_port_error;

/// Per-aggregate id sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// `users` ids.
    User,
    /// `accounts` ids.
    Account,
    /// `categories` ids.
    Category,
    /// `records` ids.
    Record,
    /// `budgets` ids.
    Budget,
}

impl Sequence {
    /// Every sequence.
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Account,
        Self::Category,
        Self::Record,
        Self::Budget,
    ];

    /// Name of the backing database sequence.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "users_id_seq",
            Self::Account => "accounts_id_seq",
            Self::Category => "categories_id_seq",
            Self::Record => "records_id_seq",
            Self::Budget => "budgets_id_seq",
        }
    }
}

/// The unique constraint a write collided with and the offending key.
///
/// # Examples
/// ```
/// use backend::domain::ports::DuplicateKey;
///
/// let key = DuplicateKey::new("accounts_user_id_name_key")
///     .with_column("user_id", "1")
///     .with_column("name", "Current");
/// assert_eq!(key.value("name"), Some("Current"));
/// assert_eq!(key.to_string(), "accounts_user_id_name_key (name=Current, user_id=1)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateKey {
    constraint: String,
    columns: BTreeMap<String, String>,
}

impl DuplicateKey {
    /// A collision on `constraint` with no column detail.
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Record the value of one key column.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Name of the violated constraint.
    #[must_use]
    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// Value of a key column, when known.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.constraint)?;
        if self.columns.is_empty() {
            return Ok(());
        }
        let pairs: Vec<String> = self
            .columns
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect();
        write!(f, " ({})", pairs.join(", "))
    }
}

define_port_error! {
    /// Failures raised by store adapters.
    pub enum StoreError {
        /// The store could not be reached.
        Connection { message: String } => "store connection failed: {message}",
        /// A statement failed or returned unusable data.
        Query { message: String } => "store query failed: {message}",
        /// A write violated a unique constraint.
        Duplicate { key: DuplicateKey } => "duplicate key: {key}",
        /// An update observed a version other than the expected one.
        Conflict { entity: String, id: u64, expected: u32 } =>
            "{entity} {id} is not at version {expected}",
    }
}

impl StoreError {
    /// The violated key, when this is a unique-constraint failure.
    #[must_use]
    pub const fn duplicate_key(&self) -> Option<&DuplicateKey> {
        match self {
            Self::Duplicate { key } => Some(key),
            _ => None,
        }
    }
}

/// Factory for store transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// One open transaction.
///
/// Dropping a transaction without finishing it abandons every write made
/// through it.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Make every write durable.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard every write. Rolling back a finished transaction does
    /// nothing.
    async fn rollback(&mut self) -> Result<(), StoreError>;

    /// Next value of `sequence`. Issued values are never reused, even when
    /// the transaction rolls back.
    async fn next_id(&mut self, sequence: Sequence) -> Result<u64, StoreError>;

    /// Insert a user.
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError>;

    /// Fetch a user.
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert accounts owned by `owner` in one statement.
    async fn insert_accounts(&mut self, owner: UserId, accounts: &[Account])
    -> Result<(), StoreError>;

    /// Fetch one of `owner`'s accounts.
    async fn find_account(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError>;

    /// Fetch one of `owner`'s accounts with the sum of its records.
    async fn find_account_balance(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<AccountBalance>, StoreError>;

    /// Every account of `owner` with its balance, ordered by id.
    async fn list_account_balances(
        &mut self,
        owner: UserId,
    ) -> Result<Vec<AccountBalance>, StoreError>;

    /// Replace a stored account if it is still at `expected_version`.
    async fn update_account(
        &mut self,
        owner: UserId,
        account: &Account,
        expected_version: u32,
    ) -> Result<(), StoreError>;

    /// Insert categories owned by `owner` in one statement.
    async fn insert_categories(
        &mut self,
        owner: UserId,
        categories: &[Category],
    ) -> Result<(), StoreError>;

    /// Fetch one of `owner`'s categories.
    async fn find_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
    ) -> Result<Option<Category>, StoreError>;

    /// Every category of `owner`, ordered by id.
    async fn list_categories(&mut self, owner: UserId) -> Result<Vec<Category>, StoreError>;

    /// Replace a stored category if it is still at `expected_version`.
    async fn update_category(
        &mut self,
        owner: UserId,
        category: &Category,
        expected_version: u32,
    ) -> Result<(), StoreError>;

    /// Set a category's last-used time.
    async fn touch_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
        used_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Insert a record against one of `owner`'s accounts.
    async fn insert_record(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        record: &Record,
    ) -> Result<(), StoreError>;

    /// Date of the newest record of an account.
    async fn latest_record_date(
        &mut self,
        owner: UserId,
        account_id: AccountId,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Records of an account that pass `filter`, in any order.
    async fn list_records(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, StoreError>;

    /// Insert a budget row.
    async fn insert_budget(&mut self, owner: UserId, budget: &Budget) -> Result<(), StoreError>;

    /// Insert a budget's per-category limits in one statement.
    async fn insert_budget_categories(
        &mut self,
        budget_id: BudgetId,
        limits: &[CategoryBudget],
    ) -> Result<(), StoreError>;

    /// Link a budget to its accounts in one statement.
    async fn insert_budget_accounts(
        &mut self,
        budget_id: BudgetId,
        account_ids: &[AccountId],
    ) -> Result<(), StoreError>;

    /// Every budget of `owner` with zero spending, ordered by id.
    async fn list_budgets(&mut self, owner: UserId) -> Result<Vec<Budget>, StoreError>;
}
