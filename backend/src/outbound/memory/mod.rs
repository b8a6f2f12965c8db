//! In-process implementation of the [`Store`] port.
//!
//! Transactions are serialisable: `begin` takes an owned lock on the shared
//! state, works on a private copy, and swaps the copy in on commit. Dropping
//! an unfinished transaction releases the lock and discards the copy.
//! Sequences live outside the lock, so ids issued by a rolled-back
//! transaction are not reused.
//!
//! Faults can be injected to exercise rollback paths.

mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::ports::{Sequence, Store, StoreError, StoreTransaction};
use crate::domain::{
    Account, AccountBalance, AccountId, Budget, BudgetId, Category, CategoryBudget, CategoryId,
    Record, RecordFilter, User, UserId,
};

use self::state::MemoryState;

const NO_FAULT: usize = usize::MAX;

#[derive(Debug)]
struct Faults {
    commit: AtomicBool,
    ping: AtomicBool,
    writes_left: AtomicUsize,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            commit: AtomicBool::new(false),
            ping: AtomicBool::new(false),
            writes_left: AtomicUsize::new(NO_FAULT),
        }
    }
}

impl Faults {
    /// Spend one write, failing once the budget set by
    /// [`MemoryStore::fail_writes_after`] is exhausted.
    fn spend_write(&self) -> Result<(), StoreError> {
        let previous = self
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                NO_FAULT | 0 => None,
                left => Some(left - 1),
            });
        match previous {
            Err(0) => Err(StoreError::query("injected write failure")),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct Sequences {
    users: AtomicU64,
    accounts: AtomicU64,
    categories: AtomicU64,
    records: AtomicU64,
    budgets: AtomicU64,
}

impl Sequences {
    fn next(&self, sequence: Sequence) -> u64 {
        let counter = match sequence {
            Sequence::User => &self.users,
            Sequence::Account => &self.accounts,
            Sequence::Category => &self.categories,
            Sequence::Record => &self.records,
            Sequence::Budget => &self.budgets,
        };
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Shared in-memory store. Clones share state.
///
/// # Examples
/// ```
/// use backend::domain::ports::{Sequence, Store};
/// use backend::outbound::memory::MemoryStore;
///
/// # tokio_test_block_on(async {
/// let store = MemoryStore::new();
/// let mut tx = store.begin().await.expect("begin");
/// assert_eq!(tx.next_id(Sequence::User).await.expect("id"), 1);
/// tx.rollback().await.expect("rollback");
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    sequences: Arc<Sequences>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every commit fail until reset.
    pub fn fail_commits(&self, fail: bool) {
        self.faults.commit.store(fail, Ordering::SeqCst);
    }

    /// Make every ping fail until reset.
    pub fn fail_pings(&self, fail: bool) {
        self.faults.ping.store(fail, Ordering::SeqCst);
    }

    /// Let `writes` more writes succeed, then fail every later write until
    /// [`MemoryStore::clear_faults`].
    pub fn fail_writes_after(&self, writes: usize) {
        self.faults.writes_left.store(writes, Ordering::SeqCst);
    }

    /// Remove every injected fault.
    pub fn clear_faults(&self) {
        self.fail_commits(false);
        self.fail_pings(false);
        self.faults.writes_left.store(NO_FAULT, Ordering::SeqCst);
    }

    /// Committed record rows across all users.
    pub async fn committed_records(&self) -> usize {
        self.state.lock().await.record_count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            staged,
            sequences: Arc::clone(&self.sequences),
            faults: Arc::clone(&self.faults),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.faults.ping.load(Ordering::SeqCst) {
            return Err(StoreError::connection("injected ping failure"));
        }
        Ok(())
    }
}

/// Open transaction over a private copy of the state.
struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    staged: MemoryState,
    sequences: Arc<Sequences>,
    faults: Arc<Faults>,
}

impl MemoryTransaction {
    fn open(&mut self) -> Result<&mut MemoryState, StoreError> {
        if self.guard.is_none() {
            return Err(StoreError::query("transaction already finished"));
        }
        Ok(&mut self.staged)
    }

    fn write(&mut self) -> Result<&mut MemoryState, StoreError> {
        self.faults.spend_write()?;
        self.open()
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn commit(&mut self) -> Result<(), StoreError> {
        let Some(mut guard) = self.guard.take() else {
            return Err(StoreError::query("transaction already finished"));
        };
        if self.faults.commit.load(Ordering::SeqCst) {
            return Err(StoreError::connection("injected commit failure"));
        }
        *guard = std::mem::take(&mut self.staged);
        debug!("memory transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if self.guard.take().is_some() {
            debug!("memory transaction rolled back");
        }
        Ok(())
    }

    async fn next_id(&mut self, sequence: Sequence) -> Result<u64, StoreError> {
        self.open()?;
        Ok(self.sequences.next(sequence))
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.write()?.insert_user(user)
    }

    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.open()?.find_user(id))
    }

    async fn insert_accounts(
        &mut self,
        owner: UserId,
        accounts: &[Account],
    ) -> Result<(), StoreError> {
        self.write()?.insert_accounts(owner, accounts)
    }

    async fn find_account(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.open()?.find_account(owner, id))
    }

    async fn find_account_balance(
        &mut self,
        owner: UserId,
        id: AccountId,
    ) -> Result<Option<AccountBalance>, StoreError> {
        self.open()?.balance(owner, id)
    }

    async fn list_account_balances(
        &mut self,
        owner: UserId,
    ) -> Result<Vec<AccountBalance>, StoreError> {
        let state = self.open()?;
        let mut balances = Vec::new();
        for id in state.account_ids(owner) {
            balances.extend(state.balance(owner, id)?);
        }
        Ok(balances)
    }

    async fn update_account(
        &mut self,
        owner: UserId,
        account: &Account,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        self.write()?.update_account(owner, account, expected_version)
    }

    async fn insert_categories(
        &mut self,
        owner: UserId,
        categories: &[Category],
    ) -> Result<(), StoreError> {
        self.write()?.insert_categories(owner, categories)
    }

    async fn find_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
    ) -> Result<Option<Category>, StoreError> {
        Ok(self.open()?.find_category(owner, id))
    }

    async fn list_categories(&mut self, owner: UserId) -> Result<Vec<Category>, StoreError> {
        Ok(self.open()?.list_categories(owner))
    }

    async fn update_category(
        &mut self,
        owner: UserId,
        category: &Category,
        expected_version: u32,
    ) -> Result<(), StoreError> {
        self.write()?.update_category(owner, category, expected_version)
    }

    async fn touch_category(
        &mut self,
        owner: UserId,
        id: CategoryId,
        used_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.write()?.touch_category(owner, id, used_at)
    }

    async fn insert_record(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        record: &Record,
    ) -> Result<(), StoreError> {
        self.write()?.insert_record(owner, account_id, record)
    }

    async fn latest_record_date(
        &mut self,
        owner: UserId,
        account_id: AccountId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.open()?.latest_record_date(owner, account_id))
    }

    async fn list_records(
        &mut self,
        owner: UserId,
        account_id: AccountId,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, StoreError> {
        Ok(self.open()?.list_records(owner, account_id, filter))
    }

    async fn insert_budget(&mut self, owner: UserId, budget: &Budget) -> Result<(), StoreError> {
        self.write()?.insert_budget(owner, budget)
    }

    async fn insert_budget_categories(
        &mut self,
        budget_id: BudgetId,
        limits: &[CategoryBudget],
    ) -> Result<(), StoreError> {
        self.write()?.insert_budget_categories(budget_id, limits)
    }

    async fn insert_budget_accounts(
        &mut self,
        budget_id: BudgetId,
        account_ids: &[AccountId],
    ) -> Result<(), StoreError> {
        self.write()?.insert_budget_accounts(budget_id, account_ids)
    }

    async fn list_budgets(&mut self, owner: UserId) -> Result<Vec<Budget>, StoreError> {
        self.open()?.list_budgets(owner)
    }
}
