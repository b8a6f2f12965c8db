//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{
    AccountsCommand, AccountsQuery, BudgetsCommand, BudgetsQuery, CategoriesCommand,
    CategoriesQuery, HealthQuery, RecordsCommand, RecordsQuery, Store, UsersCommand,
};
use crate::domain::{
    AccountService, BudgetService, CategoryService, Error, HealthService, RecordService,
    UserService,
};

/// Deadline applied when none is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersCommand>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub categories: Arc<dyn CategoriesCommand>,
    pub categories_query: Arc<dyn CategoriesQuery>,
    pub records: Arc<dyn RecordsCommand>,
    pub records_query: Arc<dyn RecordsQuery>,
    pub budgets: Arc<dyn BudgetsCommand>,
    pub budgets_query: Arc<dyn BudgetsQuery>,
    pub health: Arc<dyn HealthQuery>,
    deadline: Duration,
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UsersCommand>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub categories: Arc<dyn CategoriesCommand>,
    pub categories_query: Arc<dyn CategoriesQuery>,
    pub records: Arc<dyn RecordsCommand>,
    pub records_query: Arc<dyn RecordsQuery>,
    pub budgets: Arc<dyn BudgetsCommand>,
    pub budgets_query: Arc<dyn BudgetsQuery>,
    pub health: Arc<dyn HealthQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from explicit ports with the default deadline.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            accounts,
            accounts_query,
            categories,
            categories_query,
            records,
            records_query,
            budgets,
            budgets_query,
            health,
        } = ports;
        Self {
            users,
            accounts,
            accounts_query,
            categories,
            categories_query,
            records,
            records_query,
            budgets,
            budgets_query,
            health,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Wire every port to the domain services over one store.
    pub fn over_store<S: Store + 'static>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let accounts = Arc::new(AccountService::new(Arc::clone(&store), Arc::clone(&clock)));
        let categories = Arc::new(CategoryService::new(Arc::clone(&store), Arc::clone(&clock)));
        let records = Arc::new(RecordService::new(Arc::clone(&store), Arc::clone(&clock)));
        let budgets = Arc::new(BudgetService::new(Arc::clone(&store), Arc::clone(&clock)));
        Self::new(HttpStatePorts {
            users: Arc::new(UserService::new(Arc::clone(&store), clock)),
            accounts: accounts.clone(),
            accounts_query: accounts,
            categories: categories.clone(),
            categories_query: categories,
            records: records.clone(),
            records_query: records,
            budgets: budgets.clone(),
            budgets_query: budgets,
            health: Arc::new(HealthService::new(store)),
        })
    }

    /// Replace the per-request service deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// The per-request service deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run a port call under the service deadline.
    ///
    /// When the deadline elapses the call is dropped, which rolls back any
    /// open store transaction.
    ///
    /// # Errors
    ///
    /// The call's own error, or `DATABASE_CONNECTIVITY` on timeout.
    pub async fn within<T, F>(&self, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(deadline_ms = self.deadline.as_millis(), "service deadline elapsed");
                Err(Error::database_connectivity(
                    "The request did not complete before its deadline",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::MockPorts;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn calls_past_the_deadline_are_connectivity_failures() {
        let state = MockPorts::default()
            .into_state()
            .with_deadline(Duration::from_millis(10));

        let outcome: Result<(), Error> = state
            .within(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let err = outcome.expect_err("deadline elapsed");
        assert_eq!(err.code(), ErrorCode::DatabaseConnectivity);
    }

    #[rstest]
    #[tokio::test]
    async fn calls_within_the_deadline_keep_their_outcome() {
        let state = MockPorts::default().into_state();

        let outcome = state
            .within(async { Err::<(), _>(Error::account_not_found("gone")) })
            .await;

        assert_eq!(
            outcome.expect_err("call failed").code(),
            ErrorCode::AccountNotFound
        );
        assert_eq!(state.deadline(), DEFAULT_DEADLINE);
    }
}
