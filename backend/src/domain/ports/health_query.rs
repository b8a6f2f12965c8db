//! Driving port for readiness checks.

use async_trait::async_trait;

use crate::domain::Error;

/// Reports whether the backing store answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthQuery: Send + Sync {
    /// Ping the store.
    ///
    /// # Errors
    ///
    /// `DATABASE_CONNECTIVITY` when the store is unreachable.
    async fn check_database(&self) -> Result<(), Error>;
}
