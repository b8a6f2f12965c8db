//! Database readiness check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{HealthQuery, Store};
use crate::domain::transaction::store_error;

/// Answers readiness probes by pinging the [`Store`].
#[derive(Clone)]
pub struct HealthService<S> {
    store: Arc<S>,
}

impl<S> HealthService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Store> HealthQuery for HealthService<S> {
    async fn check_database(&self) -> Result<(), Error> {
        self.store.ping().await.map_err(|err| {
            warn!(error = %err, "database ping failed");
            store_error(err)
        })
    }
}
