//! Transaction bookkeeping shared by the services.
//!
//! Every service method follows the same shape: open a transaction, run the
//! operation against it, then [`finish`] it. `finish` commits on success and
//! rolls back on failure, so a transaction is released on every exit path.
//! A panic or a dropped future leaves the transaction unfinished, which the
//! store treats as a rollback.

use tracing::{debug, error, warn};

use crate::domain::ports::{Sequence, Store, StoreError, StoreTransaction};
use crate::domain::{Error, InvalidId};

/// Translate a store failure that no service handles specially.
pub(crate) fn store_error(err: StoreError) -> Error {
    match &err {
        StoreError::Connection { .. } => {
            Error::database_connectivity("the database is unreachable").with_cause(err)
        }
        StoreError::Conflict { entity, .. } => {
            Error::database_state(format!("the {entity} was modified concurrently"))
                .with_field("version", "does not match the stored version")
                .with_cause(err)
        }
        StoreError::Query { .. } | StoreError::Duplicate { .. } => {
            Error::database_state("the database rejected the operation").with_cause(err)
        }
    }
}

/// Open a transaction on `store`.
pub(crate) async fn begin<S>(store: &S) -> Result<Box<dyn StoreTransaction>, Error>
where
    S: Store + ?Sized,
{
    store.begin().await.map_err(store_error)
}

/// Commit `tx` if `outcome` succeeded, otherwise roll it back and return
/// the original error.
pub(crate) async fn finish<T>(
    mut tx: Box<dyn StoreTransaction>,
    outcome: Result<T, Error>,
) -> Result<T, Error> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(|err| {
                error!(error = %err, "commit failed");
                store_error(err)
            })?;
            Ok(value)
        }
        Err(cause) => {
            debug!(code = %cause.code(), "rolling back");
            if let Err(err) = tx.rollback().await {
                warn!(error = %err, "rollback failed");
            }
            Err(cause)
        }
    }
}

/// Issue the next id of `sequence` as a typed id.
pub(crate) async fn mint<I>(tx: &mut dyn StoreTransaction, sequence: Sequence) -> Result<I, Error>
where
    I: TryFrom<u64, Error = InvalidId>,
{
    let raw = tx.next_id(sequence).await.map_err(store_error)?;
    I::try_from(raw).map_err(|err| {
        Error::database_state(format!("{} issued an invalid id", sequence.name())).with_cause(err)
    })
}
