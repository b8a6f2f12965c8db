//! PostgreSQL persistence using Diesel.
//!
//! [`DieselStore`] implements the domain's [`crate::domain::ports::Store`]
//! port over a `bb8` pool of `diesel-async` connections.
//!
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) are
//!   internal; only domain types cross the port.
//! - Every Diesel failure is mapped to a
//!   [`crate::domain::ports::StoreError`], with unique violations carrying
//!   the violated key.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselStore, PoolConfig, run_migrations};
//!
//! run_migrations("postgres://localhost/budget", None).await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/budget")).await?;
//! let store = DieselStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_store::DieselStore;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
