//! Outbound adapters implementing the domain's [`crate::domain::ports::Store`]
//! port.
//!
//! - **persistence**: PostgreSQL through Diesel, used by the server.
//! - **memory**: an in-process store with fault injection, used by tests
//!   and by the server when no database is configured.
//!
//! Adapters translate between domain types and storage representations.
//! They contain no business logic.

pub mod memory;
pub mod persistence;
