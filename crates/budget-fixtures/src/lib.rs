//! Deterministic example budget data generation for demonstration purposes.
//!
//! This crate generates believable, reproducible users with accounts,
//! categories and months of activity from a JSON seed registry. It is
//! independent of backend domain types to avoid circular dependencies.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Loading seed registries from JSON files
//! - Deterministic user generation using named seeds
//! - Name and note limits matching backend constraints
//!
//! # Example
//!
//! ```
//! use budget_fixtures::{SeedRegistry, generate_example_users};
//!
//! let json = r#"{
//!     "version": 1,
//!     "currencies": ["AED"],
//!     "categoryNames": ["Salary", "Savings", "Groceries", "Transport"],
//!     "seeds": [{"name": "test-seed", "seed": 42, "userCount": 3, "months": 1, "startMonth": "2021-01"}]
//! }"#;
//!
//! let registry = SeedRegistry::from_json(json).expect("valid registry");
//! let seed_def = registry.find_seed("test-seed").expect("seed exists");
//! let users = generate_example_users(&registry, seed_def).expect("generation succeeds");
//!
//! assert_eq!(users.len(), 3);
//! ```

mod error;
mod generator;
mod registry;
mod seed;
mod validation;

pub use error::{GenerationError, RegistryError};
pub use generator::generate_example_users;
pub use registry::{SeedDefinition, SeedRegistry, StartMonth};
pub use seed::{
    AccountKindSeed, ExampleAccountSeed, ExampleRecordSeed, ExampleUserSeed, RecordKindSeed,
};
pub use validation::{
    NAME_MAX, NAME_MIN, NOTE_MAX, is_valid_currency_code, is_valid_name, is_valid_note,
};
