//! Backend library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the budgeting
//! rules and ports, [`inbound`] and [`outbound`] hold the adapters, and
//! [`server`] wires them into an Actix application.

pub mod doc;
pub mod domain;
pub mod example_data;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
