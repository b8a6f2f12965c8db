//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! The driven [`Store`] port is what services call.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod accounts_query;
mod budgets_command;
mod budgets_query;
mod categories_command;
mod categories_query;
mod health_query;
mod records_command;
mod records_query;
mod store;
mod users_command;

#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::{AccountsCommand, NewAccount, UpdateAccountRequest};
#[cfg(test)]
pub use accounts_query::MockAccountsQuery;
pub use accounts_query::AccountsQuery;
#[cfg(test)]
pub use budgets_command::MockBudgetsCommand;
pub use budgets_command::{BudgetsCommand, CreateBudgetRequest, NewCategoryLimit};
#[cfg(test)]
pub use budgets_query::MockBudgetsQuery;
pub use budgets_query::BudgetsQuery;
#[cfg(test)]
pub use categories_command::MockCategoriesCommand;
pub use categories_command::{CategoriesCommand, NewCategory, UpdateCategoryRequest};
#[cfg(test)]
pub use categories_query::MockCategoriesQuery;
pub use categories_query::CategoriesQuery;
#[cfg(test)]
pub use health_query::MockHealthQuery;
pub use health_query::HealthQuery;
#[cfg(test)]
pub use records_command::MockRecordsCommand;
pub use records_command::{AmountInput, CreateRecordRequest, CreatedRecord, RecordsCommand};
#[cfg(test)]
pub use records_query::MockRecordsQuery;
pub use records_query::{RecordSearch, RecordsPage, RecordsQuery};
pub use store::{DuplicateKey, Sequence, Store, StoreError, StoreTransaction};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::{CreateUserRequest, UsersCommand};
