//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: hold every budgeting rule independent of transport and storage.
//! Value objects (`Money`, `AuditInfo`, `CalendarMonth`) are immutable;
//! aggregates validate on construction; services orchestrate store
//! transactions through [`ports::Store`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: the two-kind error model and its code table.
//! - `Money`, `Currency`: single-currency amounts in minor units.
//! - `User`, `Account`, `Category`, `Record`, `Budget`: aggregates.
//! - `Records`: date-ordered collections with totals.
//! - `*Service`: implementations of the driving ports.

mod account;
mod account_service;
mod audit;
mod budget;
mod budget_service;
mod calendar;
mod category;
mod category_service;
mod context;
mod currency;
pub mod error;
mod health_service;
mod ids;
mod money;
mod names;
pub mod ports;
mod record;
mod record_service;
mod records;
mod search;
mod transaction;
mod user;
mod user_service;

pub use self::account::{Account, AccountBalance, AccountType};
pub use self::account_service::AccountService;
pub use self::audit::{AuditInfo, UpdatedBy};
pub use self::budget::{Budget, BudgetDraft, CategoryBudget, PeriodType};
pub use self::budget_service::BudgetService;
pub use self::calendar::{CalendarMonth, CalendarWeek};
pub use self::category::Category;
pub use self::category_service::CategoryService;
pub use self::context::RequestContext;
pub use self::currency::Currency;
pub use self::error::{Cause, Error, ErrorCode, Problem, SystemFailure, UnknownErrorCode};
pub use self::health_service::HealthService;
pub use self::ids::{AccountId, BudgetId, CategoryId, InvalidId, RecordId, UserId};
pub use self::money::Money;
pub use self::names::{NAME_MAX, NAME_MIN, title_case};
pub use self::record::{
    Beneficiary, NOTE_MAX, Record, RecordCategory, RecordDraft, RecordType, TransferLink,
};
pub use self::record_service::RecordService;
pub use self::records::{Records, RecordsSummary};
pub use self::search::{RecordFilter, SearchTerm};
pub use self::user::{EMAIL_MAX, EmailAddress, User};
pub use self::user_service::UserService;
