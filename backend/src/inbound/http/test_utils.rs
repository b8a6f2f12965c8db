//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, call_service, init_service, read_body};
use actix_web::{App, web};
use serde_json::Value;

use crate::Trace;
use crate::domain::ports::{
    MockAccountsCommand, MockAccountsQuery, MockBudgetsCommand, MockBudgetsQuery,
    MockCategoriesCommand, MockCategoriesQuery, MockHealthQuery, MockRecordsCommand,
    MockRecordsQuery, MockUsersCommand,
};
use crate::domain::{
    Account, AccountId, AccountType, AuditInfo, Category, CategoryId, Currency, UpdatedBy, UserId,
};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::day;

/// One mock per driving port, with no expectations set.
#[derive(Default)]
pub struct MockPorts {
    pub users: MockUsersCommand,
    pub accounts: MockAccountsCommand,
    pub accounts_query: MockAccountsQuery,
    pub categories: MockCategoriesCommand,
    pub categories_query: MockCategoriesQuery,
    pub records: MockRecordsCommand,
    pub records_query: MockRecordsQuery,
    pub budgets: MockBudgetsCommand,
    pub budgets_query: MockBudgetsQuery,
    pub health: MockHealthQuery,
}

impl MockPorts {
    /// Handler state backed by these mocks.
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            users: Arc::new(self.users),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            categories: Arc::new(self.categories),
            categories_query: Arc::new(self.categories_query),
            records: Arc::new(self.records),
            records_query: Arc::new(self.records_query),
            budgets: Arc::new(self.budgets),
            budgets_query: Arc::new(self.budgets_query),
            health: Arc::new(self.health),
        })
    }
}

/// Send `request` to the full API over `ports` and decode the JSON answer.
pub async fn call_json(ports: MockPorts, request: TestRequest) -> (StatusCode, Value) {
    let app = init_service(
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(ports.into_state()))
            .configure(configure),
    )
    .await;
    let response = call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// The `Authorization` header of user `raw`.
pub fn caller(raw: u64) -> (&'static str, String) {
    ("Authorization", raw.to_string())
}

pub fn user_id(raw: u64) -> UserId {
    UserId::new(raw).expect("user id")
}

pub fn account_id(raw: u64) -> AccountId {
    AccountId::new(raw).expect("account id")
}

pub fn category_id(raw: u64) -> CategoryId {
    CategoryId::new(raw).expect("category id")
}

pub fn audit() -> AuditInfo {
    AuditInfo::make_for_creation(UpdatedBy::user(user_id(1)), day(2021, 1, 1))
}

pub fn aed() -> Currency {
    Currency::from_code("AED").expect("currency")
}

pub fn account(raw: u64, name: &str, account_type: AccountType) -> Account {
    Account::new(account_id(raw), name, account_type, aed(), audit()).expect("account")
}

pub fn category(raw: u64, name: &str) -> Category {
    Category::new(category_id(raw), name, audit()).expect("category")
}
