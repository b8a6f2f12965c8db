//! Shared HTTP harness for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. The
//! helpers here drive the full application (middleware, routing, services)
//! over a fresh in-memory store and a clock stopped at 2021-01-15 12:00 UTC.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::MemoryStore;
use backend::test_support::fixture_clock;
use serde_json::{Value, json};

/// Header budget used by the harness unless a test needs a smaller one.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Handler state over an empty in-memory store.
pub fn fresh_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::over_store(
        Arc::new(MemoryStore::new()),
        fixture_clock(),
    ))
}

/// Attach the caller header carrying `user_id`.
pub fn as_caller(request: TestRequest, user_id: u64) -> TestRequest {
    request.insert_header((AUTHORIZATION, user_id.to_string()))
}

/// Send a request and decode the response body as JSON.
///
/// Empty bodies decode to [`Value::Null`].
pub async fn send<S, B>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

/// Register a user and return its id.
pub async fn create_user<S, B>(app: &S, email: &str) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        TestRequest::post()
            .uri("/api/v1/user")
            .set_json(json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user: {body}");
    body["id"].as_u64().expect("user id")
}

/// Create accounts for `user_id` from `(name, currency, type)` triples and
/// return their ids in request order.
pub async fn create_accounts<S, B>(app: &S, user_id: u64, accounts: &[(&str, &str, &str)]) -> Vec<u64>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let payload: Vec<Value> = accounts
        .iter()
        .map(|(name, currency, kind)| json!({ "name": name, "currency": currency, "type": kind }))
        .collect();
    let (status, body) = send(
        app,
        as_caller(TestRequest::post().uri("/api/v1/accounts"), user_id)
            .set_json(json!({ "accounts": payload })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create accounts: {body}");
    body["accounts"]
        .as_array()
        .expect("accounts array")
        .iter()
        .map(|account| account["id"].as_u64().expect("account id"))
        .collect()
}

/// Create a single category for `user_id` and return its id.
pub async fn create_category<S, B>(app: &S, user_id: u64, name: &str) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        as_caller(TestRequest::post().uri("/api/v1/categories"), user_id)
            .set_json(json!({ "categories": [{ "name": name }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create category: {body}");
    body["categories"][0]["id"].as_u64().expect("category id")
}

/// Post a record against `account_id` on behalf of `user_id`.
pub async fn post_record<S, B>(
    app: &S,
    user_id: u64,
    account_id: u64,
    record: Value,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(
        app,
        as_caller(
            TestRequest::post().uri(&format!("/api/v1/accounts/{account_id}/records")),
            user_id,
        )
        .set_json(record),
    )
    .await
}

/// Fetch the latest-month listing for `account_id`.
pub async fn latest_records<S, B>(app: &S, user_id: u64, account_id: u64) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        as_caller(
            TestRequest::get().uri(&format!("/api/v1/accounts/{account_id}/records?latest")),
            user_id,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "latest records: {body}");
    body
}
