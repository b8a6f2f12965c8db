//! End-to-end budgeting scenarios over the in-memory store.
//!
//! Each test builds the full application with `build_app`, so requests pass
//! through the header limit, trace middleware, routing and the services.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use backend::middleware::trace::TRACE_ID_HEADER;
use backend::server::build_app;
use rstest::rstest;
use serde_json::json;

use support::{
    MAX_HEADER_BYTES, as_caller, create_accounts, create_category, create_user, fresh_state,
    latest_records, post_record, send,
};

fn record(note: &str, category: u64, value: i64, kind: &str) -> serde_json::Value {
    json!({
        "note": note,
        "category": category,
        "amount": { "currency": "AED", "value": value },
        "date": "2021-01-01T22:08:41Z",
        "type": kind,
    })
}

#[actix_web::test]
async fn users_register_once_per_email() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let request = || {
        TestRequest::post()
            .uri("/api/v1/user")
            .set_json(json!({ "email": "jack@x.com" }))
    };

    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 1, "email": "jack@x.com" }));

    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "/api/v1/problems/USER_EMAIL_DUPLICATED");
}

#[actix_web::test]
async fn unknown_currencies_fail_account_validation() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let user = create_user(&app, "jack@x.com").await;

    let (status, body) = send(
        &app,
        as_caller(TestRequest::post().uri("/api/v1/accounts"), user).set_json(json!({
            "accounts": [{ "name": "Current", "currency": "XXX", "type": "Current" }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "/api/v1/problems/ACCOUNT_VALIDATION_FAILED");
    assert_eq!(body["detail"], "No such currency 'XXX'");
}

#[rstest]
#[case("INCOME", 10_000, 10_000, 0)]
#[case("EXPENSE", -10_000, 0, 10_000)]
#[actix_web::test]
async fn records_show_up_in_the_latest_month(
    #[case] kind: &str,
    #[case] stored: i64,
    #[case] income: i64,
    #[case] expenses: i64,
) {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let user = create_user(&app, "jack@x.com").await;
    let [account]: [u64; 1] = create_accounts(&app, user, &[("Current", "AED", "Current")])
        .await
        .try_into()
        .expect("one account");
    let category = create_category(&app, user, "Salary").await;

    let (status, body) = post_record(&app, user, account, record("Salary", category, 10_000, kind)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["account"]["balance"]["value"], stored);

    let page = latest_records(&app, user, account).await;
    assert_eq!(page["records"][0]["amount"]["value"], stored);
    assert_eq!(page["records"][0]["type"], kind);
    assert_eq!(page["summary"]["totalIncome"]["value"], income);
    assert_eq!(page["summary"]["totalExpenses"]["value"], expenses);
    assert_eq!(page["search"]["from"], "2021-01-01T00:00:00Z");
}

#[actix_web::test]
async fn transfers_move_money_between_accounts() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let user = create_user(&app, "jack@x.com").await;
    let [current, saving]: [u64; 2] = create_accounts(
        &app,
        user,
        &[("Current", "AED", "Current"), ("Rainy day", "AED", "Saving")],
    )
    .await
    .try_into()
    .expect("two accounts");
    let category = create_category(&app, user, "Savings").await;
    let mut transfer = record("Monthly saving", category, 10_000, "TRANSFER");
    transfer["beneficiary"] = json!(saving);

    let (status, body) = post_record(&app, user, current, transfer).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["record"]["beneficiary"]["id"], saving);

    let sender = latest_records(&app, user, current).await;
    assert_eq!(sender["records"][0]["amount"]["value"], -10_000);
    assert_eq!(sender["records"][0]["type"], "TRANSFER");
    assert_eq!(sender["records"][0]["beneficiary"]["id"], saving);
    assert_eq!(sender["summary"]["totalSavings"]["value"], 10_000);

    let receiver = latest_records(&app, user, saving).await;
    assert_eq!(receiver["records"][0]["amount"]["value"], 10_000);
    assert_eq!(receiver["records"][0]["type"], "TRANSFER");
    assert_eq!(
        receiver["records"][0]["transferReference"],
        sender["records"][0]["transferReference"]
    );
}

#[actix_web::test]
async fn foreign_categories_are_not_found() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let jack = create_user(&app, "jack@x.com").await;
    let jill = create_user(&app, "jill@x.com").await;
    let [account]: [u64; 1] = create_accounts(&app, jack, &[("Current", "AED", "Current")])
        .await
        .try_into()
        .expect("one account");
    let foreign = create_category(&app, jill, "Salary").await;

    let (status, body) = post_record(&app, jack, account, record("Salary", foreign, 10_000, "INCOME")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["type"], "/api/v1/problems/CATEGORIES_NOT_FOUND");

    let page = latest_records(&app, jack, account).await;
    assert_eq!(page["records"], json!([]));
}

#[actix_web::test]
async fn budgets_track_spending_in_the_current_month() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;
    let user = create_user(&app, "jack@x.com").await;
    let [account]: [u64; 1] = create_accounts(&app, user, &[("Current", "AED", "Current")])
        .await
        .try_into()
        .expect("one account");
    let groceries = create_category(&app, user, "Groceries").await;
    let (status, body) = send(
        &app,
        as_caller(TestRequest::post().uri("/api/v1/budgets"), user).set_json(json!({
            "accountIds": [account],
            "periodType": "MONTH",
            "categories": [{
                "categoryId": groceries,
                "maxLimit": { "currency": "AED", "value": 5_000 }
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let mut spend = record("Market", groceries, 7_500, "EXPENSE");
    spend["date"] = json!("2021-01-10T10:00:00Z");
    let (status, _) = post_record(&app, user, account, spend).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        as_caller(TestRequest::get().uri("/api/v1/budgets"), user),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let limit = &body["budgets"][0]["categories"][0];
    assert_eq!(limit["amountSpent"]["value"], 7_500);
    assert_eq!(limit["exceeded"], true);
}

#[actix_web::test]
async fn requests_without_a_caller_are_unauthorised() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/accounts")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["type"], "/api/v1/problems/SERVICE_REQUIRED_USER_ID");
}

#[actix_web::test]
async fn oversized_headers_are_refused_with_a_trace_id() {
    let app = test::init_service(build_app(fresh_state(), 256)).await;
    let request = TestRequest::get()
        .uri("/health")
        .insert_header(("x-padding", "a".repeat(512)))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
}

#[actix_web::test]
async fn health_reports_the_store() {
    let app = test::init_service(build_app(fresh_state(), MAX_HEADER_BYTES)).await;

    let (status, body) = send(&app, TestRequest::get().uri("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "database": "UP" }));
}
