//! Example data replayed through the services and read back over HTTP.

#[expect(
    dead_code,
    reason = "Shared helpers include functions used only by other integration suites."
)]
mod support;

use std::path::Path;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use backend::example_data::{ExampleDataSeeder, SeedingResult};
use backend::server::build_app;
use budget_fixtures::{SeedRegistry, generate_example_users};

use support::{MAX_HEADER_BYTES, as_caller, fresh_state, send};

const REGISTRY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/example-data/seeds.json");

#[actix_web::test]
async fn seeded_users_are_served_over_http() {
    let registry = SeedRegistry::from_file(Path::new(REGISTRY)).expect("shipped registry");
    let seed = registry.find_seed("quiet-ledger").expect("quiet-ledger seed");
    let users = generate_example_users(&registry, seed).expect("generated users");
    let state = fresh_state();

    let outcome = ExampleDataSeeder::from_state(&state)
        .seed(seed.name(), &users)
        .await
        .expect("seeded");
    assert_eq!(outcome.result, SeedingResult::Applied);
    assert_eq!(outcome.user_count, 1);

    let app = test::init_service(build_app(state, MAX_HEADER_BYTES)).await;
    let (status, body) = send(&app, as_caller(TestRequest::get().uri("/api/v1/accounts"), 1)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let accounts = body["accounts"].as_array().expect("accounts");
    assert_eq!(accounts.len(), 2);

    let current = accounts
        .iter()
        .find(|account| account["type"] == "Current")
        .and_then(|account| account["id"].as_u64())
        .expect("current account");
    let (status, page) = send(
        &app,
        as_caller(
            TestRequest::get().uri(&format!("/api/v1/accounts/{current}/records?latest")),
            1,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["search"]["from"], "2020-12-01T00:00:00Z");
    assert!(page["summary"]["totalIncome"]["value"].as_i64() > Some(0));
    assert!(page["summary"]["totalSavings"]["value"].as_i64() > Some(0));
}

#[actix_web::test]
async fn replaying_a_seed_twice_changes_nothing() {
    let registry = SeedRegistry::from_file(Path::new(REGISTRY)).expect("shipped registry");
    let seed = registry.find_seed("desert-fox").expect("desert-fox seed");
    let users = generate_example_users(&registry, seed).expect("generated users");
    let seeder = ExampleDataSeeder::from_state(&fresh_state());

    let first = seeder.seed(seed.name(), &users).await.expect("first run");
    let second = seeder.seed(seed.name(), &users).await.expect("second run");

    assert_eq!(first.user_count, users.len());
    assert_eq!(second.result, SeedingResult::AlreadySeeded);
}
