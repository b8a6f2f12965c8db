//! Tests for user registration.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::DuplicateKey;
use crate::outbound::memory::MemoryStore;
use crate::test_support::fixture_clock;

struct Harness {
    store: MemoryStore,
    service: UserService<MemoryStore>,
}

#[fixture]
fn harness() -> Harness {
    let store = MemoryStore::new();
    let service = UserService::new(Arc::new(store.clone()), fixture_clock());
    Harness { store, service }
}

fn request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn registers_a_user_with_the_first_id(harness: Harness) {
    let user = harness
        .service
        .create_user(request("jack@x.com"))
        .await
        .expect("user created");

    assert_eq!(user.id().get(), 1);
    assert_eq!(user.email().as_ref(), "jack@x.com");
    assert_eq!(user.audit().created_by(), UpdatedBy::user(user.id()));
    assert_eq!(user.audit().version(), 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_are_rejected(harness: Harness) {
    harness
        .service
        .create_user(request("jack@x.com"))
        .await
        .expect("first user");

    let err = harness
        .service
        .create_user(request("jack@x.com"))
        .await
        .expect_err("duplicate email");

    assert_eq!(err.code(), ErrorCode::UserEmailDuplicated);
    assert!(err.fields().contains_key("email"));
}

#[rstest]
#[case::bare_email_constraint(DuplicateKey::new("users_email_key"), ErrorCode::UserEmailDuplicated)]
#[case::email_column(
    DuplicateKey::new("users_lower_email_idx").with_column("email", "jack@x.com"),
    ErrorCode::UserEmailDuplicated
)]
#[case::primary_key(DuplicateKey::new("users_pkey"), ErrorCode::UserIdDuplicated)]
fn duplicate_keys_map_by_constraint(#[case] key: DuplicateKey, #[case] expected: ErrorCode) {
    let audit = AuditInfo::make_for_creation(UpdatedBy::ZERO, fixture_clock().utc());
    let user = User::new(UserId::new(1).expect("valid id"), "jack@x.com", audit)
        .expect("valid user");

    let err = duplicate_user(StoreError::duplicate(key), &user);

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case("")]
#[case("not-an-address")]
#[case("jack@")]
#[tokio::test]
async fn malformed_emails_write_nothing(harness: Harness, #[case] email: &str) {
    let err = harness
        .service
        .create_user(request(email))
        .await
        .expect_err("invalid email");
    assert_eq!(err.code(), ErrorCode::UserEmailInvalid);

    let mut tx = harness.store.begin().await.expect("begin");
    let found = tx
        .find_user(UserId::new(1).expect("valid id"))
        .await
        .expect("query");
    assert!(found.is_none());
}

#[rstest]
#[tokio::test]
async fn commit_failures_surface_as_system_errors(harness: Harness) {
    harness.store.fail_commits(true);

    let err = harness
        .service
        .create_user(request("jack@x.com"))
        .await
        .expect_err("commit fails");

    assert_eq!(err.code(), ErrorCode::DatabaseConnectivity);
    assert!(!err.is_validation());
}

#[rstest]
#[tokio::test]
async fn write_failures_map_to_database_state(harness: Harness) {
    harness.store.fail_writes_after(0);

    let err = harness
        .service
        .create_user(request("jack@x.com"))
        .await
        .expect_err("write fails");

    assert_eq!(err.code(), ErrorCode::DatabaseState);
}
