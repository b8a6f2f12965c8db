//! Tests for error codes, kinds, and field diagnostics.

use super::*;
use std::error::Error as _;
use rstest::{fixture, rstest};

#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
struct ConnectionReset;

#[fixture]
fn account_error() -> Error {
    Error::account_validation("No such currency 'XXX'")
}

#[rstest]
fn codes_are_dense_from_one_thousand() {
    for (offset, code) in ErrorCode::ALL.iter().enumerate() {
        let expected = 1000 + u16::try_from(offset).expect("fits in u16");
        assert_eq!(code.as_u16(), expected, "{code} is out of sequence");
    }
    assert_eq!(ErrorCode::ALL.len(), 25);
}

#[rstest]
#[case(ErrorCode::Unknown, 1000, "UNKNOWN")]
#[case(ErrorCode::DatabaseState, 1002, "DATABASE_STATE")]
#[case(ErrorCode::CategoriesNotFound, 1013, "CATEGORIES_NOT_FOUND")]
#[case(ErrorCode::AuditUpdatedByBadFormat, 1020, "AUDIT_UPDATED_BY_BAD_FORMAT")]
#[case(ErrorCode::ServiceRequiredUserId, 1022, "SERVICE_REQUIRED_USER_ID")]
#[case(ErrorCode::BudgetValidationFailed, 1024, "BUDGET_VALIDATION_FAILED")]
fn codes_keep_their_wire_identity(
    #[case] code: ErrorCode,
    #[case] value: u16,
    #[case] name: &str,
) {
    assert_eq!(code.as_u16(), value);
    assert_eq!(code.as_str(), name);
    assert_eq!(ErrorCode::from_u16(value), Some(code));
    assert_eq!(name.parse::<ErrorCode>(), Ok(code));
}

#[rstest]
fn unknown_names_and_values_are_rejected() {
    assert_eq!(ErrorCode::from_u16(999), None);
    assert_eq!(ErrorCode::from_u16(1025), None);
    assert_eq!(
        "NOT_A_CODE".parse::<ErrorCode>(),
        Err(UnknownErrorCode("NOT_A_CODE".to_owned()))
    );
}

#[rstest]
fn validation_constructor_sets_code_and_kind(account_error: Error) {
    assert_eq!(account_error.code(), ErrorCode::AccountValidationFailed);
    assert!(account_error.is_validation());
    assert_eq!(account_error.detail(), "No such currency 'XXX'");
    assert_eq!(
        account_error.to_string(),
        "ACCOUNT_VALIDATION_FAILED: No such currency 'XXX'"
    );
}

#[rstest]
#[case(Error::database_state("boom"), ErrorCode::DatabaseState)]
#[case(Error::database_connectivity("boom"), ErrorCode::DatabaseConnectivity)]
#[case(Error::amount_overflow("boom"), ErrorCode::AmountOverflow)]
#[case(Error::unknown("boom"), ErrorCode::Unknown)]
fn system_constructors_are_not_validation(#[case] err: Error, #[case] code: ErrorCode) {
    assert!(!err.is_validation());
    assert_eq!(err.code(), code);
}

#[rstest]
fn fields_accumulate(account_error: Error) {
    let err = account_error
        .with_field("currency", "No such currency 'XXX'")
        .with_field("name", "must not be empty");

    assert_eq!(err.fields().len(), 2);
    assert_eq!(
        err.fields().get("name").map(String::as_str),
        Some("must not be empty")
    );
}

#[rstest]
fn recode_keeps_detail_and_fields() {
    let err = Error::currency_invalid_code("No such currency 'XXX'")
        .with_field("currency", "unknown")
        .recode(ErrorCode::AccountValidationFailed);

    assert_eq!(err.code(), ErrorCode::AccountValidationFailed);
    assert_eq!(err.detail(), "No such currency 'XXX'");
    assert_eq!(err.fields().get("currency").map(String::as_str), Some("unknown"));
}

#[rstest]
fn recode_leaves_system_errors_alone() {
    let err = Error::database_state("boom").recode(ErrorCode::AccountValidationFailed);
    assert_eq!(err.code(), ErrorCode::DatabaseState);
}

#[rstest]
fn system_errors_expose_their_cause_chain() {
    let err = Error::database_connectivity("pool checkout failed").with_cause(ConnectionReset);

    let source = err.source().expect("system errors keep their cause");
    assert_eq!(source.to_string(), "connection reset by peer");
    assert_eq!(err.to_string(), "DATABASE_CONNECTIVITY: pool checkout failed");
}

#[rstest]
fn validation_errors_ignore_causes(account_error: Error) {
    let err = account_error.with_cause(ConnectionReset);
    assert!(err.source().is_none());
}
