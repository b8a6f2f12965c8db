//! Translation of pool and Diesel failures into [`StoreError`].

use std::sync::OnceLock;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use regex::Regex;
use tracing::debug;

use crate::domain::ports::{DuplicateKey, StoreError};

use super::pool::PoolError;

static KEY_DETAIL_RE: OnceLock<Regex> = OnceLock::new();

fn key_detail_regex() -> &'static Regex {
    KEY_DETAIL_RE.get_or_init(|| {
        // PostgreSQL reports unique violations as `Key (a, b)=(x, y) already exists.`
        let pattern = r"^Key \((?P<columns>[^)]*)\)=\((?P<values>.*)\) already exists";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("key detail regex failed to compile: {error}"))
    })
}

/// Map pool errors to store connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to store errors, keeping unique violations distinct.
pub(crate) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::duplicate(duplicate_key(
                info.constraint_name().unwrap_or_default(),
                info.details(),
            ))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            StoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => StoreError::query(info.message()),
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => StoreError::query("database query error"),
        other => StoreError::query(other.to_string()),
    }
}

/// Build a [`DuplicateKey`] from a constraint name and PostgreSQL's detail
/// line. Column values stay unset when the detail is missing or does not
/// parse.
pub(crate) fn duplicate_key(constraint: &str, detail: Option<&str>) -> DuplicateKey {
    let key = DuplicateKey::new(constraint);
    let Some(captures) = detail.and_then(|detail| key_detail_regex().captures(detail)) else {
        return key;
    };
    let columns: Vec<&str> = captures["columns"].split(", ").collect();
    let values: Vec<&str> = captures["values"].splitn(columns.len(), ", ").collect();
    if columns.len() != values.len() {
        return key;
    }
    columns
        .into_iter()
        .zip(values)
        .fold(key, |key, (column, value)| key.with_column(column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_composite_keys() {
        let key = duplicate_key(
            "accounts_user_id_name_key",
            Some("Key (user_id, name)=(1, Current) already exists."),
        );

        assert_eq!(key.constraint(), "accounts_user_id_name_key");
        assert_eq!(key.value("user_id"), Some("1"));
        assert_eq!(key.value("name"), Some("Current"));
    }

    #[rstest]
    fn the_last_value_keeps_embedded_separators() {
        let key = duplicate_key(
            "categories_user_id_name_key",
            Some("Key (user_id, name)=(7, Bills, Rent) already exists."),
        );

        assert_eq!(key.value("name"), Some("Bills, Rent"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Failing row contains (1)."))]
    fn unparsed_details_keep_the_constraint(#[case] detail: Option<&str>) {
        let key = duplicate_key("users_email_key", detail);

        assert_eq!(key, DuplicateKey::new("users_email_key"));
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(err.is_connection());
        assert!(err.to_string().contains("timed out"));
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        assert!(map_diesel_error(DieselError::NotFound).is_query());
    }
}
