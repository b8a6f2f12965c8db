//! Error types for the budget-fixtures crate.
//!
//! Registry parsing and data generation fail with separate `thiserror`
//! enums so callers can tell a broken file from a broken seed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing or querying a seed registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read registry file at '{path}': {message}")]
    IoError {
        /// Path to the registry file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The registry JSON is malformed or missing required fields.
    #[error("invalid registry JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The registry version is not supported.
    #[error("unsupported registry version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the registry.
        actual: u32,
    },

    /// The registry lists no currencies to draw from.
    #[error("registry contains no currencies")]
    EmptyCurrencies,

    /// A currency is not a three-letter upper-case code.
    #[error("invalid currency code at index {index}: {value}")]
    InvalidCurrency {
        /// Index of the invalid code in the array.
        index: usize,
        /// The invalid code.
        value: String,
    },

    /// Too few category names to give every user its minimum.
    #[error("registry needs at least {required} category names, found {actual}")]
    TooFewCategoryNames {
        /// Minimum number of names.
        required: usize,
        /// Names present.
        actual: usize,
    },

    /// A category name is outside the backend's name limits.
    #[error("invalid category name at index {index}: {value}")]
    InvalidCategoryName {
        /// Index of the invalid name in the array.
        index: usize,
        /// The invalid name.
        value: String,
    },

    /// Two category names collide once case is ignored.
    #[error("duplicate category name: {value}")]
    DuplicateCategoryName {
        /// The second occurrence.
        value: String,
    },

    /// The registry contains no seed definitions.
    #[error("registry contains no seed definitions")]
    EmptySeeds,

    /// A seed's `startMonth` is not a `YYYY-MM` month.
    #[error("seed '{seed}' has invalid start month '{value}'")]
    InvalidStartMonth {
        /// Seed name.
        seed: String,
        /// The rejected value.
        value: String,
    },

    /// The requested seed name was not found in the registry.
    #[error("seed '{name}' not found in registry")]
    SeedNotFound {
        /// The seed name that was not found.
        name: String,
    },
}

/// Errors that can occur during data generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Failed to generate a usable person name after maximum retries.
    #[error("failed to generate a valid name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },

    /// The seed asks for no simulated months.
    #[error("seed '{seed}' simulates no months")]
    NoMonths {
        /// Seed name.
        seed: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        RegistryError::IoError {
            path: PathBuf::from("/tmp/seeds.json"),
            message: "file not found".to_owned(),
        },
        "failed to read registry file at '/tmp/seeds.json': file not found"
    )]
    #[case(
        RegistryError::UnsupportedVersion { expected: 1, actual: 2 },
        "unsupported registry version: expected 1, found 2"
    )]
    #[case(
        RegistryError::InvalidCurrency { index: 1, value: "usd".to_owned() },
        "invalid currency code at index 1: usd"
    )]
    #[case(
        RegistryError::TooFewCategoryNames { required: 3, actual: 2 },
        "registry needs at least 3 category names, found 2"
    )]
    #[case(
        RegistryError::InvalidStartMonth { seed: "lean-month".to_owned(), value: "2021-13".to_owned() },
        "seed 'lean-month' has invalid start month '2021-13'"
    )]
    #[case(
        RegistryError::SeedNotFound { name: "lean-month".to_owned() },
        "seed 'lean-month' not found in registry"
    )]
    fn registry_errors_format(#[case] err: RegistryError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn generation_error_formats() {
        let err = GenerationError::NameGenerationFailed { max_attempts: 100 };
        assert_eq!(
            err.to_string(),
            "failed to generate a valid name after 100 attempts"
        );
    }
}
