//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! problem documents; the domain only decides whether a failure is the
//! caller's fault ([`Error::Validation`]) or the system's
//! ([`Error::System`]).
//!
//! Codes form a dense, stable enumeration starting at 1000. Their names are
//! part of the wire contract, so variants are only ever appended.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

macro_rules! error_codes {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident = $value:literal => $name:literal, $title:literal;
        )+
    ) => {
        /// Stable machine-readable error code describing the failure category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum ErrorCode {
            $(
                $(#[$meta])*
                $variant = $value,
            )+
        }

        impl ErrorCode {
            /// Every code in ascending numeric order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Wire name, e.g. `ACCOUNT_VALIDATION_FAILED`.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Short human title used for problem documents.
            #[must_use]
            pub const fn title(self) -> &'static str {
                match self {
                    $(Self::$variant => $title,)+
                }
            }
        }
    };
}

error_codes! {
    /// Failure with no better classification.
    Unknown = 1000 => "UNKNOWN", "Unknown error";
    /// The store could not be reached or the deadline elapsed.
    DatabaseConnectivity = 1001 => "DATABASE_CONNECTIVITY", "Database connectivity failure";
    /// The store rejected an operation or returned inconsistent state.
    DatabaseState = 1002 => "DATABASE_STATE", "Database state failure";
    /// A user id collided with an existing row.
    UserIdDuplicated = 1003 => "USER_ID_DUPLICATED", "User id already exists";
    /// The email address could not be parsed.
    UserEmailInvalid = 1004 => "USER_EMAIL_INVALID", "User email is invalid";
    /// The email address belongs to another user.
    UserEmailDuplicated = 1005 => "USER_EMAIL_DUPLICATED", "User email already exists";
    /// No user matched the lookup.
    UserNotFound = 1006 => "USER_NOT_FOUND", "User not found";
    /// Account fields failed validation.
    AccountValidationFailed = 1007 => "ACCOUNT_VALIDATION_FAILED", "Account validation failed";
    /// No account matched the lookup for the caller.
    AccountNotFound = 1008 => "ACCOUNT_NOT_FOUND", "Account not found";
    /// The caller already owns an account with this name.
    AccountNameDuplicated = 1009 => "ACCOUNT_NAME_DUPLICATED", "Account name already exists";
    /// The currency code is not an ISO-4217 currency.
    CurrencyInvalidCode = 1010 => "CURRENCY_INVALID_CODE", "Currency code is invalid";
    /// Category fields failed validation.
    CategoryValidationFailed = 1011 => "CATEGORY_VALIDATION_FAILED", "Category validation failed";
    /// The caller already owns a category with this name.
    CategoryNameDuplicated = 1012 => "CATEGORY_NAME_DUPLICATED", "Category name already exists";
    /// No category matched the lookup for the caller.
    CategoriesNotFound = 1013 => "CATEGORIES_NOT_FOUND", "Categories not found";
    /// Record fields failed validation.
    RecordValidationFailed = 1014 => "RECORD_VALIDATION_FAILED", "Record validation failed";
    /// A period was requested over no records.
    RecordsPeriodOfEmptySet = 1015 => "RECORDS_PERIOD_OF_EMPTY_SET", "Period of an empty record set";
    /// An arithmetic result no longer fits in 64 bits.
    AmountOverflow = 1016 => "AMOUNT_OVERFLOW", "Amount overflow";
    /// Two amounts with different currencies were combined.
    AmountMismatchingCurrencies = 1017 => "AMOUNT_MISMATCHING_CURRENCIES", "Amounts have mismatching currencies";
    /// A total was requested over no records.
    AmountTotalOfEmptySet = 1018 => "AMOUNT_TOTAL_OF_EMPTY_SET", "Total of an empty record set";
    /// Audit fields failed validation.
    AuditValidationFailed = 1019 => "AUDIT_VALIDATION_FAILED", "Audit validation failed";
    /// An audit principal could not be parsed.
    AuditUpdatedByBadFormat = 1020 => "AUDIT_UPDATED_BY_BAD_FORMAT", "Audit principal has a bad format";
    /// The request body or parameters could not be decoded.
    RequestUnmarshallingFailed = 1021 => "REQUEST_UNMARSHALLING_FAILED", "Request could not be decoded";
    /// The caller identity is missing.
    ServiceRequiredUserId = 1022 => "SERVICE_REQUIRED_USER_ID", "Caller identity required";
    /// The owning account id is missing.
    ServiceRequiredAccountId = 1023 => "SERVICE_REQUIRED_ACCOUNT_ID", "Account id required";
    /// Budget fields failed validation.
    BudgetValidationFailed = 1024 => "BUDGET_VALIDATION_FAILED", "Budget validation failed";
}

impl ErrorCode {
    /// Numeric value of the code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Look a code up by its numeric value.
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_u16() == value)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not the wire name of any [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

/// Code, detail, and per-field diagnostics shared by both error kinds.
///
/// # Examples
/// ```
/// use backend::domain::{ErrorCode, Problem};
///
/// let problem = Problem::new(ErrorCode::AccountValidationFailed, "bad name")
///     .with_field("name", "must not be empty");
/// assert_eq!(problem.fields().get("name").map(String::as_str), Some("must not be empty"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    code: ErrorCode,
    detail: String,
    fields: BTreeMap<String, String>,
}

impl Problem {
    /// Create a problem with no field diagnostics.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a diagnostic for a single request field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.insert(field.into(), message.into());
        self
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human title derived from the code.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.code.title()
    }

    /// Human-readable detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Per-field diagnostics keyed by request field name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

/// Underlying cause retained on system failures.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Infrastructure failure with an optional cause chain.
#[derive(Debug, Clone)]
pub struct SystemFailure {
    problem: Problem,
    cause: Option<Cause>,
}

impl SystemFailure {
    /// The code, detail, and fields of the failure.
    #[must_use]
    pub const fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// Domain error.
///
/// Validation errors never mutate state and map to 4xx responses. System
/// errors map to 500 and keep their cause for logging.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::record_validation("amount must not be zero").with_field("amount", "zero");
/// assert_eq!(err.code(), ErrorCode::RecordValidationFailed);
/// assert!(err.is_validation());
/// ```
#[expect(
    clippy::error_impl_error,
    reason = "the domain error is referred to as domain::Error throughout the crate"
)]
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The caller's input or ownership is wrong.
    #[error("{0}")]
    Validation(Problem),
    /// The store or other infrastructure failed.
    #[error(transparent)]
    System(SystemFailure),
}

impl StdError for SystemFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl fmt::Display for SystemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.problem.fmt(f)
    }
}

impl Error {
    /// Build a validation error for the given code.
    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation(Problem::new(code, detail))
    }

    /// Build a system error for the given code.
    pub fn system(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::System(SystemFailure {
            problem: Problem::new(code, detail),
            cause: None,
        })
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.problem().code()
    }

    /// Human-readable detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.problem().detail()
    }

    /// Per-field diagnostics.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        self.problem().fields()
    }

    /// Code, detail, and fields regardless of kind.
    #[must_use]
    pub const fn problem(&self) -> &Problem {
        match self {
            Self::Validation(problem) => problem,
            Self::System(failure) => &failure.problem,
        }
    }

    /// Whether the failure is attributable to the caller.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Attach a field diagnostic.
    #[must_use]
    pub fn with_field(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        match self {
            Self::Validation(problem) => Self::Validation(problem.with_field(field, message)),
            Self::System(SystemFailure { problem, cause }) => Self::System(SystemFailure {
                problem: problem.with_field(field, message),
                cause,
            }),
        }
    }

    /// Attach the underlying cause to a system error.
    ///
    /// Validation errors carry no cause; the call leaves them unchanged.
    #[must_use]
    pub fn with_cause(self, cause: impl StdError + Send + Sync + 'static) -> Self {
        match self {
            Self::System(SystemFailure { problem, .. }) => Self::System(SystemFailure {
                problem,
                cause: Some(Arc::new(cause)),
            }),
            validation @ Self::Validation(_) => validation,
        }
    }

    /// Re-label a validation error with an aggregate-level code, keeping its
    /// detail and fields. System errors pass through untouched.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Error, ErrorCode};
    ///
    /// let err = Error::currency_invalid_code("No such currency 'XXX'")
    ///     .recode(ErrorCode::AccountValidationFailed);
    /// assert_eq!(err.code(), ErrorCode::AccountValidationFailed);
    /// assert_eq!(err.detail(), "No such currency 'XXX'");
    /// ```
    #[must_use]
    pub fn recode(self, code: ErrorCode) -> Self {
        match self {
            Self::Validation(problem) => Self::Validation(Problem { code, ..problem }),
            system @ Self::System(_) => system,
        }
    }
}

macro_rules! constructors {
    ($kind:ident: $($fn_name:ident => $code:ident),+ $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("Convenience constructor for [`ErrorCode::", stringify!($code), "`].")]
                pub fn $fn_name(detail: impl Into<String>) -> Self {
                    Self::$kind(ErrorCode::$code, detail)
                }
            )+
        }
    };
}

constructors! {
    validation:
    user_id_duplicated => UserIdDuplicated,
    user_email_invalid => UserEmailInvalid,
    user_email_duplicated => UserEmailDuplicated,
    user_not_found => UserNotFound,
    account_validation => AccountValidationFailed,
    account_not_found => AccountNotFound,
    account_name_duplicated => AccountNameDuplicated,
    currency_invalid_code => CurrencyInvalidCode,
    category_validation => CategoryValidationFailed,
    category_name_duplicated => CategoryNameDuplicated,
    categories_not_found => CategoriesNotFound,
    record_validation => RecordValidationFailed,
    records_period_of_empty_set => RecordsPeriodOfEmptySet,
    amount_mismatching_currencies => AmountMismatchingCurrencies,
    amount_total_of_empty_set => AmountTotalOfEmptySet,
    audit_validation => AuditValidationFailed,
    audit_updated_by_bad_format => AuditUpdatedByBadFormat,
    request_unmarshalling => RequestUnmarshallingFailed,
    service_required_user_id => ServiceRequiredUserId,
    service_required_account_id => ServiceRequiredAccountId,
    budget_validation => BudgetValidationFailed,
}

constructors! {
    system:
    unknown => Unknown,
    database_connectivity => DatabaseConnectivity,
    database_state => DatabaseState,
    amount_overflow => AmountOverflow,
}

#[cfg(test)]
mod tests;
