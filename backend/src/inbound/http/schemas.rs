//! Wire types shared across endpoints, and OpenAPI-only schemas.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! DTOs here mirror them in the inbound adapter layer where serialisation
//! concerns belong.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AmountInput;
use crate::domain::{Error, Money};

/// A monetary amount in minor units, e.g. `{"currency":"AED","value":10000}`
/// for AED 100.00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MoneyDto {
    /// ISO-4217 code.
    #[schema(example = "AED")]
    pub currency: String,
    /// Signed minor units.
    #[schema(example = 10000)]
    pub value: i64,
}

impl From<MoneyDto> for AmountInput {
    fn from(value: MoneyDto) -> Self {
        Self {
            currency: value.currency,
            value: value.value,
        }
    }
}

impl TryFrom<Money> for MoneyDto {
    type Error = Error;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Ok(Self {
            currency: value.currency().code().to_owned(),
            value: value.minor_units()?,
        })
    }
}

/// OpenAPI schema for RFC 7807 problem documents.
///
/// Per-field diagnostics are added as extra string members named after the
/// offending request field.
#[derive(ToSchema)]
#[schema(as = Problem)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProblemSchema {
    /// `/api/v1/problems/<CODE>`.
    #[schema(rename = "type", example = "/api/v1/problems/ACCOUNT_NAME_DUPLICATED")]
    kind: String,
    /// Short title of the code.
    #[schema(example = "Account name already exists")]
    title: String,
    /// HTTP status.
    #[schema(example = 400)]
    status: u16,
    /// Human-readable explanation. Redacted for server failures.
    detail: String,
    /// Request path.
    #[schema(example = "/api/v1/accounts")]
    instance: Option<String>,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(rename = "traceId")]
    trace_id: Option<String>,
}
