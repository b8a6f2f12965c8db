//! Wire types for record endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{CreateRecordRequest, CreatedRecord, RecordSearch, RecordsPage};
use crate::domain::{AccountId, CategoryId, Error, ErrorCode, Record, RecordType};
use crate::inbound::http::accounts::AccountResponse;
use crate::inbound::http::schemas::MoneyDto;

/// Request body for `POST /api/v1/accounts/{accountId}/records`.
///
/// Example JSON:
/// `{"note":"Salary","category":1,"amount":{"currency":"AED","value":10000},
///   "date":"2021-01-01T22:08:41Z","type":"INCOME"}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateRecordBody {
    #[serde(default)]
    #[schema(example = "Salary")]
    pub note: String,
    /// Category id.
    #[schema(value_type = u64, example = 1)]
    pub category: CategoryId,
    pub amount: MoneyDto,
    /// RFC 3339 timestamp.
    #[schema(example = "2021-01-01T22:08:41Z")]
    pub date: String,
    /// `INCOME`, `EXPENSE` or `TRANSFER`.
    #[serde(rename = "type")]
    #[schema(example = "INCOME")]
    pub record_type: String,
    /// Receiving account id; transfers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u64>)]
    pub beneficiary: Option<AccountId>,
}

impl From<CreateRecordBody> for CreateRecordRequest {
    fn from(body: CreateRecordBody) -> Self {
        Self {
            note: body.note,
            category_id: body.category,
            amount: body.amount.into(),
            date: body.date,
            record_type: body.record_type,
            beneficiary_account_id: body.beneficiary,
        }
    }
}

/// Category reference inside a record.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecordCategoryResponse {
    pub id: u64,
    pub name: String,
}

/// Receiving account of a transfer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BeneficiaryResponse {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

/// A record as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: u64,
    pub note: String,
    pub category: RecordCategoryResponse,
    pub amount: MoneyDto,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub record_type: String,
    /// Reference shared by both halves of a transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_reference: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary: Option<BeneficiaryResponse>,
}

impl TryFrom<&Record> for RecordResponse {
    type Error = Error;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let transfer = record.transfer();
        Ok(Self {
            id: record.id().get(),
            note: record.note().to_owned(),
            category: RecordCategoryResponse {
                id: record.category().id.get(),
                name: record.category().name.clone(),
            },
            amount: MoneyDto::try_from(record.amount())?,
            date: record.date(),
            record_type: record.record_type().to_string(),
            transfer_reference: transfer.map(|link| link.reference),
            beneficiary: transfer.map(|link| BeneficiaryResponse {
                id: link.beneficiary.id.get(),
                name: link.beneficiary.name.clone(),
                account_type: link.beneficiary.account_type.to_string(),
            }),
        })
    }
}

/// Response of record creation: the sender-side record and the account's
/// new balance.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatedRecordResponse {
    pub record: RecordResponse,
    pub account: AccountResponse,
}

impl TryFrom<&CreatedRecord> for CreatedRecordResponse {
    type Error = Error;

    fn try_from(created: &CreatedRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            record: RecordResponse::try_from(&created.record)?,
            account: AccountResponse::try_from(&created.account)?,
        })
    }
}

/// Totals over a listing.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_expenses: MoneyDto,
    pub total_income: MoneyDto,
    pub total_savings: MoneyDto,
}

/// Date range a listing covers.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SearchRangeResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Records of one account with their totals.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecordsPageResponse {
    pub records: Vec<RecordResponse>,
    pub summary: SummaryResponse,
    pub search: SearchRangeResponse,
}

impl TryFrom<&RecordsPage> for RecordsPageResponse {
    type Error = Error;

    fn try_from(page: &RecordsPage) -> Result<Self, Self::Error> {
        let records = page
            .records
            .as_slice()
            .iter()
            .map(RecordResponse::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            records,
            summary: SummaryResponse {
                total_expenses: MoneyDto::try_from(page.summary.total_expenses)?,
                total_income: MoneyDto::try_from(page.summary.total_income)?,
                total_savings: MoneyDto::try_from(page.summary.total_savings)?,
            },
            search: SearchRangeResponse {
                from: page.from,
                to: page.to,
            },
        })
    }
}

/// Query string of `GET /api/v1/accounts/{accountId}/records`.
///
/// `latest` selects the calendar month of the newest record and ignores
/// every other parameter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordsParams {
    /// Present (with any value) to list the latest month.
    pub latest: Option<String>,
    /// Inclusive lower bound, RFC 3339. Defaults to the start of the
    /// current month.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound, RFC 3339. Defaults to now.
    pub to: Option<DateTime<Utc>>,
    /// Comma-separated category names.
    pub categories: Option<String>,
    /// Comma-separated record types.
    pub types: Option<String>,
    /// Keywords every note must contain.
    pub term: Option<String>,
}

fn comma_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

impl RecordsParams {
    /// Whether the latest month was asked for.
    pub fn wants_latest(&self) -> bool {
        self.latest.is_some()
    }

    /// Search criteria described by the parameters.
    ///
    /// # Errors
    ///
    /// `REQUEST_UNMARSHALLING_FAILED` for an unknown record type.
    pub fn to_search(&self) -> Result<RecordSearch, Error> {
        let types = comma_list(self.types.as_deref())
            .map(|raw| {
                raw.parse::<RecordType>()
                    .map_err(|err| err.recode(ErrorCode::RequestUnmarshallingFailed))
            })
            .collect::<Result<_, _>>()?;
        Ok(RecordSearch {
            from: self.from,
            to: self.to,
            categories: comma_list(self.categories.as_deref())
                .map(str::to_owned)
                .collect(),
            types,
            term: self
                .term
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_owned),
        })
    }
}
