//! Driving port for listing records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Account, Error, RecordType, Records, RecordsSummary, RequestContext};

/// Optional search criteria; absent bounds default to the current month
/// up to now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSearch {
    /// Inclusive lower date bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper date bound.
    pub to: Option<DateTime<Utc>>,
    /// Category names to keep.
    pub categories: Vec<String>,
    /// Record types to keep.
    pub types: Vec<RecordType>,
    /// Space-separated keywords every note must contain.
    pub term: Option<String>,
}

/// Records of one account with their summary and the searched range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsPage {
    /// Owning account.
    pub account: Account,
    /// Matching records, date ascending.
    pub records: Records,
    /// Totals over `records`.
    pub summary: RecordsSummary,
    /// Inclusive lower bound searched.
    pub from: DateTime<Utc>,
    /// Exclusive upper bound searched.
    pub to: DateTime<Utc>,
}

/// Reads records of the context's account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsQuery: Send + Sync {
    /// Records of the calendar month holding the newest record.
    ///
    /// # Errors
    ///
    /// `SERVICE_REQUIRED_USER_ID`, `SERVICE_REQUIRED_ACCOUNT_ID`,
    /// `ACCOUNT_NOT_FOUND`, or a system error.
    async fn latest_records(&self, ctx: RequestContext) -> Result<RecordsPage, Error>;

    /// Records matching `search`.
    ///
    /// # Errors
    ///
    /// As [`RecordsQuery::latest_records`], plus `REQUEST_UNMARSHALLING_FAILED`
    /// when `from` is after `to`.
    async fn search_records(
        &self,
        ctx: RequestContext,
        search: RecordSearch,
    ) -> Result<RecordsPage, Error>;
}
