//! Records API handlers.
//!
//! ```text
//! POST /api/v1/accounts/{accountId}/records
//! GET /api/v1/accounts/{accountId}/records?latest
//! GET /api/v1/accounts/{accountId}/records?from=...&to=...&categories=Food&types=EXPENSE&term=coffee
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::AccountId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::records_dto::{
    CreateRecordBody, CreatedRecordResponse, RecordsPageResponse, RecordsParams,
};
use crate::inbound::http::schemas::ProblemSchema;
use crate::inbound::http::state::HttpState;

/// Record an income, expense or transfer on an account.
///
/// Transfers also record the receiving half on the beneficiary account.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{accountId}/records",
    params(("accountId" = u64, Path, description = "Owning account")),
    request_body = CreateRecordBody,
    responses(
        (status = 201, description = "Record created", body = CreatedRecordResponse),
        (status = 400, description = "Invalid record", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 404, description = "Unknown account or category", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["records"],
    operation_id = "createRecord"
)]
#[post("/accounts/{account_id}/records")]
pub async fn create_record(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<AccountId>,
    payload: web::Json<CreateRecordBody>,
) -> ApiResult<HttpResponse> {
    let ctx = caller.context().with_account(path.into_inner());
    let created = state
        .within(state.records.create_record(ctx, payload.into_inner().into()))
        .await?;
    Ok(HttpResponse::Created().json(CreatedRecordResponse::try_from(&created)?))
}

/// List an account's records, either the latest month or a search.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{accountId}/records",
    params(("accountId" = u64, Path, description = "Owning account"), RecordsParams),
    responses(
        (status = 200, description = "Records with totals", body = RecordsPageResponse),
        (status = 400, description = "Malformed search", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 404, description = "Unknown account", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["records"],
    operation_id = "listRecords"
)]
#[get("/accounts/{account_id}/records")]
pub async fn list_records(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<AccountId>,
    params: web::Query<RecordsParams>,
) -> ApiResult<web::Json<RecordsPageResponse>> {
    let ctx = caller.context().with_account(path.into_inner());
    let page = if params.wants_latest() {
        state.within(state.records_query.latest_records(ctx)).await?
    } else {
        let search = params.to_search()?;
        state
            .within(state.records_query.search_records(ctx, search))
            .await?
    };
    Ok(web::Json(RecordsPageResponse::try_from(&page)?))
}
