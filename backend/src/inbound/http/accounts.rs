//! Accounts API handlers.
//!
//! ```text
//! POST /api/v1/accounts {"accounts":[{"name":"Current","currency":"AED","type":"Current"}]}
//! GET /api/v1/accounts
//! PUT /api/v1/accounts/{accountId} {"name":"Daily","expectedVersion":1}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{NewAccount, UpdateAccountRequest};
use crate::domain::{Account, AccountBalance, AccountId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::schemas::{MoneyDto, ProblemSchema};
use crate::inbound::http::state::HttpState;

/// One account in a creation request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewAccountBody {
    #[schema(example = "Current")]
    pub name: String,
    #[schema(example = "AED")]
    pub currency: String,
    /// `Current` or `Saving`.
    #[serde(rename = "type")]
    #[schema(example = "Current")]
    pub account_type: String,
}

/// Request body for `POST /api/v1/accounts`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateAccountsBody {
    pub accounts: Vec<NewAccountBody>,
}

/// Request body for `PUT /api/v1/accounts/{accountId}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountBody {
    pub name: String,
    /// Version last read by the caller.
    pub expected_version: u32,
}

/// An account as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency: String,
    /// Sum of every record of the account; listed accounts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<MoneyDto>,
    pub version: u32,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().get(),
            name: account.name().to_owned(),
            account_type: account.account_type().to_string(),
            currency: account.currency().code().to_owned(),
            balance: None,
            version: account.audit().version(),
        }
    }
}

impl TryFrom<&AccountBalance> for AccountResponse {
    type Error = Error;

    fn try_from(value: &AccountBalance) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: Some(MoneyDto::try_from(value.balance)?),
            ..Self::from(&value.account)
        })
    }
}

/// A list of accounts.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountResponse>,
}

/// Create accounts for the caller in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountsBody,
    responses(
        (status = 201, description = "Accounts created", body = AccountsResponse),
        (status = 400, description = "Invalid or duplicated account", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["accounts"],
    operation_id = "createAccounts"
)]
#[post("/accounts")]
pub async fn create_accounts(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateAccountsBody>,
) -> ApiResult<HttpResponse> {
    let accounts = payload
        .into_inner()
        .accounts
        .into_iter()
        .map(|body| NewAccount {
            name: body.name,
            currency: body.currency,
            account_type: body.account_type,
        })
        .collect();
    let created = state
        .within(state.accounts.create_accounts(caller.context(), accounts))
        .await?;
    Ok(HttpResponse::Created().json(AccountsResponse {
        accounts: created.iter().map(AccountResponse::from).collect(),
    }))
}

/// List the caller's accounts with their balances.
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts", body = AccountsResponse),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["accounts"],
    operation_id = "listAccounts"
)]
#[get("/accounts")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<AccountsResponse>> {
    let balances = state
        .within(state.accounts_query.list_accounts(caller.context()))
        .await?;
    let accounts = balances
        .iter()
        .map(AccountResponse::try_from)
        .collect::<Result<_, _>>()?;
    Ok(web::Json(AccountsResponse { accounts }))
}

/// Rename an account under an optimistic version check.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{accountId}",
    params(("accountId" = u64, Path, description = "Account to rename")),
    request_body = UpdateAccountBody,
    responses(
        (status = 200, description = "Account renamed", body = AccountResponse),
        (status = 400, description = "Invalid or duplicated name", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 404, description = "No such account", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Stale version or server failure", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["accounts"],
    operation_id = "updateAccount"
)]
#[put("/accounts/{account_id}")]
pub async fn update_account(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<AccountId>,
    payload: web::Json<UpdateAccountBody>,
) -> ApiResult<web::Json<AccountResponse>> {
    let UpdateAccountBody {
        name,
        expected_version,
    } = payload.into_inner();
    let request = UpdateAccountRequest {
        account_id: path.into_inner(),
        name,
        expected_version,
    };
    let account = state
        .within(state.accounts.update_account(caller.context(), request))
        .await?;
    Ok(web::Json(AccountResponse::from(&account)))
}
