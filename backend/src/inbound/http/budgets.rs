//! Budgets API handlers.
//!
//! ```text
//! POST /api/v1/budgets {"accountIds":[1],"periodType":"MONTH",
//!                       "categories":[{"categoryId":2,"maxLimit":{"currency":"AED","value":50000}}]}
//! GET /api/v1/budgets
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateBudgetRequest, NewCategoryLimit};
use crate::domain::{AccountId, Budget, CategoryId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::schemas::{MoneyDto, ProblemSchema};
use crate::inbound::http::state::HttpState;

/// Spending limit for one category.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLimitBody {
    #[schema(value_type = u64)]
    pub category_id: CategoryId,
    pub max_limit: MoneyDto,
}

/// Request body for `POST /api/v1/budgets`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetBody {
    #[schema(value_type = Vec<u64>)]
    pub account_ids: Vec<AccountId>,
    /// `WEEK` or `MONTH`.
    #[schema(example = "MONTH")]
    pub period_type: String,
    pub categories: Vec<CategoryLimitBody>,
}

impl From<CreateBudgetBody> for CreateBudgetRequest {
    fn from(body: CreateBudgetBody) -> Self {
        Self {
            account_ids: body.account_ids,
            period_type: body.period_type,
            limits: body
                .categories
                .into_iter()
                .map(|limit| NewCategoryLimit {
                    category_id: limit.category_id,
                    max_limit: limit.max_limit.into(),
                })
                .collect(),
        }
    }
}

/// Progress of one category against its limit in the current period.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudgetResponse {
    pub category_id: u64,
    pub max_limit: MoneyDto,
    pub amount_spent: MoneyDto,
    pub exceeded: bool,
}

/// A budget with its current spending.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub id: u64,
    pub account_ids: Vec<u64>,
    pub period_type: String,
    pub categories: Vec<CategoryBudgetResponse>,
    pub version: u32,
}

impl TryFrom<&Budget> for BudgetResponse {
    type Error = Error;

    fn try_from(budget: &Budget) -> Result<Self, Self::Error> {
        let categories = budget
            .category_budgets()
            .iter()
            .map(|entry| {
                Ok(CategoryBudgetResponse {
                    category_id: entry.category_id().get(),
                    max_limit: MoneyDto::try_from(entry.max_limit())?,
                    amount_spent: MoneyDto::try_from(entry.amount_spent())?,
                    exceeded: entry.exceeded(),
                })
            })
            .collect::<Result<_, Error>>()?;
        Ok(Self {
            id: budget.id().get(),
            account_ids: budget.account_ids().iter().map(|id| id.get()).collect(),
            period_type: budget.period_type().to_string(),
            categories,
            version: budget.audit().version(),
        })
    }
}

/// A list of budgets.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BudgetsResponse {
    pub budgets: Vec<BudgetResponse>,
}

/// Create a budget over some of the caller's accounts.
#[utoipa::path(
    post,
    path = "/api/v1/budgets",
    request_body = CreateBudgetBody,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 400, description = "Invalid budget", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 404, description = "Unknown account", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["budgets"],
    operation_id = "createBudget"
)]
#[post("/budgets")]
pub async fn create_budget(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateBudgetBody>,
) -> ApiResult<HttpResponse> {
    let budget = state
        .within(
            state
                .budgets
                .create_budget(caller.context(), payload.into_inner().into()),
        )
        .await?;
    Ok(HttpResponse::Created().json(BudgetResponse::try_from(&budget)?))
}

/// List the caller's budgets with spending in the current period.
#[utoipa::path(
    get,
    path = "/api/v1/budgets",
    responses(
        (status = 200, description = "Budgets", body = BudgetsResponse),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["budgets"],
    operation_id = "listBudgets"
)]
#[get("/budgets")]
pub async fn list_budgets(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<BudgetsResponse>> {
    let budgets = state
        .within(state.budgets_query.list_budgets(caller.context()))
        .await?;
    let budgets = budgets
        .iter()
        .map(BudgetResponse::try_from)
        .collect::<Result<_, _>>()?;
    Ok(web::Json(BudgetsResponse { budgets }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetDraft, BudgetId, Money, PeriodType};
    use crate::inbound::http::test_utils::{MockPorts, account_id, audit, call_json, caller, category_id};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    fn budget() -> Budget {
        Budget::try_from(BudgetDraft {
            id: BudgetId::new(4).expect("budget id"),
            account_ids: vec![account_id(1)],
            period_type: PeriodType::Month,
            limits: vec![(category_id(2), Money::new("AED", 50_000).expect("money"))],
            audit: audit(),
        })
        .expect("budget")
    }

    #[rstest]
    #[actix_web::test]
    async fn created_budgets_are_echoed_back() {
        let mut ports = MockPorts::default();
        ports
            .budgets
            .expect_create_budget()
            .withf(|_, request| {
                request.account_ids == [account_id(1)]
                    && request.period_type == "MONTH"
                    && request.limits.len() == 1
                    && request.limits[0].max_limit.value == 50_000
            })
            .return_once(|_, _| Ok(budget()));

        let (status, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/v1/budgets")
                .insert_header(caller(7))
                .set_json(json!({
                    "accountIds": [1],
                    "periodType": "MONTH",
                    "categories": [{"categoryId": 2, "maxLimit": {"currency": "AED", "value": 50000}}]
                })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({
                "id": 4,
                "accountIds": [1],
                "periodType": "MONTH",
                "categories": [{
                    "categoryId": 2,
                    "maxLimit": {"currency": "AED", "value": 50000},
                    "amountSpent": {"currency": "AED", "value": 0},
                    "exceeded": false
                }],
                "version": 1
            })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn invalid_budgets_are_problems() {
        let mut ports = MockPorts::default();
        ports.budgets.expect_create_budget().return_once(|_, _| {
            Err(Error::budget_validation("a budget needs at least one account")
                .with_field("accounts", "a budget needs at least one account"))
        });

        let (status, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/v1/budgets")
                .insert_header(caller(7))
                .set_json(json!({"accountIds": [], "periodType": "WEEK", "categories": []})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "/api/v1/problems/BUDGET_VALIDATION_FAILED");
    }

    #[rstest]
    #[actix_web::test]
    async fn budgets_are_listed() {
        let mut ports = MockPorts::default();
        ports
            .budgets_query
            .expect_list_budgets()
            .return_once(|_| Ok(vec![budget()]));

        let (status, body) = call_json(
            ports,
            TestRequest::get().uri("/api/v1/budgets").insert_header(caller(7)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["budgets"][0]["id"], 4);
    }
}
