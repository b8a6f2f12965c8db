//! Categories API handlers.
//!
//! ```text
//! POST /api/v1/categories {"categories":[{"name":"Food"}]}
//! GET /api/v1/categories
//! PUT /api/v1/categories/{categoryId} {"name":"Groceries","expectedVersion":1}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{NewCategory, UpdateCategoryRequest};
use crate::domain::{Category, CategoryId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::schemas::ProblemSchema;
use crate::inbound::http::state::HttpState;

/// One category in a creation request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewCategoryBody {
    #[schema(example = "Food")]
    pub name: String,
}

/// Request body for `POST /api/v1/categories`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoriesBody {
    pub categories: Vec<NewCategoryBody>,
}

/// Request body for `PUT /api/v1/categories/{categoryId}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryBody {
    pub name: String,
    pub expected_version: u32,
}

/// A category as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: u64,
    pub name: String,
    /// Date of the newest record filed under the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub version: u32,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().get(),
            name: category.name().to_owned(),
            last_used_at: category.last_used_at(),
            version: category.audit().version(),
        }
    }
}

/// A list of categories.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

fn categories_response(categories: &[Category]) -> CategoriesResponse {
    CategoriesResponse {
        categories: categories.iter().map(CategoryResponse::from).collect(),
    }
}

/// Create categories for the caller. Names are stored title-cased.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoriesBody,
    responses(
        (status = 201, description = "Categories created", body = CategoriesResponse),
        (status = 400, description = "Invalid or duplicated category", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["categories"],
    operation_id = "createCategories"
)]
#[post("/categories")]
pub async fn create_categories(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateCategoriesBody>,
) -> ApiResult<HttpResponse> {
    let categories = payload
        .into_inner()
        .categories
        .into_iter()
        .map(|body| NewCategory { name: body.name })
        .collect();
    let created = state
        .within(state.categories.create_categories(caller.context(), categories))
        .await?;
    Ok(HttpResponse::Created().json(categories_response(&created)))
}

/// List the caller's categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = CategoriesResponse),
        (status = 401, description = "Caller identity missing", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<CategoriesResponse>> {
    let categories = state
        .within(state.categories_query.list_categories(caller.context()))
        .await?;
    Ok(web::Json(categories_response(&categories)))
}

/// Rename a category under an optimistic version check.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{categoryId}",
    params(("categoryId" = u64, Path, description = "Category to rename")),
    request_body = UpdateCategoryBody,
    responses(
        (status = 200, description = "Category renamed", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicated name", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 404, description = "No such category", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Stale version or server failure", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{category_id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<CategoryId>,
    payload: web::Json<UpdateCategoryBody>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let UpdateCategoryBody {
        name,
        expected_version,
    } = payload.into_inner();
    let request = UpdateCategoryRequest {
        category_id: path.into_inner(),
        name,
        expected_version,
    };
    let category = state
        .within(state.categories.update_category(caller.context(), request))
        .await?;
    Ok(web::Json(CategoryResponse::from(&category)))
}
