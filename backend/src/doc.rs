//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http` together with
//! its request and response bodies. The `CallerId` security scheme describes
//! the `Authorization` header carrying the caller's numeric user id.
//!
//! The document is served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{
    AccountResponse, AccountsResponse, CreateAccountsBody, NewAccountBody, UpdateAccountBody,
};
use crate::inbound::http::budgets::{
    BudgetResponse, BudgetsResponse, CategoryBudgetResponse, CategoryLimitBody, CreateBudgetBody,
};
use crate::inbound::http::categories::{
    CategoriesResponse, CategoryResponse, CreateCategoriesBody, NewCategoryBody,
    UpdateCategoryBody,
};
use crate::inbound::http::health::{ComponentStatus, HealthResponse};
use crate::inbound::http::records_dto::{
    BeneficiaryResponse, CreateRecordBody, CreatedRecordResponse, RecordCategoryResponse,
    RecordResponse, RecordsPageResponse, SearchRangeResponse, SummaryResponse,
};
use crate::inbound::http::schemas::{MoneyDto, ProblemSchema};
use crate::inbound::http::users::{CreateUserBody, UserResponse};

/// Name of the security scheme describing the caller header.
pub const CALLER_SCHEME: &str = "CallerId";

/// Enrich the generated document with the caller identity scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            CALLER_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Decimal user id of the caller. Placeholder for real authentication.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Budget tracker API",
        description = "Accounts, categories, records and budgets for a personal budget tracker."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("CallerId" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::accounts::create_accounts,
        crate::inbound::http::accounts::list_accounts,
        crate::inbound::http::accounts::update_account,
        crate::inbound::http::categories::create_categories,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::records::create_record,
        crate::inbound::http::records::list_records,
        crate::inbound::http::budgets::create_budget,
        crate::inbound::http::budgets::list_budgets,
        crate::inbound::http::health::check_health,
    ),
    components(schemas(
        MoneyDto,
        ProblemSchema,
        CreateUserBody,
        UserResponse,
        NewAccountBody,
        CreateAccountsBody,
        UpdateAccountBody,
        AccountResponse,
        AccountsResponse,
        NewCategoryBody,
        CreateCategoriesBody,
        UpdateCategoryBody,
        CategoryResponse,
        CategoriesResponse,
        CreateRecordBody,
        RecordCategoryResponse,
        BeneficiaryResponse,
        RecordResponse,
        CreatedRecordResponse,
        SummaryResponse,
        SearchRangeResponse,
        RecordsPageResponse,
        CategoryLimitBody,
        CreateBudgetBody,
        CategoryBudgetResponse,
        BudgetResponse,
        BudgetsResponse,
        ComponentStatus,
        HealthResponse,
    )),
    tags(
        (name = "users", description = "User registration"),
        (name = "accounts", description = "Accounts and their balances"),
        (name = "categories", description = "Spending and income categories"),
        (name = "records", description = "Income, expense and transfer records"),
        (name = "budgets", description = "Per-category spending limits"),
        (name = "health", description = "Dependency health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document's structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Problem", &["type", "title", "status", "detail", "instance", "traceId"])]
    #[case("MoneyDto", &["currency", "value"])]
    #[case("CreateRecordBody", &["note", "category", "amount", "date", "type", "beneficiary"])]
    #[case("RecordsPageResponse", &["records", "summary", "search"])]
    #[case("AccountResponse", &["id", "name", "type", "currency", "balance", "version"])]
    #[case("CategoryBudgetResponse", &["categoryId", "maxLimit", "amountSpent", "exceeded"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema"));

        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/v1/user")]
    #[case("/api/v1/accounts")]
    #[case("/api/v1/accounts/{accountId}")]
    #[case("/api/v1/categories")]
    #[case("/api/v1/categories/{categoryId}")]
    #[case("/api/v1/accounts/{accountId}/records")]
    #[case("/api/v1/budgets")]
    #[case("/health")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn caller_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key(CALLER_SCHEME));
    }
}
