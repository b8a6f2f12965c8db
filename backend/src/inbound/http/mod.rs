//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate JSON to driving-port requests, run them under the
//! service deadline held by [`state::HttpState`], and map domain errors to
//! problem documents.

pub mod accounts;
pub mod budgets;
pub mod caller;
pub mod categories;
pub mod error;
pub mod health;
pub mod records;
pub mod records_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every endpoint and the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(
            web::scope("/api/v1")
                .service(users::create_user)
                .service(accounts::create_accounts)
                .service(accounts::list_accounts)
                .service(accounts::update_account)
                .service(categories::create_categories)
                .service(categories::list_categories)
                .service(categories::update_category)
                .service(records::create_record)
                .service(records::list_records)
                .service(budgets::create_budget)
                .service(budgets::list_budgets),
        )
        .service(health::check_health);
}
