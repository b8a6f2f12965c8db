//! Health endpoint: reports whether the database answers.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Status of one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentStatus {
    Up,
    Down,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub database: ComponentStatus,
}

/// Database health probe.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn check_health(state: web::Data<HttpState>) -> HttpResponse {
    let (mut response, database) = match state.within(state.health.check_database()).await {
        Ok(()) => (HttpResponse::Ok(), ComponentStatus::Up),
        Err(error) => {
            warn!(%error, "health check failed");
            (HttpResponse::InternalServerError(), ComponentStatus::Down)
        }
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthResponse { database })
}
