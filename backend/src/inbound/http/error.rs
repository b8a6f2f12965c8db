//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into RFC 7807 problem documents.
//!
//! ```text
//! HTTP/1.1 404 Not Found
//! Content-Type: application/problem+json
//!
//! {"type":"/api/v1/problems/CATEGORIES_NOT_FOUND","title":"Categories not found",
//!  "status":404,"detail":"Category 9 not found","instance":"/api/v1/accounts/1/records"}
//! ```

use std::error::Error as StdError;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde_json::{Map, Value};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::{TraceId, current_path};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Media type of problem documents.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Prefix of every problem `type` URI.
pub const PROBLEM_TYPE_PREFIX: &str = "/api/v1/problems/";

const REDACTED_DETAIL: &str = "The server could not complete the request";
const RESERVED_MEMBERS: [&str; 6] = ["type", "title", "status", "detail", "instance", "traceId"];

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ServiceRequiredUserId => StatusCode::UNAUTHORIZED,
        ErrorCode::UserNotFound | ErrorCode::AccountNotFound | ErrorCode::CategoriesNotFound => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn problem_document(error: &Error, status: StatusCode) -> Value {
    let code = error.code();
    let detail = if error.is_validation() {
        error.detail()
    } else {
        REDACTED_DETAIL
    };
    let mut doc = Map::new();
    doc.insert(
        "type".into(),
        Value::String(format!("{PROBLEM_TYPE_PREFIX}{code}")),
    );
    doc.insert("title".into(), Value::String(code.title().into()));
    doc.insert("status".into(), Value::from(status.as_u16()));
    doc.insert("detail".into(), Value::String(detail.into()));
    if let Some(path) = current_path() {
        doc.insert("instance".into(), Value::String(path));
    }
    if let Some(trace_id) = TraceId::current() {
        doc.insert("traceId".into(), Value::String(trace_id.to_string()));
    }
    for (field, message) in error.fields() {
        if !RESERVED_MEMBERS.contains(&field.as_str()) {
            doc.insert(field.clone(), Value::String(message.clone()));
        }
    }
    Value::Object(doc)
}

fn log_system_failure(error: &Error) {
    let Error::System(failure) = error else {
        return;
    };
    let causes: Vec<String> =
        std::iter::successors(failure.cause().map(|c| c as &(dyn StdError + 'static)), |c| {
            (*c).source()
        })
        .map(ToString::to_string)
        .collect();
    error!(
        code = %error.code(),
        detail = error.detail(),
        ?causes,
        trace_id = TraceId::current().map(|id| id.to_string()),
        "request failed with a system error"
    );
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(problem) => status_for(problem.code()),
            Self::System(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log_system_failure(self);
        let status = self.status_code();
        HttpResponse::build(status)
            .content_type(PROBLEM_CONTENT_TYPE)
            .json(problem_document(self, status))
    }
}

fn unmarshalling(err: impl std::fmt::Display, _req: &HttpRequest) -> actix_web::Error {
    Error::request_unmarshalling(err.to_string()).into()
}

/// JSON body extractor configuration reporting decode failures as
/// `REQUEST_UNMARSHALLING_FAILED`.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(unmarshalling)
}

/// Query string extractor configuration, as [`json_config`].
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(unmarshalling)
}

/// Path segment extractor configuration, as [`json_config`].
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(unmarshalling)
}
