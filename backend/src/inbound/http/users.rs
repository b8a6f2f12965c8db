//! Users API handlers.
//!
//! ```text
//! POST /api/v1/user {"email":"jack@x.com"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::User;
use crate::domain::ports::CreateUserRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ProblemSchema;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/user`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserBody {
    #[schema(example = "jack@x.com")]
    pub email: String,
}

/// A registered user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: u64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            email: user.email().to_string(),
        }
    }
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid or duplicated email", body = ProblemSchema, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemSchema, content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateUserRequest {
        email: payload.into_inner().email,
    };
    let user = state.within(state.users.create_user(request)).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditInfo, Error, UpdatedBy, UserId};
    use crate::inbound::http::test_utils::{MockPorts, call_json};
    use crate::test_support::day;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    fn jack() -> User {
        let id = UserId::new(1).expect("user id");
        let audit = AuditInfo::make_for_creation(UpdatedBy::default(), day(2021, 1, 1));
        User::new(id, "jack@x.com", audit).expect("user")
    }

    #[rstest]
    #[actix_web::test]
    async fn created_users_are_echoed_back() {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_create_user()
            .withf(|request| request.email == "jack@x.com")
            .times(1)
            .return_once(|_| Ok(jack()));

        let (status, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/v1/user")
                .set_json(json!({"email": "jack@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"id": 1, "email": "jack@x.com"}));
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicated_emails_are_problems() {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_create_user()
            .return_once(|_| Err(Error::user_email_duplicated("jack@x.com is taken")));

        let (status, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/v1/user")
                .set_json(json!({"email": "jack@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "/api/v1/problems/USER_EMAIL_DUPLICATED");
        assert_eq!(body["instance"], "/api/v1/user");
    }

    #[rstest]
    #[actix_web::test]
    async fn bodies_without_an_email_never_reach_the_service() {
        let (status, body) = call_json(
            MockPorts::default(),
            TestRequest::post().uri("/api/v1/user").set_json(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "/api/v1/problems/REQUEST_UNMARSHALLING_FAILED");
    }
}
