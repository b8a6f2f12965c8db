//! Caller identity extraction.
//!
//! The `Authorization` header carries the caller's user id as a decimal
//! string. This stands in for real authentication and must be replaced
//! before the service is exposed publicly.
//!
//! A missing or malformed header yields an anonymous context; services then
//! answer `SERVICE_REQUIRED_USER_ID`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{RequestContext, UserId};

/// Request context of the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(RequestContext);

impl Caller {
    /// The context to hand to driving ports.
    #[must_use]
    pub const fn context(self) -> RequestContext {
        self.0
    }

    fn from_header(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self(RequestContext::anonymous());
        };
        match raw.parse::<UserId>() {
            Ok(user_id) => Self(RequestContext::for_user(user_id)),
            Err(error) => {
                debug!(%error, "ignoring malformed caller identity");
                Self(RequestContext::anonymous())
            }
        }
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        ready(Ok(Self::from_header(raw)))
    }
}
