//! Middleware rejecting requests whose headers exceed a byte budget.
//!
//! The budget counts every header name and value. Requests over it are
//! answered with `431 Request Header Fields Too Large` without reaching a
//! handler.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

/// Header size guard.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::middleware::HeaderLimit;
///
/// let app = App::new().wrap(HeaderLimit::new(8 * 1024));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HeaderLimit {
    max_bytes: usize,
}

impl HeaderLimit {
    /// Allow at most `max_bytes` of header names and values.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

fn header_bytes(req: &ServiceRequest) -> usize {
    req.headers()
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len())
        .sum()
}

impl<S, B> Transform<S, ServiceRequest> for HeaderLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = HeaderLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HeaderLimitMiddleware {
            service: Rc::new(service),
            max_bytes: self.max_bytes,
        }))
    }
}

/// Service wrapper produced by [`HeaderLimit`].
pub struct HeaderLimitMiddleware<S> {
    service: Rc<S>,
    max_bytes: usize,
}

impl<S, B> Service<ServiceRequest> for HeaderLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let size = header_bytes(&req);
        if size > self.max_bytes {
            warn!(size, limit = self.max_bytes, "request headers over limit");
            let response = HttpResponse::new(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }
        let service = Rc::clone(&self.service);
        Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};
    use rstest::rstest;

    #[rstest]
    #[case(10, StatusCode::OK)]
    #[case(600, StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE)]
    #[actix_web::test]
    async fn oversized_headers_are_rejected(#[case] value_len: usize, #[case] expected: StatusCode) {
        let app = test::init_service(
            App::new()
                .wrap(HeaderLimit::new(512))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("x-padding", "a".repeat(value_len)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), expected);
    }
}
