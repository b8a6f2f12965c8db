//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::middleware::{HeaderLimit, Trace};

/// Assemble the application: middleware, extractor configuration and routes.
///
/// Requests carrying more than `max_header_bytes` of headers are answered
/// with 431 before routing. Every response carries a `trace-id` header.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::web;
/// use backend::inbound::http::state::HttpState;
/// use backend::outbound::memory::MemoryStore;
/// use backend::server::build_app;
/// use mockable::DefaultClock;
///
/// let state = HttpState::over_store(Arc::new(MemoryStore::new()), Arc::new(DefaultClock));
/// let app = build_app(web::Data::new(state), 8 * 1024);
/// ```
pub fn build_app(
    http_state: web::Data<HttpState>,
    max_header_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .wrap(HeaderLimit::new(max_header_bytes))
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Construct an Actix HTTP server over prepared handler state.
///
/// The write timeout from `config` replaces the state's service deadline.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(http_state: HttpState, config: &ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state.with_deadline(config.write_timeout));
    let max_header_bytes = config.max_header_bytes;

    let server = HttpServer::new(move || build_app(http_state.clone(), max_header_bytes))
        .client_request_timeout(config.read_timeout)
        .client_disconnect_timeout(config.write_timeout)
        .bind(config.bind_addr)?
        .run();

    Ok(server)
}
