// ============================================================================
// Web Layer
// ============================================================================
//
// actix-web application:
// - routes:  page handlers (home, form, submission, listing)
// - views:   HTML rendering
// - error:   AppError → status + generic error page
// - state:   workflow, listing service and metrics shared by handlers
//
// ============================================================================

mod error;
mod routes;
mod state;
mod views;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::{Condition, ErrorHandlers, Logger},
    web, App,
};

use crate::metrics;

pub use error::AppError;
pub use state::AppState;

/// Assemble the application. `development` exposes error detail on 500 pages.
pub fn build_app(
    state: web::Data<AppState>,
    development: bool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let metrics_data = web::Data::new(state.metrics.clone());

    App::new()
        .wrap(Condition::new(
            development,
            ErrorHandlers::new().handler(
                StatusCode::INTERNAL_SERVER_ERROR,
                error::render_error_detail,
            ),
        ))
        .wrap(Logger::default())
        .app_data(state)
        .app_data(metrics_data)
        .configure(routes::configure)
        .configure(metrics::configure)
        .default_service(web::route().to(routes::not_found))
}
