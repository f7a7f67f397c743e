use actix_web::{
    dev::ServiceResponse,
    http::{header, header::ContentType, StatusCode},
    middleware::ErrorHandlerResponse,
    HttpResponse, ResponseError,
};
use thiserror::Error;

use crate::auth::REALM;

use super::views;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    AuthFailed,

    #[error("Not Found")]
    NotFound,

    #[error("Sorry! Something went wrong.")]
    StoreUnavailable,

    #[error("Unhandled error: {0:#}")]
    Unhandled(#[from] anyhow::Error),
}

impl AppError {
    /// Message shown to the client. Never contains internal detail.
    fn public_message(&self) -> &'static str {
        match self {
            AppError::AuthFailed => "Unauthorized",
            AppError::NotFound => "Not Found",
            AppError::StoreUnavailable => "Sorry! Something went wrong.",
            AppError::Unhandled(_) => "Internal Server Error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthFailed => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable | AppError::Unhandled(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut response = HttpResponse::build(status);
        if let AppError::AuthFailed = self {
            response.insert_header((
                header::WWW_AUTHENTICATE,
                format!("Basic realm=\"{REALM}\""),
            ));
        }

        response
            .content_type(ContentType::html())
            .body(views::error_page(status, self.public_message(), None))
    }
}

/// Development mode only: re-render 500s raised as errors with their detail.
///
/// Responses that merely carry a 500 status (e.g. the re-rendered form after
/// a store failure) pass through untouched.
pub fn render_error_detail<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let Some(detail) = res.response().error().map(|e| e.to_string()) else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, _) = res.into_parts();
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let response = HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(views::error_page(status, "Internal Server Error", Some(&detail)));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
