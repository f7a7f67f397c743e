use actix_web::{
    http::{header, header::ContentType, StatusCode},
    web, HttpRequest, HttpResponse,
};
use serde::Deserialize;

use crate::auth::Credentials;
use crate::domain::registration::{ListingError, RejectionReason};
use crate::models::RegistrationForm;

use super::error::AppError;
use super::state::AppState;
use super::views;

/// Where a successful submission lands.
pub const REGISTERED_REDIRECT: &str = "/?registered=true";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/register", web::get().to(registration_form))
        .route("/register", web::post().to(submit_registration))
        .route("/registrations", web::get().to(list_registrations));
}

#[derive(Deserialize)]
struct HomeQuery {
    registered: Option<String>,
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

async fn home(query: web::Query<HomeQuery>) -> HttpResponse {
    let registered = query.registered.as_deref() == Some("true");
    html(StatusCode::OK, views::home(registered))
}

async fn registration_form() -> HttpResponse {
    html(
        StatusCode::OK,
        views::registration_form(&[], &RegistrationForm::default()),
    )
}

async fn submit_registration(
    state: web::Data<AppState>,
    form: web::Form<RegistrationForm>,
) -> HttpResponse {
    match state.workflow.submit(form.into_inner()).await {
        Ok(_) => {
            state.metrics.record_submission("persisted");
            HttpResponse::Found()
                .insert_header((header::LOCATION, REGISTERED_REDIRECT))
                .finish()
        }
        Err(rejection) => {
            state.metrics.record_submission(rejection.outcome());

            let status = match rejection.reason {
                RejectionReason::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::OK,
            };
            html(
                status,
                views::registration_form(&rejection.reason.messages(), &rejection.input),
            )
        }
    }
}

async fn list_registrations(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credentials::from_basic_header);

    match state.listing.list(credentials.as_ref()).await {
        Ok(registrations) => {
            state.metrics.record_listing("ok");
            Ok(html(StatusCode::OK, views::registrations(&registrations)))
        }
        Err(e) => {
            state.metrics.record_listing(e.outcome());
            Err(match e {
                ListingError::Unauthorized => AppError::AuthFailed,
                ListingError::Unavailable => AppError::StoreUnavailable,
            })
        }
    }
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}
