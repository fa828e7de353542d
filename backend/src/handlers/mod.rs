use actix_web::{web, HttpResponse};
use shared::ApiError;

use crate::services::access::AccessError;

pub mod auth;
pub mod done_records;
pub mod pets;
pub mod tasks;
pub mod users;
pub mod weight_records;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(users::configure)
            // Weight-record routes nest under /pets; they must be registered
            // before the /pets scope so it does not swallow them
            .configure(weight_records::configure)
            .configure(pets::configure)
            .configure(tasks::configure)
            .configure(done_records::configure),
    );
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiError::new("unauthorized", "Invalid or missing token"))
}

pub(crate) fn invalid_id(what: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(
        "invalid_id",
        format!("Invalid {} ID format", what),
    ))
}

/// Map a failed ownership-chain resolution to its HTTP shape. Database and
/// row-decoding failures stay opaque to the client.
pub(crate) fn access_error_response(context: &str, err: AccessError) -> HttpResponse {
    match err {
        AccessError::NotFound(what) => {
            HttpResponse::NotFound().json(ApiError::new("not_found", format!("{} not found", what)))
        }
        AccessError::Forbidden => HttpResponse::Forbidden().json(ApiError::new(
            "forbidden",
            "You can only access your own data",
        )),
        err => {
            log::error!("Error resolving {}: {:?}", context, err);
            HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Internal server error"))
        }
    }
}
