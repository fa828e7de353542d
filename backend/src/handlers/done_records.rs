use actix_web::{web, HttpResponse, Result};
use shared::{ApiError, ApiSuccess, CreateDoneRecordRequest};

use crate::handlers::unauthorized;
use crate::models::AppState;
use crate::services::done_records::{self as done_record_service, DoneRecordError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/done-records").route("", web::post().to(create_done_record)));
}

/// Direct history insertion for corrections and backfills. Unlike the
/// completion endpoint under /tasks, this never touches the task's due
/// date.
async fn create_done_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<CreateDoneRecordRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    match done_record_service::create_record(&state.db, &user_id, &body.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Created().json(ApiSuccess::new(record))),
        Err(DoneRecordError::TaskNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError::new("not_found", "Task not found")))
        }
        Err(DoneRecordError::Forbidden) => Ok(HttpResponse::Forbidden().json(ApiError::new(
            "forbidden",
            "You can only record completions for your own tasks",
        ))),
        Err(e) => {
            log::error!("Error creating done record: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to create done record")))
        }
    }
}
