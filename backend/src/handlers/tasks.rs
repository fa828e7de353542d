use actix_web::{web, HttpResponse, Result};
use shared::{
    ApiError, ApiSuccess, CreateDoneRecordRequest, CreateTaskRequest, FieldError, TaskWithPet,
    UpdateDoneRecordRequest, UpdateTaskRequest,
};
use uuid::Uuid;

use crate::handlers::{access_error_response, invalid_id, unauthorized};
use crate::models::AppState;
use crate::services::tasks::TaskError;
use crate::services::{access, done_records as done_record_service, tasks as task_service};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .route("", web::post().to(create_task))
            .route("/{task_id}", web::get().to(get_task))
            .route("/{task_id}", web::patch().to(update_task))
            .route("/{task_id}", web::delete().to(delete_task))
            .route("/{task_id}/done-records", web::get().to(list_done_records))
            .route("/{task_id}/done-records", web::post().to(complete_task))
            .route(
                "/{task_id}/done-records/{record_id}",
                web::get().to(get_done_record),
            )
            .route(
                "/{task_id}/done-records/{record_id}",
                web::patch().to(update_done_record),
            )
            .route(
                "/{task_id}/done-records/{record_id}",
                web::delete().to(delete_done_record),
            ),
    );
}

async fn create_task(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let request = body.into_inner();
    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    match task_service::create_task(&state.db, &user_id, &request).await {
        Ok(task) => Ok(HttpResponse::Created().json(ApiSuccess::new(task))),
        Err(TaskError::PetNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError::new("not_found", "Pet not found")))
        }
        Err(TaskError::Forbidden) => Ok(HttpResponse::Forbidden().json(ApiError::new(
            "forbidden",
            "You can only manage tasks for your own pets",
        ))),
        Err(e) => {
            log::error!("Error creating task: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to create task")))
        }
    }
}

async fn get_task(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let task_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };

    let task = match access::resolve_task(&state.db, &task_id, &user_id).await {
        Ok(task) => task,
        Err(e) => return Ok(access_error_response("task", e)),
    };

    // The owning pet rides along on single-task reads
    match access::resolve_pet(&state.db, &task.pet_id, &user_id).await {
        Ok(pet) => Ok(HttpResponse::Ok().json(ApiSuccess::new(TaskWithPet { task, pet }))),
        Err(e) => Ok(access_error_response("pet", e)),
    }
}

async fn update_task(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let task_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };

    let request = body.into_inner();
    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    let task = match access::resolve_task(&state.db, &task_id, &user_id).await {
        Ok(task) => task,
        Err(e) => return Ok(access_error_response("task", e)),
    };

    match task_service::update_task(&state.db, &task, &request).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiSuccess::new(updated))),
        Err(e) => {
            log::error!("Error updating task {}: {:?}", task_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to update task")))
        }
    }
}

async fn delete_task(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let task_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };

    if let Err(e) = access::resolve_task(&state.db, &task_id, &user_id).await {
        return Ok(access_error_response("task", e));
    }

    match task_service::delete_task(&state.db, &task_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            log::error!("Error deleting task {}: {:?}", task_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to delete task")))
        }
    }
}

/// Record a completion: appends a done record and advances the task's due
/// date by its interval, both inside one transaction.
async fn complete_task(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<CreateDoneRecordRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let task_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };

    let request = body.into_inner();
    if request.task != task_id {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(vec![FieldError::new(
            "task",
            "Task must match the task in the path",
        )])));
    }

    let task = match access::resolve_task(&state.db, &task_id, &user_id).await {
        Ok(task) => task,
        Err(e) => return Ok(access_error_response("task", e)),
    };

    match task_service::complete_task(&state.db, &task, request.date, state.config.schedule_timezone)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiSuccess::new(record))),
        Err(e) => {
            log::error!("Error completing task {}: {:?}", task_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to complete task")))
        }
    }
}

async fn list_done_records(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let task_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };

    if let Err(e) = access::resolve_task(&state.db, &task_id, &user_id).await {
        return Ok(access_error_response("task", e));
    }

    match done_record_service::list_for_task(&state.db, &task_id).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiSuccess::new(records))),
        Err(e) => {
            log::error!("Error listing done records for task {}: {:?}", task_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to list done records")))
        }
    }
}

async fn get_done_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (task_id, record_id) = path.into_inner();
    let task_id = match Uuid::parse_str(&task_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("done record")),
    };

    match access::resolve_done_record(&state.db, &record_id, &task_id, &user_id).await {
        Ok((record, _task)) => Ok(HttpResponse::Ok().json(ApiSuccess::new(record))),
        Err(e) => Ok(access_error_response("done record", e)),
    }
}

/// Edit a record's date. This is a history correction; the task's due date
/// is deliberately left alone.
async fn update_done_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateDoneRecordRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (task_id, record_id) = path.into_inner();
    let task_id = match Uuid::parse_str(&task_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("done record")),
    };

    let record = match access::resolve_done_record(&state.db, &record_id, &task_id, &user_id).await
    {
        Ok((record, _task)) => record,
        Err(e) => return Ok(access_error_response("done record", e)),
    };

    match done_record_service::update_record(&state.db, &record, &body.into_inner()).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiSuccess::new(updated))),
        Err(e) => {
            log::error!("Error updating done record {}: {:?}", record_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to update done record")))
        }
    }
}

async fn delete_done_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (task_id, record_id) = path.into_inner();
    let task_id = match Uuid::parse_str(&task_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("task")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("done record")),
    };

    if let Err(e) = access::resolve_done_record(&state.db, &record_id, &task_id, &user_id).await {
        return Ok(access_error_response("done record", e));
    }

    match done_record_service::delete_record(&state.db, &record_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            log::error!("Error deleting done record {}: {:?}", record_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to delete done record")))
        }
    }
}
