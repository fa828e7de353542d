use actix_web::{web, HttpResponse, Result};
use shared::{ApiError, ApiSuccess, CreateWeightRecordRequest, UpdateWeightRecordRequest};
use uuid::Uuid;

use crate::handlers::{access_error_response, invalid_id, unauthorized};
use crate::models::AppState;
use crate::services::{access, weight_records as weight_service};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pets/{pet_id}/weight-records")
            .route("", web::get().to(list_records))
            .route("", web::post().to(create_record))
            .route("/{record_id}", web::get().to(get_record))
            .route("/{record_id}", web::patch().to(update_record))
            .route("/{record_id}", web::delete().to(delete_record)),
    );
}

async fn list_records(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let pet_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("pet")),
    };

    if let Err(e) = access::resolve_pet(&state.db, &pet_id, &user_id).await {
        return Ok(access_error_response("pet", e));
    }

    match weight_service::list_for_pet(&state.db, &pet_id).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiSuccess::new(records))),
        Err(e) => {
            log::error!("Error listing weight records for pet {}: {:?}", pet_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to list weight records")))
        }
    }
}

async fn create_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<CreateWeightRecordRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let pet_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("pet")),
    };

    let request = body.into_inner();
    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    if let Err(e) = access::resolve_pet(&state.db, &pet_id, &user_id).await {
        return Ok(access_error_response("pet", e));
    }

    match weight_service::create_record(&state.db, &pet_id, &request).await {
        Ok(record) => Ok(HttpResponse::Created().json(ApiSuccess::new(record))),
        Err(e) => {
            log::error!("Error creating weight record: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to create weight record")))
        }
    }
}

async fn get_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (pet_id, record_id) = path.into_inner();
    let pet_id = match Uuid::parse_str(&pet_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("pet")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("weight record")),
    };

    match access::resolve_weight_record(&state.db, &record_id, &pet_id, &user_id).await {
        Ok((record, _pet)) => Ok(HttpResponse::Ok().json(ApiSuccess::new(record))),
        Err(e) => Ok(access_error_response("weight record", e)),
    }
}

async fn update_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateWeightRecordRequest>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (pet_id, record_id) = path.into_inner();
    let pet_id = match Uuid::parse_str(&pet_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("pet")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("weight record")),
    };

    let request = body.into_inner();
    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    let record = match access::resolve_weight_record(&state.db, &record_id, &pet_id, &user_id).await
    {
        Ok((record, _pet)) => record,
        Err(e) => return Ok(access_error_response("weight record", e)),
    };

    match weight_service::update_record(&state.db, &record, &request).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiSuccess::new(updated))),
        Err(e) => {
            log::error!("Error updating weight record {}: {:?}", record_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to update weight record")))
        }
    }
}

async fn delete_record(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    let (pet_id, record_id) = path.into_inner();
    let pet_id = match Uuid::parse_str(&pet_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("pet")),
    };
    let record_id = match Uuid::parse_str(&record_id) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("weight record")),
    };

    if let Err(e) = access::resolve_weight_record(&state.db, &record_id, &pet_id, &user_id).await {
        return Ok(access_error_response("weight record", e));
    }

    match weight_service::delete_record(&state.db, &record_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            log::error!("Error deleting weight record {}: {:?}", record_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to delete weight record")))
        }
    }
}
