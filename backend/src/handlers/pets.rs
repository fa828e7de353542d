use actix_web::{web, HttpResponse, Result};
use shared::{ApiError, ApiSuccess, CreatePetRequest, UpdatePetRequest};
use uuid::Uuid;

use crate::handlers::{access_error_response, invalid_id, unauthorized};
use crate::models::AppState;
use crate::services::{access, pets as pet_service, tasks as task_service};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pets")
            .route("", web::get().to(list_pets))
            .route("", web::post().to(create_pet))
            .route("/{pet_id}", web::get().to(get_pet))
            .route("/{pet_id}", web::patch().to(update_pet))
            .route("/{pet_id}", web::delete().to(delete_pet))
            .route("/{pet_id}/tasks", web::get().to(list_pet_tasks)),
    );
}

async fn list_pets(state: web::Data<AppState>, req: actix_web::HttpRequest) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    match pet_service::list_pets(&state.db, &user_id).await {
        Ok(pets) => Ok(HttpResponse::Ok().json(ApiSuccess::new(pets))),
        Err(e) => {
            log::error!("Error listing pets: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to list pets")))
        }
    }
}

async fn create_pet(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<CreatePetRequest>,
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

    match pet_service::create_pet(&state.db, &user_id, &request).await {
        Ok(pet) => Ok(HttpResponse::Created().json(ApiSuccess::new(pet))),
        Err(e) => {
            log::error!("Error creating pet: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to create pet")))
        }
    }
}

async fn get_pet(
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

    match access::resolve_pet(&state.db, &pet_id, &user_id).await {
        Ok(pet) => Ok(HttpResponse::Ok().json(ApiSuccess::new(pet))),
        Err(e) => Ok(access_error_response("pet", e)),
    }
}

async fn update_pet(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdatePetRequest>,
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

    let pet = match access::resolve_pet(&state.db, &pet_id, &user_id).await {
        Ok(pet) => pet,
        Err(e) => return Ok(access_error_response("pet", e)),
    };

    match pet_service::update_pet(&state.db, &pet, &request).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiSuccess::new(updated))),
        Err(e) => {
            log::error!("Error updating pet {}: {:?}", pet_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to update pet")))
        }
    }
}

async fn delete_pet(
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

    match pet_service::delete_pet(&state.db, &pet_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            log::error!("Error deleting pet {}: {:?}", pet_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to delete pet")))
        }
    }
}

async fn list_pet_tasks(
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

    match task_service::list_for_pet(&state.db, &pet_id).await {
        Ok(tasks) => Ok(HttpResponse::Ok().json(ApiSuccess::new(tasks))),
        Err(e) => {
            log::error!("Error listing tasks for pet {}: {:?}", pet_id, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to list tasks")))
        }
    }
}
