use actix_web::{web, HttpResponse, Result};
use shared::{ApiError, ApiSuccess, UpdateUserRequest};
use uuid::Uuid;

use crate::handlers::{invalid_id, unauthorized};
use crate::models::AppState;
use crate::services::auth as auth_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::patch().to(update_user)),
    );
}

async fn get_user(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let current_user_id =
        match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
            Ok(id) => id,
            Err(_) => return Ok(unauthorized()),
        };

    let target_user_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("user")),
    };

    // Users can only read their own profile
    if current_user_id != target_user_id {
        return Ok(HttpResponse::Forbidden().json(ApiError::new(
            "forbidden",
            "You can only access your own data",
        )));
    }

    match auth_service::get_user_by_id(&state.db, &target_user_id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiSuccess::new(user))),
        Ok(None) => {
            Ok(HttpResponse::NotFound().json(ApiError::new("not_found", "User not found")))
        }
        Err(e) => {
            log::error!("Error fetching user: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to fetch user")))
        }
    }
}

async fn update_user(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let current_user_id =
        match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
            Ok(id) => id,
            Err(_) => return Ok(unauthorized()),
        };

    let target_user_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return Ok(invalid_id("user")),
    };

    // Users can only update their own profile
    if current_user_id != target_user_id {
        return Ok(HttpResponse::Forbidden().json(ApiError::new(
            "forbidden",
            "You can only access your own data",
        )));
    }

    let request = body.into_inner();
    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    match auth_service::update_user(&state.db, &target_user_id, &request).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiSuccess::new(user))),
        Err(auth_service::AuthError::UserAlreadyExists) => Ok(HttpResponse::BadRequest()
            .json(ApiError::new("registration_error", "User already exists"))),
        Err(e) => {
            log::error!("Error updating user: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to update user")))
        }
    }
}
