use actix_web::{web, HttpResponse, Result};
use shared::{
    ApiError, ApiSuccess, AuthResponse, CreateUserRequest, LoginRequest, RefreshRequest,
    RefreshResponse,
};

use crate::handlers::unauthorized;
use crate::models::AppState;
use crate::services::{auth as auth_service, mailer};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login))
            .route("/token", web::post().to(refresh_token))
            .route("/logout", web::delete().to(logout))
            .route("/verify/{token}", web::get().to(verify_account))
            .route("/me", web::get().to(get_current_user)),
    );
}

async fn signup(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    let details = request.validate();
    if !details.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError::validation(details)));
    }

    match auth_service::register_user(&state.db, &request).await {
        Ok((user, verify_token)) => {
            mailer::send_verification_email(&state.config, &user.email, &verify_token);
            Ok(HttpResponse::Created().json(ApiSuccess::new(user)))
        }
        Err(e) => {
            log::error!("Registration error: {:?}", e);
            Ok(HttpResponse::BadRequest().json(ApiError::new("registration_error", e.to_string())))
        }
    }
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let request = body.into_inner();

    let user = match auth_service::login_user(&state.db, &request).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("Login error: {:?}", e);
            return Ok(HttpResponse::Unauthorized().json(ApiError::new(
                "authentication_error",
                "Wrong username or password",
            )));
        }
    };

    let access_token = match auth_service::create_access_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_minutes,
    ) {
        Ok(token) => token,
        Err(e) => {
            log::error!("JWT creation error: {:?}", e);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("jwt_error", "Failed to create token")));
        }
    };

    match auth_service::issue_refresh_token(&state.db, &user.id).await {
        Ok(refresh_token) => Ok(HttpResponse::Ok().json(ApiSuccess::new(AuthResponse {
            user,
            access_token,
            refresh_token,
        }))),
        Err(e) => {
            log::error!("Refresh token error: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to create token")))
        }
    }
}

async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    let user_id = match auth_service::lookup_refresh_token(&state.db, &request.refresh_token).await
    {
        Ok(id) => id,
        Err(auth_service::AuthError::TokenNotFound) => {
            return Ok(
                HttpResponse::NotFound().json(ApiError::new("not_found", "Token not found"))
            );
        }
        Err(e) => {
            log::error!("Refresh token lookup error: {:?}", e);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to refresh token")));
        }
    };

    match auth_service::create_access_token(
        &user_id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_minutes,
    ) {
        Ok(access_token) => {
            Ok(HttpResponse::Ok().json(ApiSuccess::new(RefreshResponse { access_token })))
        }
        Err(e) => {
            log::error!("JWT creation error: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("jwt_error", "Failed to create token")))
        }
    }
}

async fn logout(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match auth_service::revoke_refresh_token(&state.db, &body.refresh_token).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(auth_service::AuthError::TokenNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError::new("not_found", "Token not found")))
        }
        Err(e) => {
            log::error!("Logout error: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to log out")))
        }
    }
}

async fn verify_account(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match auth_service::verify_account(&state.db, &path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiSuccess::new("Account verified"))),
        Err(auth_service::AuthError::TokenNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError::new("not_found", "Token not found")))
        }
        Err(e) => {
            log::error!("Verification error: {:?}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiError::new("internal_error", "Failed to verify account")))
        }
    }
}

async fn get_current_user(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match crate::middleware::auth::extract_user_id(&req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(_) => return Ok(unauthorized()),
    };

    match auth_service::get_user_by_id(&state.db, &user_id).await {
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
