use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RefreshTokenRow, UserRow};
use shared::{CreateUserRequest, LoginRequest, UpdateUserRequest, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Password hashing error")]
    HashingError,
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Create an account. The new user starts unverified; the returned token is
/// what the verification link carries.
pub async fn register_user(
    pool: &SqlitePool,
    request: &CreateUserRequest,
) -> Result<(User, String), AuthError> {
    // Check if user exists
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE username = ? OR email = ?",
    )
    .bind(&request.username)
    .bind(&request.email)
    .fetch_one(pool)
    .await?;

    if existing > 0 {
        return Err(AuthError::UserAlreadyExists);
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingError)?
        .to_string();

    let id = Uuid::new_v4();
    let verify_token = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, username, email, password_hash, verified, verify_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&request.name)
    .bind(&request.username)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(false)
    .bind(&verify_token)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let user = User {
        id,
        name: request.name.clone(),
        username: request.username.clone(),
        email: request.email.clone(),
        picture_ref: None,
        verified: false,
        created_at: now,
        updated_at: now,
    };

    Ok((user, verify_token))
}

/// Mark the account carrying this verification token as verified. The token
/// is single-use.
pub async fn verify_account(pool: &SqlitePool, token: &str) -> Result<(), AuthError> {
    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE users SET verified = ?, verify_token = NULL, updated_at = ? WHERE verify_token = ?",
    )
    .bind(true)
    .bind(now)
    .bind(token)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::TokenNotFound);
    }

    Ok(())
}

pub async fn login_user(pool: &SqlitePool, request: &LoginRequest) -> Result<User, AuthError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(&request.username)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)?;

    Ok(user.to_shared())
}

pub async fn get_user_by_id(pool: &SqlitePool, user_id: &Uuid) -> Result<Option<User>, AuthError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(user.map(|u| u.to_shared()))
}

pub async fn update_user(
    pool: &SqlitePool,
    user_id: &Uuid,
    request: &UpdateUserRequest,
) -> Result<User, AuthError> {
    let mut user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if let Some(ref name) = request.name {
        user.name = name.clone();
    }

    if let Some(ref username) = request.username {
        // Check if username is taken
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(user_id.to_string())
                .fetch_one(pool)
                .await?;

        if existing > 0 {
            return Err(AuthError::UserAlreadyExists);
        }
        user.username = username.clone();
    }

    if let Some(ref email) = request.email {
        // Check if email is taken
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(user_id.to_string())
                .fetch_one(pool)
                .await?;

        if existing > 0 {
            return Err(AuthError::UserAlreadyExists);
        }
        user.email = email.clone();
    }

    let now = Utc::now();
    user.updated_at = now;

    sqlx::query("UPDATE users SET name = ?, username = ?, email = ?, updated_at = ? WHERE id = ?")
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(now)
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(user.to_shared())
}

/// Issue an opaque refresh token for the user. Only its SHA-256 hash is
/// stored; presenting the token later is the only way to match it.
pub async fn issue_refresh_token(pool: &SqlitePool, user_id: &Uuid) -> Result<String, AuthError> {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, token_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(hash_token(&token))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Exchange a refresh token for the user it belongs to.
pub async fn lookup_refresh_token(pool: &SqlitePool, token: &str) -> Result<Uuid, AuthError> {
    let row: Option<RefreshTokenRow> =
        sqlx::query_as("SELECT * FROM refresh_tokens WHERE token_hash = ?")
            .bind(hash_token(token))
            .fetch_optional(pool)
            .await?;

    let row = row.ok_or(AuthError::TokenNotFound)?;
    Uuid::parse_str(&row.user_id).map_err(|_| AuthError::TokenNotFound)
}

pub async fn revoke_refresh_token(pool: &SqlitePool, token: &str) -> Result<(), AuthError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(hash_token(token))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::TokenNotFound);
    }

    Ok(())
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

pub fn create_access_token(
    user_id: &Uuid,
    secret: &str,
    expiration_minutes: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::minutes(expiration_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn signup_request(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada Lovelace".to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "Sup3r-secret".to_string(),
        }
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let user_id = Uuid::new_v4();
        let secret = "test-secret";

        let token = create_access_token(&user_id, secret, 10).unwrap();
        let verified_id = verify_access_token(&token, secret).unwrap();

        assert_eq!(user_id, verified_id);
    }

    #[test]
    fn test_verify_access_token_invalid_secret() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(&user_id, "secret1", 10).unwrap();

        let result = verify_access_token(&token, "secret2");
        assert!(result.is_err());
    }

    #[test]
    fn test_password_hashing() {
        let password = "test_password123";
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2.hash_password(password.as_bytes(), &salt).unwrap();
        let hash_string = hash.to_string();
        let parsed_hash = PasswordHash::new(&hash_string).unwrap();

        assert!(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok());
        assert!(argon2
            .verify_password(b"wrong_password", &parsed_hash)
            .is_err());
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let pool = test_pool().await;

        let (user, _token) = register_user(&pool, &signup_request("ada")).await.unwrap();
        assert!(!user.verified);

        let err = register_user(&pool, &signup_request("ada")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let logged_in = login_user(
            &pool,
            &LoginRequest {
                username: "ada".to_string(),
                password: "Sup3r-secret".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.id, user.id);

        let err = login_user(
            &pool,
            &LoginRequest {
                username: "ada".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_verify_account_consumes_token() {
        let pool = test_pool().await;
        let (user, token) = register_user(&pool, &signup_request("ada")).await.unwrap();

        verify_account(&pool, &token).await.unwrap();

        let verified = get_user_by_id(&pool, &user.id).await.unwrap().unwrap();
        assert!(verified.verified);

        // Second use fails: the token was cleared
        let err = verify_account(&pool, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_refresh_token_roundtrip() {
        let pool = test_pool().await;
        let (user, _) = register_user(&pool, &signup_request("ada")).await.unwrap();

        let token = issue_refresh_token(&pool, &user.id).await.unwrap();
        let resolved = lookup_refresh_token(&pool, &token).await.unwrap();
        assert_eq!(resolved, user.id);

        revoke_refresh_token(&pool, &token).await.unwrap();

        let err = lookup_refresh_token(&pool, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
        let err = revoke_refresh_token(&pool, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_username() {
        let pool = test_pool().await;
        let (ada, _) = register_user(&pool, &signup_request("ada")).await.unwrap();
        register_user(&pool, &signup_request("grace")).await.unwrap();

        let err = update_user(
            &pool,
            &ada.id,
            &UpdateUserRequest {
                username: Some("grace".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let updated = update_user(
            &pool,
            &ada.id,
            &UpdateUserRequest {
                name: Some("Ada King".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Ada King");
        assert_eq!(updated.username, "ada");
    }
}
