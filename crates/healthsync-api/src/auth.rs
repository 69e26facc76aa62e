use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use healthsync_db::Database;
use healthsync_records::ProtectedRecordStore;
use healthsync_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

/// Shared by every handler and the auth middleware.
pub struct AppStateInner {
    pub db: Database,
    pub records: ProtectedRecordStore,
    pub jwt_secret: String,
}

const MIN_PASSWORD_LEN: usize = 8;
const SESSION_DAYS: i64 = 30;

/// Emails are matched case-insensitively, so they are stored lowercased.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.len() < 3 || email.len() > 254 || !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn session_token(state: &AppState, user_id: Uuid, email: &str) -> Result<String, ApiError> {
    create_token(&state.jwt_secret, user_id, email).map_err(|e| {
        error!("JWT encode error: {}", e);
        ApiError::Internal("failed to issue token")
    })
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    validate_credentials(&email, &req.password)?;

    let existing = state.db.get_user_by_email(&email).map_err(|e| {
        error!("DB get_user_by_email error: {}", e);
        ApiError::Internal("failed to register")
    })?;
    if existing.is_some() {
        return Err(ApiError::Conflict("email already registered"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing error: {}", e);
            ApiError::Internal("failed to register")
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    state
        .db
        .create_user(&user_id.to_string(), &email, &password_hash)
        .map_err(|e| {
            error!("DB create_user error: {}", e);
            ApiError::Internal("failed to register")
        })?;

    let token = session_token(&state, user_id, &email)?;
    info!("Registered user {}", user_id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

/// POST /auth/login. Unknown email and wrong password look the same.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    let user = state
        .db
        .get_user_by_email(&email)
        .map_err(|e| {
            error!("DB get_user_by_email error: {}", e);
            ApiError::Internal("failed to log in")
        })?
        .ok_or(ApiError::Unauthorized)?;

    let stored_hash = PasswordHash::new(&user.password).map_err(|e| {
        error!("Stored hash for {} is unreadable: {}", user.id, e);
        ApiError::Internal("failed to log in")
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &stored_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal("failed to log in"))?;
    let token = session_token(&state, user_id, &user.email)?;

    Ok(Json(LoginResponse {
        user_id,
        email: user.email,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (Utc::now() + Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
