use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use tracing::{error, info};

use healthsync_types::api::{Claims, DeviceTokenRequest};

use crate::auth::AppState;
use crate::error::ApiError;

/// PUT /users/me/device-token: where medication reminders get pushed.
pub async fn set_device_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeviceTokenRequest>,
) -> Result<StatusCode, ApiError> {
    let token = req.token.trim();
    if token.is_empty() || token.len() > 4096 {
        return Err(ApiError::BadRequest("invalid device token".into()));
    }

    let updated = state.db.set_fcm_token(claims.sub, token).map_err(|e| {
        error!("DB set_fcm_token error: {}", e);
        ApiError::Internal("failed to save device token")
    })?;
    if !updated {
        return Err(ApiError::NotFound("user not found"));
    }

    info!("Device token updated for {}", claims.sub);
    Ok(StatusCode::NO_CONTENT)
}
