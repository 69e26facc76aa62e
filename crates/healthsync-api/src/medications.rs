use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{FixedOffset, Utc};
use tracing::{error, info};
use uuid::Uuid;

use healthsync_types::api::{
    Claims, CreateMedicationRequest, MedicationListResponse, MedicationResponse, MessageResponse,
};
use healthsync_types::models::ReminderItem;
use healthsync_types::time::{local_to_utc, parse_time_of_day, parse_utc_offset};

use crate::auth::AppState;
use crate::error::ApiError;

/// POST /medications: the authored time is converted to UTC before storage.
pub async fn create_medication(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMedicationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let medication_name = req.medication_name.trim();
    let dosage = req.dosage.trim();
    if medication_name.is_empty() || dosage.is_empty() {
        return Err(ApiError::BadRequest("medication_name and dosage are required".into()));
    }

    let local = parse_time_of_day(&req.time_to_notify)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let offset = match req.utc_offset.as_deref() {
        Some(value) => parse_utc_offset(value).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => FixedOffset::east_opt(0).ok_or(ApiError::Internal("invalid offset"))?,
    };

    let now = Utc::now();
    let item = ReminderItem {
        id: Uuid::new_v4(),
        owner_id: claims.sub,
        medication_name: medication_name.to_string(),
        dosage: dosage.to_string(),
        time_to_notify: local_to_utc(local, offset),
        frequency: req.frequency,
        already_notified: false,
        created_at: now,
        updated_at: now,
    };

    state.db.create_medication(&item).map_err(|e| {
        error!("DB create_medication error: {}", e);
        ApiError::Internal("failed to create medication")
    })?;

    info!(
        "Medication {} scheduled for {} at {} UTC ({})",
        item.id, item.owner_id, item.time_to_notify, item.frequency
    );
    Ok((StatusCode::CREATED, Json(MedicationResponse::from(item))))
}

/// GET /medications
pub async fn list_medications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let medications = state.db.list_medications(claims.sub).map_err(|e| {
        error!("DB list_medications error: {}", e);
        ApiError::Internal("failed to retrieve medications")
    })?;

    Ok(Json(MedicationListResponse {
        medications: medications.into_iter().map(MedicationResponse::from).collect(),
    }))
}

fn set_read_flag(state: &AppState, owner_id: Uuid, medication_id: Uuid, read: bool) -> Result<(), ApiError> {
    let updated = state
        .db
        .set_medication_read(medication_id, Some(owner_id), read)
        .map_err(|e| {
            error!("DB set_medication_read error: {}", e);
            ApiError::Internal("failed to update medication")
        })?;

    if !updated {
        return Err(ApiError::NotFound("medication not found"));
    }
    Ok(())
}

/// POST /medications/{medication_id}/read: idempotent.
pub async fn mark_medication_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(medication_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_read_flag(&state, claims.sub, medication_id, true)?;
    Ok(Json(MessageResponse {
        message: "Medication marked as read".into(),
    }))
}

/// POST /medications/{medication_id}/rearm: the scheduler picks it up again.
pub async fn rearm_medication(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(medication_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_read_flag(&state, claims.sub, medication_id, false)?;
    Ok(Json(MessageResponse {
        message: "Medication reminder re-armed".into(),
    }))
}
