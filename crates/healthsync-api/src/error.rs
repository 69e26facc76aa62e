use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use healthsync_records::RecordError;
use healthsync_types::api::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// Handler error with a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("invalid email or password")]
    Unauthorized,

    /// Decryption failed. Whether from corruption or a key mismatch is not disclosed.
    #[error("cannot retrieve record")]
    RecordUnavailable,

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map a failed upload. Cipher failures here are configuration problems.
    pub fn from_upload(err: RecordError) -> Self {
        error!("Record upload failed: {}", err);
        match err {
            RecordError::Cipher(_) => Self::Internal("encryption failed"),
            RecordError::NotFound => Self::NotFound("user not found"),
            RecordError::Store(_) => Self::Internal("failed to store record"),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound => Self::NotFound("record not found"),
            RecordError::Cipher(_) => Self::RecordUnavailable,
            RecordError::Store(e) => {
                error!("Record store error: {}", e);
                Self::Internal("failed to fetch records")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RecordUnavailable | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
