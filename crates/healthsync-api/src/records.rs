use std::path::Path as FsPath;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use healthsync_records::content_type::OCTET_STREAM;
use healthsync_types::api::{Claims, RecordListResponse, UploadRecordQuery, UploadRecordResponse};

use crate::auth::AppState;
use crate::error::ApiError;

/// 50 MB upload limit for medical records
pub const MAX_RECORD_SIZE: usize = 50 * 1024 * 1024;

/// Keep only the final path component and drop characters that would break
/// a Content-Disposition header.
fn clean_file_name(name: &str) -> Option<String> {
    let base = FsPath::new(name.trim()).file_name()?.to_str()?;
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn disposition(kind: &str, file_name: &str) -> String {
    format!("{}; filename=\"{}\"", kind, file_name)
}

/// POST /records?name={file}: raw body, encrypted before it is stored.
pub async fn upload_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UploadRecordQuery>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = clean_file_name(&query.name)
        .ok_or_else(|| ApiError::BadRequest("file name is required".into()))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("file is required".into()));
    }
    if bytes.len() > MAX_RECORD_SIZE {
        return Err(ApiError::BadRequest("file too large".into()));
    }

    let record_id = state
        .records
        .store(claims.sub, &file_name, &bytes)
        .await
        .map_err(ApiError::from_upload)?;

    Ok((
        StatusCode::CREATED,
        Json(UploadRecordResponse {
            record_id,
            file_name,
            size: bytes.len() as u64,
        }),
    ))
}

/// GET /records: metadata only.
pub async fn list_records(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.records.list_for_owner(claims.sub).await?;

    Ok(Json(RecordListResponse {
        owner_id: claims.sub,
        records,
    }))
}

/// GET /records/{record_id}/download: decrypted bytes as an attachment.
pub async fn download_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.records.retrieve(claims.sub, record_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, OCTET_STREAM.to_string()),
            (header::CONTENT_DISPOSITION, disposition("attachment", &record.file_name)),
        ],
        record.plaintext,
    ))
}

/// GET /records/{record_id}/view: decrypted bytes for inline display.
pub async fn view_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.records.retrieve(claims.sub, record_id).await?;
    let content_type = record.content_type();

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition("inline", &record.file_name)),
        ],
        record.plaintext,
    ))
}

/// DELETE /records/{record_id}
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(record_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.records.delete(claims.sub, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_cleaned() {
        assert_eq!(clean_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(clean_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(clean_file_name("a\"b\r\n.pdf").as_deref(), Some("ab.pdf"));
        assert_eq!(clean_file_name("  "), None);
        assert_eq!(clean_file_name("dir/"), Some("dir".to_string()));
    }
}
