//! File handlers
//!
//! Endpoints for uploads, temporary download URLs, and token downloads.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use campus_service::{StorageService, StoredFileResponse, TempUrlResponse};

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Upload a file for later attachment to a message
///
/// POST /files
///
/// Multipart form with a single `file` field. The response carries the
/// storage path to reference in a subsequent message send.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Created<Json<StoredFileResponse>>> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| ApiError::invalid_body("Missing filename"))?;
        let content_type = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await.map_err(map_multipart_error)?;

        let service = StorageService::new(&state.services);
        let response = service
            .upload(auth.user_id, &filename, &content_type, &bytes)
            .await?;
        return Ok(Created(Json(response)));
    }

    Err(ApiError::invalid_body("Missing 'file' field"))
}

/// Issue a temporary download URL for an attachment
///
/// POST /attachments/{attachment_id}/temp-url
pub async fn create_temp_url(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<String>,
) -> ApiResult<Json<TempUrlResponse>> {
    let attachment_id = attachment_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid attachment_id format"))?;

    let service = StorageService::new(&state.services);
    let response = service
        .attachment_temp_url(attachment_id, auth.user_id)
        .await?;
    Ok(Json(response))
}

/// Download a file through a temporary token
///
/// GET /downloads/{token}
///
/// Unauthenticated; the unguessable token is the access grant and
/// expires on its own.
pub async fn download(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Response> {
    let service = StorageService::new(&state.services);
    let (data, bytes) = service.resolve_download(&token).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        data.filename.replace('"', "")
    );
    let headers = [
        (header::CONTENT_TYPE, data.content_type.clone()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, bytes).into_response())
}

fn map_multipart_error(e: MultipartError) -> ApiError {
    // The body limit surfaces as a 413 from the multipart reader
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::invalid_body(e.body_text())
    }
}
