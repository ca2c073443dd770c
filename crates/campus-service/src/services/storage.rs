//! File storage service
//!
//! Attachments live on the local filesystem under the configured upload
//! directory; the database stores only relative paths. Downloads go
//! through short-lived opaque tokens instead of raw paths.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use campus_cache::TempUrlData;
use campus_common::{AppError, StorageConfig};
use campus_core::entities::Attachment;
use campus_core::{DomainError, RoomCapabilities, Snowflake};
use rand::RngCore;
use tracing::{info, instrument};

use crate::dto::{StoredFileResponse, TempUrlResponse};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Download token length in raw bytes, before base64
const TOKEN_BYTES: usize = 32;

/// Public URL for a stored relative path
pub fn public_url(config: &StorageConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.public_base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Strip a client-supplied filename down to a safe single component
///
/// Anything with a path separator, a parent reference, or control bytes
/// is rejected rather than repaired.
fn sanitize_filename(filename: &str) -> ServiceResult<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(ServiceError::validation("Filename is required"));
    }
    if trimmed.contains(['/', '\\', '\0']) || trimmed.contains("..") {
        return Err(ServiceError::validation("Invalid filename"));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ServiceError::validation("Invalid filename"));
    }
    Ok(trimmed.to_string())
}

/// Resolve a stored relative path under the base directory
///
/// Containment guard for everything that touches disk: absolute paths
/// and parent references never escape the upload root.
fn resolve_under(base: &Path, relative: &str) -> ServiceResult<PathBuf> {
    if relative.is_empty() || relative.starts_with('/') || relative.contains("..") {
        return Err(ServiceError::validation("Invalid file path"));
    }
    Ok(base.join(relative))
}

async fn write_file(base: &Path, relative: &str, bytes: &[u8]) -> ServiceResult<()> {
    let full = resolve_under(base, relative)?;
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
    }
    tokio::fs::write(&full, bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(())
}

async fn read_file(base: &Path, relative: &str) -> ServiceResult<Vec<u8>> {
    let full = resolve_under(base, relative)?;
    match tokio::fs::read(&full).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ServiceError::not_found("File", relative))
        }
        Err(e) => Err(AppError::Storage(e.to_string()).into()),
    }
}

/// File storage service
pub struct StorageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StorageService<'a> {
    /// Create a new StorageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store an uploaded file
    ///
    /// The MIME allow-list and size ceiling are enforced here as well as
    /// at message send, so bytes for a disallowed attachment never land
    /// on disk.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        uploader_id: Snowflake,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> ServiceResult<StoredFileResponse> {
        if !self.ctx.chat().is_allowed_type(content_type) {
            return Err(DomainError::AttachmentTypeNotAllowed {
                content_type: content_type.to_string(),
            }
            .into());
        }

        let max_bytes = self.ctx.storage().max_file_size_bytes();
        if bytes.len() as u64 > max_bytes {
            return Err(DomainError::AttachmentTooLarge { max_bytes }.into());
        }

        let name = sanitize_filename(filename)?;
        let file_id = self.ctx.generate_id();
        let relative = format!("attachments/{file_id}/{name}");

        let base = PathBuf::from(&self.ctx.storage().upload_dir);
        write_file(&base, &relative, bytes).await?;

        info!(uploader_id = %uploader_id, path = %relative, "File stored");

        Ok(StoredFileResponse {
            url: public_url(self.ctx.storage(), &relative),
            path: relative,
            filename: name,
            content_type: content_type.to_string(),
            size: bytes.len() as i64,
        })
    }

    /// Issue a temporary download URL for an attachment the user can read
    ///
    /// Resolves the attachment's room first; the read gate runs against
    /// it before any token is minted.
    #[instrument(skip(self))]
    pub async fn attachment_temp_url(
        &self,
        attachment_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<TempUrlResponse> {
        let (attachment, room_id) = self
            .ctx
            .message_repo()
            .find_attachment(attachment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Attachment", attachment_id.to_string()))?;

        let room = self
            .ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id.to_string()))?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        self.temporary_url(&attachment).await
    }

    /// Issue a temporary download URL for an attachment
    ///
    /// The token is single-purpose and expires on its own; nothing is
    /// recorded against the attachment row.
    #[instrument(skip(self, attachment), fields(attachment_id = %attachment.id))]
    pub async fn temporary_url(&self, attachment: &Attachment) -> ServiceResult<TempUrlResponse> {
        let mut raw = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let data = TempUrlData::new(
            attachment.id,
            &attachment.path,
            &attachment.filename,
            &attachment.content_type,
        );
        self.ctx.temp_url_store().store(&token, &data).await?;

        // Served by the API's download route, same origin as the API itself
        Ok(TempUrlResponse {
            url: format!("/downloads/{token}"),
            expires_in: self.ctx.temp_url_store().ttl_seconds(),
        })
    }

    /// Resolve a download token and load the file it points at
    ///
    /// Expired and unknown tokens are indistinguishable.
    #[instrument(skip(self, token))]
    pub async fn resolve_download(&self, token: &str) -> ServiceResult<(TempUrlData, Vec<u8>)> {
        let data = self
            .ctx
            .temp_url_store()
            .resolve(token)
            .await?
            .ok_or_else(|| ServiceError::not_found("Download", "token"))?;

        let base = PathBuf::from(&self.ctx.storage().upload_dir);
        let bytes = read_file(&base, &data.path).await?;

        Ok((data, bytes))
    }

    /// Load a stored file by its relative path
    ///
    /// Serves the public static route; the containment guard is the only
    /// access control, matching the public URLs handed out in responses.
    #[instrument(skip(self))]
    pub async fn read(&self, relative: &str) -> ServiceResult<Vec<u8>> {
        let base = PathBuf::from(&self.ctx.storage().upload_dir);
        read_file(&base, relative).await
    }
}
