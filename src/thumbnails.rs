//! Thumbnail upload for video records.
//!
//! The handler runs the checks strictly in order (id, token, form, media
//! type) before anything touches the disk. A file that was written is removed
//! again if the record update does not go through.
//!
//! Fields are streamed to disk chunk by chunk, so memory use per request stays
//! bounded by the chunk size and the route carries no body size cap.

use crate::auth;
use crate::error::ApiError;
use crate::models::Video;
use crate::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, Path, State,
    },
    http::HeaderMap,
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const THUMBNAIL_FIELD: &str = "thumbnail";

const IMAGE_PREFIX: &str = "image/";
const ALLOWED_IMAGE_SUBTYPES: &[&str] = &["png", "jpeg", "gif", "webp"];
const FILE_NAME_KEY_BYTES: usize = 32;

#[instrument(skip_all)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, ApiError> {
    let video_id = Uuid::parse_str(&video_id).map_err(ApiError::InvalidIdentifier)?;

    let token = auth::get_bearer_token(&headers)?;
    let user_id = auth::validate_jwt(token, &state.config.jwt_secret)?;

    info!(%video_id, %user_id, "Uploading thumbnail");

    let mut multipart = multipart.map_err(|e| ApiError::MalformedUpload(e.body_text()))?;
    let (file_name, file_path) = store_thumbnail(&mut multipart, &state.config.assets_root).await?;

    match attach_thumbnail(&state, video_id, user_id, &file_name).await {
        Ok(video) => Ok(Json(video)),
        Err(err) => {
            remove_file_quietly(&file_path).await;
            Err(err)
        }
    }
}

/// Finds the `thumbnail` field, checks its media type and writes it under
/// `assets_root` with a fresh random name. Other fields are skipped.
async fn store_thumbnail(
    multipart: &mut Multipart,
    assets_root: &FsPath,
) -> Result<(String, PathBuf), ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.body_text()))?
    {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for_media_type(&media_type)
            .ok_or_else(|| ApiError::UnsupportedMediaType(media_type.clone()))?;

        let file_name = random_file_name(&extension);
        let file_path = assets_root.join(&file_name);

        let written = copy_field_to_disk(&mut field, &file_path).await?;
        info!(file = %file_path.display(), %media_type, bytes = written, "Thumbnail stored");

        return Ok((file_name, file_path));
    }

    Err(ApiError::MalformedUpload(format!(
        "missing `{}` field",
        THUMBNAIL_FIELD
    )))
}

/// Extension for an allowed image media type, e.g. `image/png` → `.png`.
///
/// Parameters after `;` are ignored and the match is case-insensitive.
pub fn extension_for_media_type(media_type: &str) -> Option<String> {
    let essence = media_type.split(';').next()?.trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix(IMAGE_PREFIX)?;

    ALLOWED_IMAGE_SUBTYPES
        .contains(&subtype)
        .then(|| format!(".{}", subtype))
}

/// 32 bytes from the OS RNG, URL-safe base64 without padding, plus `extension`.
pub fn random_file_name(extension: &str) -> String {
    let mut key = [0u8; FILE_NAME_KEY_BYTES];
    OsRng.fill_bytes(&mut key);
    format!("{}{}", URL_SAFE_NO_PAD.encode(key), extension)
}

/// Streams the field body into a new file and returns the byte count.
///
/// Read errors come from the client and are reported as a malformed upload;
/// write errors are storage failures. Either way the partial file is removed.
async fn copy_field_to_disk(field: &mut Field<'_>, path: &FsPath) -> Result<u64, ApiError> {
    let mut file = File::create(path).await.map_err(ApiError::StorageWrite)?;
    let mut written = 0u64;

    let result = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.body_text()))?
        {
            file.write_all(&chunk).await.map_err(ApiError::StorageWrite)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(ApiError::StorageWrite)
    }
    .await;

    match result {
        Ok(()) => Ok(written),
        Err(err) => {
            drop(file);
            remove_file_quietly(path).await;
            Err(err)
        }
    }
}

async fn attach_thumbnail(
    state: &AppState,
    video_id: Uuid,
    user_id: Uuid,
    file_name: &str,
) -> Result<Video, ApiError> {
    let mut video = state
        .videos
        .get_video(video_id)
        .await
        .map_err(ApiError::RecordLookup)?;

    if video.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    video.thumbnail_url = Some(state.config.asset_url(file_name));

    state
        .videos
        .update_video(video)
        .await
        .map_err(ApiError::Persistence)
}

async fn remove_file_quietly(path: &FsPath) {
    if let Err(e) = fs::remove_file(path).await {
        warn!(error = %e, file = %path.display(), "Failed to remove orphaned thumbnail");
    }
}
