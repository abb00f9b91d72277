use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{CreateVideoRequest, Video};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let Json(payload) = payload?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Title cannot be empty".to_string()));
    }

    let video = state
        .videos
        .create_video(Video::new(payload.title, payload.description, user_id))
        .await
        .map_err(ApiError::Persistence)?;

    info!(video_id = %video.id, %user_id, "Video created");
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = state
        .videos
        .get_videos_for_user(user_id)
        .await
        .map_err(ApiError::RecordLookup)?;

    Ok(Json(videos))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, ApiError> {
    let video_id = Uuid::parse_str(&video_id).map_err(ApiError::InvalidIdentifier)?;

    let video = state
        .videos
        .find_video(video_id)
        .await
        .map_err(ApiError::RecordLookup)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(video))
}

/// Deletes the record only. The thumbnail file stays in the assets root.
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let video_id = Uuid::parse_str(&video_id).map_err(ApiError::InvalidIdentifier)?;

    let video = state
        .videos
        .find_video(video_id)
        .await
        .map_err(ApiError::RecordLookup)?
        .ok_or(ApiError::NotFound)?;

    if video.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    state
        .videos
        .delete_video(video_id)
        .await
        .map_err(ApiError::Persistence)?;

    info!(%video_id, %user_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}
