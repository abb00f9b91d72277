pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod thumbnails;
pub mod user_models;
pub mod user_storage;
pub mod users;
pub mod videos;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use config::Config;
use std::sync::Arc;
use storage::VideoStorage;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use user_storage::UserStorage;

pub struct AppState {
    pub config: Config,
    pub users: UserStorage,
    pub videos: VideoStorage,
}

impl AppState {
    /// Opens both stores under `config.data_dir`.
    pub fn new(config: Config) -> Result<Self> {
        let users = UserStorage::new(&config.data_dir)?;
        let videos = VideoStorage::new(&config.data_dir)?;

        Ok(Self {
            config,
            users,
            videos,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.assets_root);

    Router::new()
        .route("/api/users", post(users::create_user))
        .route("/api/login", post(users::login))
        .route(
            "/api/videos",
            post(videos::create_video).get(videos::list_videos),
        )
        .route(
            "/api/videos/:video_id",
            get(videos::get_video).delete(videos::delete_video),
        )
        .route(
            "/api/thumbnail_upload/:video_id",
            post(thumbnails::upload_thumbnail).layer(DefaultBodyLimit::disable()),
        )
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
