use crate::models::Video;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

const STORAGE_FILE: &str = "videos.json";

/// Video records kept in memory and mirrored to a JSON file.
///
/// Every mutation writes the new snapshot to disk before it becomes visible,
/// so a failed write leaves both copies at the previous state.
pub struct VideoStorage {
    path: PathBuf,
    videos: RwLock<Vec<Video>>,
}

impl VideoStorage {
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;
        let path = data_dir.join(STORAGE_FILE);

        let videos = if path.exists() {
            let data = fs::read_to_string(&path).context("Failed to read videos file")?;
            serde_json::from_str(&data).context("Failed to parse videos file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            videos: RwLock::new(videos),
        })
    }

    pub async fn create_video(&self, video: Video) -> Result<Video> {
        let mut videos = self.videos.write().await;
        let mut next = videos.clone();
        next.push(video.clone());
        self.save_to_disk(&next)?;
        *videos = next;
        Ok(video)
    }

    pub async fn find_video(&self, id: Uuid) -> Result<Option<Video>> {
        let videos = self.videos.read().await;
        Ok(videos.iter().find(|v| v.id == id).cloned())
    }

    /// Like [`find_video`](Self::find_video), but a missing record is an error.
    pub async fn get_video(&self, id: Uuid) -> Result<Video> {
        self.find_video(id)
            .await?
            .ok_or_else(|| anyhow!("video {} not found", id))
    }

    pub async fn get_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>> {
        let videos = self.videos.read().await;

        let mut owned: Vec<Video> = videos
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    /// Replaces the stored record with the same id and bumps `updated_at`.
    pub async fn update_video(&self, mut video: Video) -> Result<Video> {
        let mut videos = self.videos.write().await;

        let index = videos
            .iter()
            .position(|v| v.id == video.id)
            .ok_or_else(|| anyhow!("video {} not found", video.id))?;

        video.updated_at = Utc::now();
        let mut next = videos.clone();
        next[index] = video.clone();
        self.save_to_disk(&next)?;
        *videos = next;
        Ok(video)
    }

    pub async fn delete_video(&self, id: Uuid) -> Result<()> {
        let mut videos = self.videos.write().await;

        if !videos.iter().any(|v| v.id == id) {
            return Err(anyhow!("video {} not found", id));
        }

        let next: Vec<Video> = videos.iter().filter(|v| v.id != id).cloned().collect();
        self.save_to_disk(&next)?;
        *videos = next;
        Ok(())
    }

    fn save_to_disk(&self, videos: &[Video]) -> Result<()> {
        let json = serde_json::to_string_pretty(videos).context("Failed to serialize videos")?;
        fs::write(&self.path, json).context("Failed to write to videos file")?;
        Ok(())
    }
}
