use crate::user_models::User;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

const USERS_FILE: &str = "users.json";

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct UserStorage {
    path: PathBuf,
    users: RwLock<Vec<User>>,
}

impl UserStorage {
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;
        let path = data_dir.join(USERS_FILE);

        let users = if path.exists() {
            let data = fs::read_to_string(&path).context("Failed to read users file")?;
            serde_json::from_str(&data).context("Failed to parse users file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Fails if a user with the same email (case-insensitive) already exists.
    pub async fn create_user(&self, user: User) -> Result<User, CreateUserError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(CreateUserError::EmailTaken);
        }

        let mut next = users.clone();
        next.push(user.clone());
        self.save_users_to_disk(&next)?;
        *users = next;
        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    fn save_users_to_disk(&self, users: &[User]) -> Result<()> {
        let json = serde_json::to_string_pretty(users).context("Failed to serialize users")?;
        fs::write(&self.path, json).context("Failed to write to users file")?;
        Ok(())
    }
}
