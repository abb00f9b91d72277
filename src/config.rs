use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8091;
const DEFAULT_ASSETS_ROOT: &str = "./assets";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 1;

/// Runtime configuration, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub assets_root: PathBuf,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {value:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow!("JWT_SECRET must be set for authentication"))?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET cannot be empty"));
        }

        let jwt_expiry_hours = env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|hours: &i64| *hours > 0)
            .unwrap_or(DEFAULT_JWT_EXPIRY_HOURS);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        Ok(Self {
            port,
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| DEFAULT_ASSETS_ROOT.to_string())
                .into(),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
                .into(),
            jwt_secret,
            jwt_expiry_hours,
            bcrypt_cost,
        })
    }

    /// Public URL of a file stored under the assets root.
    pub fn asset_url(&self, file_name: &str) -> String {
        format!("http://localhost:{}/assets/{}", self.port, file_name)
    }
}
