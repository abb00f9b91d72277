use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_API_URL: &str = "http://localhost:8091";
const SESSION_FILE: &str = ".tubely-session";

#[derive(Parser)]
#[command(name = "tubely")]
#[command(about = "A CLI tool for managing videos and their thumbnails", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_API_URL, help = "Base URL of the Tubely server")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a new account")]
    Signup {
        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in and remember the access token")]
    Login {
        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Forget the stored access token")]
    Logout,

    #[command(about = "Show the logged in user")]
    Whoami,

    #[command(about = "Create a new video")]
    CreateVideo {
        #[arg(short, long, help = "Video title")]
        title: String,

        #[arg(short, long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "List your videos")]
    Videos,

    #[command(about = "Upload a thumbnail image for a video")]
    UploadThumbnail {
        #[arg(short, long, help = "Video ID")]
        video_id: String,

        #[arg(short, long, help = "Path to a png, jpeg, gif or webp image")]
        file: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user_id: String,
    email: String,
    token: String,
}

impl Session {
    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(SESSION_FILE, json)?;
        Ok(())
    }

    fn load() -> Option<Self> {
        if Path::new(SESSION_FILE).exists() {
            let data = fs::read_to_string(SESSION_FILE).ok()?;
            serde_json::from_str(&data).ok()
        } else {
            None
        }
    }

    fn clear() -> Result<()> {
        if Path::new(SESSION_FILE).exists() {
            fs::remove_file(SESSION_FILE)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    id: String,
    email: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateVideoRequest {
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Video {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_command(&cli.api_url, cli.command).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_command(api_url: &str, command: Commands) -> Result<()> {
    let client = reqwest::Client::new();

    match command {
        Commands::Signup { email, password } => {
            signup(&client, api_url, &email, &password).await?;
        }
        Commands::Login { email, password } => {
            login(&client, api_url, &email, &password).await?;
        }
        Commands::Logout => {
            Session::clear()?;
            println!("✅ Logged out successfully!");
        }
        Commands::Whoami => match Session::load() {
            Some(session) => println!("👤 {} ({})", session.email, session.user_id),
            None => println!("🔒 Not logged in"),
        },
        Commands::CreateVideo { title, description } => {
            let session = require_login()?;
            create_video(&client, api_url, &session, title, description.unwrap_or_default())
                .await?;
        }
        Commands::Videos => {
            let session = require_login()?;
            list_videos(&client, api_url, &session).await?;
        }
        Commands::UploadThumbnail { video_id, file } => {
            let session = require_login()?;
            upload_thumbnail(&client, api_url, &session, &video_id, &file).await?;
        }
    }

    Ok(())
}

fn require_login() -> Result<Session> {
    Session::load().context("Not logged in. Run `tubely login` first")
}

/// Turns a non-success response into an error carrying the server's message.
async fn check_response(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    bail!("Failed to {} ({}): {}", action, status, message)
}

async fn signup(client: &reqwest::Client, api_url: &str, email: &str, password: &str) -> Result<()> {
    let response = client
        .post(format!("{}/api/users", api_url))
        .json(&CredentialsRequest { email, password })
        .send()
        .await?;

    let user: UserResponse = check_response(response, "create account").await?.json().await?;

    println!("✅ Account created successfully!");
    println!("📧 Email: {}", user.email);
    println!("🆔 User ID: {}", user.id);
    println!("\n💡 You can now log in using: tubely login -e {} -p <password>", user.email);

    Ok(())
}

async fn login(client: &reqwest::Client, api_url: &str, email: &str, password: &str) -> Result<()> {
    let response = client
        .post(format!("{}/api/login", api_url))
        .json(&CredentialsRequest { email, password })
        .send()
        .await?;

    let result: LoginResponse = check_response(response, "log in").await?.json().await?;

    Session {
        user_id: result.id,
        email: result.email.clone(),
        token: result.token,
    }
    .save()?;

    println!("✅ Login successful!");
    println!("👤 Welcome back, {}!", result.email);

    Ok(())
}

async fn create_video(
    client: &reqwest::Client,
    api_url: &str,
    session: &Session,
    title: String,
    description: String,
) -> Result<()> {
    let response = client
        .post(format!("{}/api/videos", api_url))
        .bearer_auth(&session.token)
        .json(&CreateVideoRequest { title, description })
        .send()
        .await?;

    let video: Video = check_response(response, "create video").await?.json().await?;

    println!("✅ Video created successfully!");
    println!("   Title: {}", video.title);
    println!("   ID: {}", video.id);

    Ok(())
}

async fn list_videos(client: &reqwest::Client, api_url: &str, session: &Session) -> Result<()> {
    let response = client
        .get(format!("{}/api/videos", api_url))
        .bearer_auth(&session.token)
        .send()
        .await?;

    let videos: Vec<Video> = check_response(response, "fetch videos").await?.json().await?;

    if videos.is_empty() {
        println!("📭 No videos found.");
        return Ok(());
    }

    println!("\n🎬 Your Videos ({})\n", videos.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Created"),
        Cell::new("Thumbnail"),
    ]));

    for video in videos {
        let created = video.created_at.with_timezone(&Local);
        let thumbnail = video.thumbnail_url.unwrap_or_else(|| "-".to_string());

        table.add_row(Row::new(vec![
            Cell::new(&video.id),
            Cell::new(&video.title),
            Cell::new(&created.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&thumbnail),
        ]));
    }

    table.printstd();
    println!();

    Ok(())
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

async fn upload_thumbnail(
    client: &reqwest::Client,
    api_url: &str,
    session: &Session,
    video_id: &str,
    file_path: &str,
) -> Result<()> {
    let path = Path::new(file_path);

    if !path.exists() {
        bail!("File not found: {}", file_path);
    }

    let Some(content_type) = content_type_for(path) else {
        bail!("Unsupported file type: {}\n💡 Use a png, jpeg, gif or webp image.", file_path);
    };

    let data = fs::read(path).with_context(|| format!("Failed to read {}", file_path))?;
    if data.is_empty() {
        bail!("File is empty: {}", file_path);
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("thumbnail")
        .to_string();

    let part = Part::bytes(data).file_name(file_name).mime_str(content_type)?;
    let form = Form::new().part("thumbnail", part);

    let response = client
        .post(format!("{}/api/thumbnail_upload/{}", api_url, video_id))
        .bearer_auth(&session.token)
        .multipart(form)
        .send()
        .await?;

    let video: Video = check_response(response, "upload thumbnail").await?.json().await?;

    println!("✅ Thumbnail uploaded!");
    println!("   Video: {} ({})", video.title, video.id);
    if let Some(url) = video.thumbnail_url {
        println!("   URL: {}", url);
    }

    Ok(())
}
