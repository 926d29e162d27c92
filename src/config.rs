use anyhow::Context;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use walkdir::WalkDir;

use crate::providers::retry::RetryPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "import.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub omdb: OmdbConfig,
    pub http: HttpConfig,
    pub media: MediaConfig,
    pub track: TrackDefaults,
    /// directory holding `<category>.json` media lists, embedded lists are used otherwise
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Reads the TOML config at `path`.
    ///
    /// A missing file is fine unless `required`, defaults are used then.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Config> {
        if !required && !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }

    /// Loads `.env` and `.env.local` into the process environment, the latter wins
    pub fn load_dotenv() {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env loaded: {e}");
        }
        if let Err(e) = dotenvy::from_filename_override(".env.local") {
            log::debug!("No .env.local loaded: {e}");
        }
    }

    /// Overrides values with environment variables looked up through `var`
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OMDB_API_KEY") {
            self.omdb.api_key = Some(key);
        }
        if let Some(url) = var("API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = var("IMPORT_API_TOKEN").or_else(|| var("ADMIN_PASSWORD")) {
            self.api.token = Some(token);
        }
        if let Some(dir) = var("AUDIO_DIR") {
            self.media.audio_dir = dir.into();
        }
        if let Some(dir) = var("IMAGES_DIR") {
            self.media.images_dir = dir.into();
        }
        if let Some(path) = var("FFMPEG_PATH") {
            self.media.ffmpeg_path = Some(path.into());
        }
        if let Some(path) = var("YT_DLP_PATH") {
            self.media.yt_dlp_path = path.into();
        }
    }

    /// Non fatal problems worth telling the user about before a run
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.omdb.api_key.is_none() {
            warnings.push(
                "OMDB_API_KEY not set. Get one from http://www.omdbapi.com/apikey.aspx".to_string(),
            );
        }
        if self.media.resolve_ffmpeg().is_none() {
            warnings.push(
                "FFmpeg not detected. Download from https://ffmpeg.org/download.html".to_string(),
            );
        }

        warnings
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.http.max_retries,
            base_delay: Duration::from_millis(self.http.retry_delay_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// bearer token for the import endpoints
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub url: String,
    /// free tier allows one request per second
    pub min_interval_ms: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: "http://www.omdbapi.com/".to_string(),
            min_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MediaConfig {
    pub audio_dir: PathBuf,
    pub images_dir: PathBuf,
    pub ffmpeg_path: Option<PathBuf>,
    pub yt_dlp_path: PathBuf,
    pub download_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("public").join("audio"),
            images_dir: PathBuf::from("public").join("images"),
            ffmpeg_path: None,
            yt_dlp_path: PathBuf::from("yt-dlp"),
            download_timeout_secs: 120,
        }
    }
}

impl MediaConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Finds ffmpeg: configured path, then `PATH`, then usual install locations
    pub fn resolve_ffmpeg(&self) -> Option<PathBuf> {
        if let Some(path) = self.ffmpeg_path.as_ref().filter(|p| p.exists()) {
            return Some(path.clone());
        }

        if let Ok(path) = which::which("ffmpeg") {
            return Some(path);
        }

        common_ffmpeg_locations()
            .into_iter()
            .find_map(|candidate| find_ffmpeg_in(&candidate))
    }
}

fn common_ffmpeg_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Some(profile) = std::env::var_os("USERPROFILE") {
        locations.push(
            PathBuf::from(profile)
                .join("AppData")
                .join("Local")
                .join("Microsoft")
                .join("WinGet")
                .join("Packages"),
        );
    }
    locations.extend(
        [
            r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
            r"C:\ffmpeg\bin\ffmpeg.exe",
            "/usr/local/bin/ffmpeg",
            "/opt/homebrew/bin/ffmpeg",
            "/usr/bin/ffmpeg",
        ]
        .map(PathBuf::from),
    );

    locations
}

/// `location` is either the binary itself or a directory to search for `ffmpeg.exe`
fn find_ffmpeg_in(location: &Path) -> Option<PathBuf> {
    if location.is_file() {
        return Some(location.to_path_buf());
    }
    if !location.is_dir() {
        return None;
    }

    WalkDir::new(location)
        .max_depth(6)
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == "ffmpeg.exe")
        .map(|entry| entry.into_path())
}

/// Values every created track starts with
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TrackDefaults {
    pub time_limit: u32,
    pub start_time: u32,
}

impl Default for TrackDefaults {
    fn default() -> Self {
        Self {
            time_limit: 30,
            start_time: 0,
        }
    }
}
