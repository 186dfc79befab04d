use std::path::PathBuf;

use crate::publish::{MetadataTemplate, Privacy};

// Media library
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_PREFIX: &str = "RonaldoClips/";
pub const DEFAULT_MAX_RESULTS: u32 = 500;

// Staging
pub const RECOGNIZED_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".avi", ".webm"];
pub const DEFAULT_EXTENSION: &str = ".mp4";
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

// OAuth
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const YOUTUBE_UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";
pub const DEFAULT_CLIENT_SECRETS_FILE: &str = "client_secret.json";
pub const DEFAULT_TOKEN_FILE: &str = "token.json";
/// A token expiring within this many seconds is refreshed before use.
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

// Upload
pub const YOUTUBE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";
pub const DEFAULT_CATEGORY_ID: &str = "17"; // Sports
pub const DEFAULT_PRIVACY: Privacy = Privacy::Public;
pub const DEFAULT_TITLE_SUFFIX: &str = "Football Ronaldo & gEOrgina LIFESTYLE";
pub const MAX_TITLE_CHARS: usize = 100;

/// Connection details and query parameters for the Cloudinary Admin API.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub prefix: String,
    pub max_results: u32,
}

impl LibraryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: CLOUDINARY_API_BASE.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Where the credential lives between runs and how to rebuild it.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Long-lived refresh secret, only consulted when no usable token is stored.
    pub refresh_token: Option<String>,
    pub client_secrets_path: PathBuf,
    pub token_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_token: None,
            client_secrets_path: PathBuf::from(DEFAULT_CLIENT_SECRETS_FILE),
            token_path: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_url: String,
    pub template: MetadataTemplate,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_url: YOUTUBE_UPLOAD_URL.to_string(),
            template: MetadataTemplate::default(),
        }
    }
}

/// Runtime configuration for a publish run.
///
/// Built once by the CLI before any component runs; every component receives
/// the resolved part it needs at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub library: LibraryConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub staging_dir: PathBuf,
}

impl Config {
    pub fn new(library: LibraryConfig) -> Self {
        Self {
            library,
            auth: AuthConfig::default(),
            upload: UploadConfig::default(),
            staging_dir: PathBuf::from("."),
        }
    }
}

/// Watch URL for an uploaded video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{YOUTUBE_WATCH_URL}{video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_defaults() {
        let cfg = LibraryConfig::new("demo", "key", "secret");
        assert_eq!(cfg.prefix, DEFAULT_PREFIX);
        assert_eq!(cfg.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(cfg.api_base, CLOUDINARY_API_BASE);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }
}
