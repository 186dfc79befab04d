mod metadata;
mod youtube;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use metadata::{MetadataTemplate, Privacy, VideoMetadata, VideoResource};
pub use youtube::{video_mime, YouTubeClient};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upload rejected ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("upload initiation returned no session URI")]
    MissingSessionUri,
    #[error("upload response carried no video id")]
    MissingVideoId,
}

/// Something that can publish a local video file.
pub trait VideoUploader {
    /// Upload `path` with `metadata`, returning the id the service assigned.
    fn insert(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        path: &Path,
    ) -> Result<String, UploadError>;
}
