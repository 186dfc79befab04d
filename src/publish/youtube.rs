use std::fs::File;
use std::path::Path;

use log::{debug, info};
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::Deserialize;

use super::{UploadError, VideoMetadata, VideoUploader};

/// YouTube Data API v3 client using the resumable upload protocol.
///
/// The upload is two requests:
///
/// 1. `POST` the metadata with `uploadType=resumable`; the session URI comes
///    back in the `Location` header.
/// 2. `PUT` the file bytes to the session URI; the response body is the
///    created `videos` resource.
pub struct YouTubeClient {
    http: Client,
    upload_url: String,
}

#[derive(Deserialize)]
struct InsertedVideo {
    id: Option<String>,
}

impl YouTubeClient {
    pub fn new(http: Client, upload_url: impl Into<String>) -> Self {
        Self {
            http,
            upload_url: upload_url.into(),
        }
    }

    fn initiate(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        content_type: &str,
        content_length: u64,
    ) -> Result<String, UploadError> {
        let res = self
            .http
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(access_token)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&metadata.resource())
            .send()?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        res.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(UploadError::MissingSessionUri)
    }
}

/// MIME type for a staged video, from its extension.
pub fn video_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

impl VideoUploader for YouTubeClient {
    fn insert(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        path: &Path,
    ) -> Result<String, UploadError> {
        let io_err = |source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        let content_type = video_mime(path);

        info!("uploading '{}' ({} bytes)", metadata.title, len);
        let session_uri = self.initiate(access_token, metadata, content_type, len)?;
        debug!("resumable session opened");

        let res = self
            .http
            .put(&session_uri)
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, content_type)
            .body(Body::sized(file, len))
            .send()?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        let video: InsertedVideo = res.json()?;
        video.id.ok_or(UploadError::MissingVideoId)
    }
}
