use std::io::Read;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::LibraryConfig;
use crate::stage::DownloadError;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("no assets found under prefix `{prefix}`")]
    NotFound { prefix: String },
    #[error("asset listing request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("asset listing returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One stored media file, as reported by the library listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

fn default_resource_type() -> String {
    "video".to_string()
}

impl Asset {
    pub fn new(public_id: impl Into<String>, secure_url: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            secure_url: secure_url.into(),
            resource_type: default_resource_type(),
            format: None,
            bytes: None,
        }
    }
}

/// An open download of an asset's bytes.
pub struct AssetStream {
    pub reader: Box<dyn Read>,
    pub content_length: Option<u64>,
}

/// Read access to a remote media library.
pub trait MediaLibrary {
    /// List up to `max_results` video assets whose identifier starts with `prefix`.
    fn list(&self, prefix: &str, max_results: u32) -> Result<Vec<Asset>, LibraryError>;

    /// Open the asset at `secure_url` for streaming.
    fn open(&self, secure_url: &str) -> Result<AssetStream, DownloadError>;
}

/// Choose one asset with uniform probability.
pub fn pick_random<'a, R: Rng + ?Sized>(
    assets: &'a [Asset],
    prefix: &str,
    rng: &mut R,
) -> Result<&'a Asset, LibraryError> {
    assets.choose(rng).ok_or_else(|| LibraryError::NotFound {
        prefix: prefix.to_string(),
    })
}

#[derive(Deserialize)]
struct ResourcesPage {
    #[serde(default)]
    resources: Vec<Asset>,
}

/// Cloudinary Admin API client.
pub struct CloudinaryClient {
    http: Client,
    cfg: LibraryConfig,
}

impl CloudinaryClient {
    pub fn new(http: Client, cfg: LibraryConfig) -> Self {
        Self { http, cfg }
    }

    fn resources_url(&self) -> String {
        format!(
            "{}/{}/resources/video/upload",
            self.cfg.api_base.trim_end_matches('/'),
            self.cfg.cloud_name
        )
    }
}

impl MediaLibrary for CloudinaryClient {
    fn list(&self, prefix: &str, max_results: u32) -> Result<Vec<Asset>, LibraryError> {
        let url = self.resources_url();
        let max_results = max_results.to_string();
        info!("listing videos under `{}`", prefix);

        let res = self
            .http
            .get(&url)
            .basic_auth(&self.cfg.api_key, Some(&self.cfg.api_secret))
            .query(&[("prefix", prefix), ("max_results", max_results.as_str())])
            .send()?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(LibraryError::Status { status, body });
        }

        let page: ResourcesPage = res.json()?;
        debug!("listing returned {} assets", page.resources.len());
        Ok(page.resources)
    }

    fn open(&self, secure_url: &str) -> Result<AssetStream, DownloadError> {
        let res = self.http.get(secure_url).send()?;
        if !res.status().is_success() {
            return Err(DownloadError::Status {
                status: res.status(),
                url: secure_url.to_string(),
            });
        }
        let content_length = res.content_length();
        Ok(AssetStream {
            reader: Box::new(res),
            content_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn listing() -> Vec<Asset> {
        ["Clips/a.mp4", "Clips/b", "Clips/c.mov", "Clips/d_e"]
            .iter()
            .map(|id| Asset::new(*id, format!("https://res.example/{id}")))
            .collect()
    }

    #[test]
    fn test_pick_is_member_of_listing() {
        let assets = listing();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_random(&assets, "Clips/", &mut rng).unwrap();
            assert!(assets.contains(picked));
        }
    }

    #[test]
    fn test_pick_reaches_every_asset() {
        let assets = listing();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_random(&assets, "Clips/", &mut rng).unwrap().public_id.clone());
        }
        assert_eq!(seen.len(), assets.len());
    }

    #[test]
    fn test_pick_single() {
        let assets = vec![Asset::new("Clips/only", "https://res.example/only")];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_random(&assets, "Clips/", &mut rng).unwrap(), &assets[0]);
    }

    #[test]
    fn test_pick_empty_is_not_found() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = pick_random(&[], "Clips/", &mut rng).unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { ref prefix } if prefix == "Clips/"));
    }

    #[test]
    fn test_asset_deserialize_listing() {
        let json = r#"{
            "resources": [
                {"public_id": "Clips/x", "secure_url": "https://r/x.mp4", "resource_type": "video", "format": "mp4", "bytes": 1024, "type": "upload"}
            ],
            "next_cursor": "abc"
        }"#;
        let page: ResourcesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.resources.len(), 1);
        assert_eq!(page.resources[0].format.as_deref(), Some("mp4"));
        assert_eq!(page.resources[0].bytes, Some(1024));
    }
}
