use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;
use rand::Rng;
use reqwest::blocking::Client;

use crate::auth::{CredentialManager, TokenEndpoint};
use crate::config::{self, Config};
use crate::library::{self, MediaLibrary};
use crate::publish::VideoUploader;
use crate::stage;

/// Outcome of a successful publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub public_id: String,
    pub display_name: String,
    pub title: String,
    pub video_id: String,
}

impl RunReport {
    pub fn url(&self) -> String {
        config::watch_url(&self.video_id)
    }
}

/// Blocking HTTP client shared by every remote call of a run.
///
/// The request timeout is disabled: downloads and uploads block until the
/// remote side finishes.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("clipcast/", env!("CARGO_PKG_VERSION")))
        .timeout(None::<Duration>)
        .build()
        .context("failed to build HTTP client")
}

/// Run one publish: pick → stage → authenticate → upload → clean up.
///
/// The staged file is removed only after a successful upload; on any failure
/// the error propagates and the file is left where it is.
pub fn run<L, T, U>(
    cfg: &Config,
    library: &L,
    credentials: &CredentialManager<T>,
    uploader: &U,
) -> Result<RunReport>
where
    L: MediaLibrary,
    T: TokenEndpoint,
    U: VideoUploader,
{
    run_with_rng(cfg, library, credentials, uploader, &mut rand::thread_rng())
}

/// [`run`] with an explicit random source for asset selection.
pub fn run_with_rng<L, T, U, R>(
    cfg: &Config,
    library: &L,
    credentials: &CredentialManager<T>,
    uploader: &U,
    rng: &mut R,
) -> Result<RunReport>
where
    L: MediaLibrary,
    T: TokenEndpoint,
    U: VideoUploader,
    R: Rng + ?Sized,
{
    let prefix = &cfg.library.prefix;

    // Step 1: Pick
    let assets = library
        .list(prefix, cfg.library.max_results)
        .context("failed to list media library")?;
    let asset = library::pick_random(&assets, prefix, rng)?;
    info!(
        "selected {} of {} assets: {}",
        asset.public_id,
        assets.len(),
        asset.secure_url
    );

    // Step 2: Stage
    let staged = stage::stage(library, asset, &cfg.staging_dir)
        .with_context(|| format!("failed to download {}", asset.public_id))?;

    // Step 3: Authenticate
    let credential = credentials
        .obtain()
        .context("failed to obtain upload credential")?;
    let access_token = credential
        .access_token
        .as_deref()
        .ok_or_else(|| anyhow!("credential has no access token"))?;

    // Step 4: Publish
    let metadata = cfg.upload.template.render(&staged.display_name);
    let video_id = uploader
        .insert(access_token, &metadata, &staged.path)
        .with_context(|| format!("failed to upload {}", staged.path.display()))?;
    info!("video uploaded, id {}", video_id);

    // Step 5: Clean up
    staged.remove();

    Ok(RunReport {
        public_id: asset.public_id.clone(),
        display_name: staged.display_name,
        title: metadata.title,
        video_id,
    })
}
