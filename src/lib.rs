pub mod auth;
pub mod config;
pub mod library;
pub mod pipeline;
pub mod publish;
pub mod stage;

pub use auth::{AuthError, ConfigError, Credential, CredentialManager, OAuthClient, TokenEndpoint};
pub use config::Config;
pub use library::{Asset, CloudinaryClient, LibraryError, MediaLibrary};
pub use pipeline::{run, run_with_rng, RunReport};
pub use publish::{MetadataTemplate, Privacy, UploadError, VideoMetadata, VideoUploader, YouTubeClient};
pub use stage::{DownloadError, StagedFile};
