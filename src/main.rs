use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use clipcast::config::{
    AuthConfig, Config, LibraryConfig, UploadConfig, DEFAULT_CATEGORY_ID,
    DEFAULT_CLIENT_SECRETS_FILE, DEFAULT_MAX_RESULTS, DEFAULT_PREFIX, DEFAULT_PRIVACY,
    DEFAULT_TITLE_SUFFIX, DEFAULT_TOKEN_FILE,
};
use clipcast::pipeline;
use clipcast::{
    CloudinaryClient, CredentialManager, MediaLibrary, MetadataTemplate, OAuthClient, Privacy,
    YouTubeClient,
};

/// clipcast — publish a random clip from a Cloudinary folder to YouTube.
#[derive(Parser)]
#[command(name = "clipcast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a random video, upload it to YouTube and delete the local copy
    Publish {
        #[command(flatten)]
        library: LibraryArgs,

        #[command(flatten)]
        auth: AuthArgs,

        /// Directory the video is downloaded into
        #[arg(long, default_value = ".")]
        staging_dir: PathBuf,

        /// Text appended to the clip name in the video title
        #[arg(long, default_value = DEFAULT_TITLE_SUFFIX)]
        title_suffix: String,

        /// YouTube category id (default: 17, Sports)
        #[arg(long, default_value = DEFAULT_CATEGORY_ID)]
        category: String,

        /// Privacy status: public, unlisted or private
        #[arg(long, default_value_t = DEFAULT_PRIVACY)]
        privacy: Privacy,
    },

    /// Obtain a valid credential and store it, without uploading anything
    Auth {
        #[command(flatten)]
        auth: AuthArgs,
    },

    /// List the videos a publish run would choose from
    List {
        #[command(flatten)]
        library: LibraryArgs,
    },
}

#[derive(Args)]
struct LibraryArgs {
    /// Cloudinary cloud name
    #[arg(long, env = "CLOUDINARY_CLOUD_NAME", hide_env_values = true)]
    cloud_name: String,

    /// Cloudinary API key
    #[arg(long, env = "CLOUDINARY_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Cloudinary API secret
    #[arg(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    api_secret: String,

    /// Folder prefix to pick videos from
    #[arg(long, env = "CLIPCAST_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Maximum number of assets to list
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: u32,
}

impl LibraryArgs {
    fn into_config(self) -> LibraryConfig {
        LibraryConfig {
            prefix: self.prefix,
            max_results: self.max_results,
            ..LibraryConfig::new(self.cloud_name, self.api_key, self.api_secret)
        }
    }
}

#[derive(Args)]
struct AuthArgs {
    /// OAuth refresh token used when no usable stored credential exists
    #[arg(long, env = "GOOGLE_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// OAuth client configuration downloaded from the Google Cloud console
    #[arg(long, env = "CLIPCAST_CLIENT_SECRETS", default_value = DEFAULT_CLIENT_SECRETS_FILE)]
    client_secrets: PathBuf,

    /// Where the credential is stored between runs
    #[arg(long, env = "CLIPCAST_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,
}

impl AuthArgs {
    fn into_config(self) -> AuthConfig {
        AuthConfig {
            refresh_token: self.refresh_token,
            client_secrets_path: self.client_secrets,
            token_path: self.token_file,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let http = pipeline::http_client()?;

    match cli.command {
        Commands::Publish {
            library,
            auth,
            staging_dir,
            title_suffix,
            category,
            privacy,
        } => {
            let cfg = Config {
                library: library.into_config(),
                auth: auth.into_config(),
                upload: UploadConfig {
                    template: MetadataTemplate {
                        title_suffix,
                        category_id: category,
                        privacy,
                        ..Default::default()
                    },
                    ..Default::default()
                },
                staging_dir,
            };

            let library = CloudinaryClient::new(http.clone(), cfg.library.clone());
            let credentials = CredentialManager::new(OAuthClient::new(http.clone()), &cfg.auth);
            let uploader = YouTubeClient::new(http, cfg.upload.upload_url.clone());

            let report = pipeline::run(&cfg, &library, &credentials, &uploader)?;
            info!("published '{}' as {}", report.title, report.url());
            println!("{}", report.url());
        }

        Commands::Auth { auth } => {
            let cfg = auth.into_config();
            let credentials = CredentialManager::new(OAuthClient::new(http), &cfg);
            let credential = credentials.obtain()?;
            match credential.expiry {
                Some(expiry) => info!("credential valid until {}", expiry),
                None => info!("credential valid"),
            }
        }

        Commands::List { library } => {
            let cfg = library.into_config();
            let client = CloudinaryClient::new(http, cfg.clone());
            let assets = client.list(&cfg.prefix, cfg.max_results)?;
            info!("{} assets under `{}`", assets.len(), cfg.prefix);
            for asset in &assets {
                println!("{}\t{}", asset.public_id, asset.secure_url);
            }
        }
    }

    Ok(())
}
