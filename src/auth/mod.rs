mod credential;
mod oauth;
mod store;

use std::path::PathBuf;

use chrono::Utc;
use log::{info, warn};
use thiserror::Error;

use crate::config::AuthConfig;

pub use credential::{ClientSecrets, Credential, TokenGrant};
pub use oauth::OAuthClient;
pub use store::CredentialStore;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("refresh token secret is missing or empty")]
    MissingRefreshToken,
    #[error("cannot read client configuration {}: {source}", path.display())]
    ClientSecretsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed client configuration {}: {source}", path.display())]
    ClientSecretsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} must contain a `web` or `installed` client configuration", path.display())]
    MissingClientSection { path: PathBuf },
    #[error("client configuration is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint rejected refresh ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("credential has no refresh token")]
    NoRefreshToken,
    #[error("cannot encode credential: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cannot write credential to {}: {source}", path.display())]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Exchanges a credential's refresh token for a fresh access token.
pub trait TokenEndpoint {
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, AuthError>;
}

/// Produces a valid upload credential, persisting it before handing it out.
///
/// Order of preference:
/// 1. the stored credential, if its access token is still inside the validity window;
/// 2. the stored credential refreshed with its own refresh token;
/// 3. a new credential built from the configured refresh secret and client
///    configuration, refreshed once.
///
/// A failure in step 2 falls through to step 3. A failure in step 3 is fatal.
pub struct CredentialManager<T> {
    endpoint: T,
    store: CredentialStore,
    client_secrets_path: PathBuf,
    refresh_token: Option<String>,
}

impl<T: TokenEndpoint> CredentialManager<T> {
    pub fn new(endpoint: T, cfg: &AuthConfig) -> Self {
        Self {
            endpoint,
            store: CredentialStore::new(&cfg.token_path),
            client_secrets_path: cfg.client_secrets_path.clone(),
            refresh_token: cfg.refresh_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &T {
        &self.endpoint
    }

    pub fn obtain(&self) -> Result<Credential, AuthError> {
        let credential = match self.store.load() {
            Some(stored) if stored.is_valid_at(Utc::now()) => {
                info!("stored access token is still valid");
                Some(stored)
            }
            Some(stored) => self.refresh_stored(stored),
            None => None,
        };

        let credential = match credential {
            Some(c) => c,
            None => self.bootstrap()?,
        };

        self.store.save(&credential)?;
        Ok(credential)
    }

    fn refresh_stored(&self, mut stored: Credential) -> Option<Credential> {
        if stored.refresh_token.is_none() {
            warn!("stored credential is expired and has no refresh token");
            return None;
        }

        info!("access token expired, refreshing with stored refresh token");
        match self.refresh(&mut stored) {
            Ok(()) => {
                info!("access token refreshed");
                Some(stored)
            }
            Err(e) => {
                warn!("refresh with stored token failed: {}", e);
                None
            }
        }
    }

    fn bootstrap(&self) -> Result<Credential, AuthError> {
        info!("no usable stored credential, bootstrapping from refresh secret");
        let refresh_token = self
            .refresh_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingRefreshToken)?;

        let client = ClientSecrets::from_file(&self.client_secrets_path)?;
        let mut credential = Credential::from_refresh_token(refresh_token, client);
        self.refresh(&mut credential)?;
        info!("credential created from refresh secret");
        Ok(credential)
    }

    fn refresh(&self, credential: &mut Credential) -> Result<(), AuthError> {
        let grant = self.endpoint.refresh(credential)?;
        credential.apply(grant, Utc::now());
        Ok(())
    }
}
