use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::config::{GOOGLE_TOKEN_URI, TOKEN_EXPIRY_SKEW_SECS, YOUTUBE_UPLOAD_SCOPE};

/// OAuth credential for the upload API, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credential {
    /// A credential holding only a refresh token; it must be refreshed before use.
    pub fn from_refresh_token(refresh_token: &str, client: ClientSecrets) -> Self {
        Self {
            access_token: None,
            refresh_token: Some(refresh_token.to_string()),
            token_uri: client.token_uri,
            client_id: client.client_id,
            client_secret: client.client_secret,
            expiry: None,
            scopes: vec![YOUTUBE_UPLOAD_SCOPE.to_string()],
        }
    }

    /// True once `now` is inside the skew margin before expiry. No expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && !self.is_expired_at(now)
    }

    /// Fold a token grant into this credential.
    pub fn apply(&mut self, grant: TokenGrant, now: DateTime<Utc>) {
        self.access_token = Some(grant.access_token);
        self.expiry = grant.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(rotated) = grant.refresh_token {
            self.refresh_token = Some(rotated);
        }
        if let Some(scope) = grant.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// Successful response from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth client identity read from a downloaded `client_secret.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSection>,
    installed: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ClientSecretsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    fn from_json(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ClientSecretsFile =
            serde_json::from_str(raw).map_err(|source| ConfigError::ClientSecretsParse {
                path: path.to_path_buf(),
                source,
            })?;

        let section = file
            .web
            .or(file.installed)
            .ok_or_else(|| ConfigError::MissingClientSection {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            client_id: section
                .client_id
                .ok_or(ConfigError::MissingField("client_id"))?,
            client_secret: section
                .client_secret
                .ok_or(ConfigError::MissingField("client_secret"))?,
            token_uri: section
                .token_uri
                .unwrap_or_else(|| GOOGLE_TOKEN_URI.to_string()),
        })
    }
}
