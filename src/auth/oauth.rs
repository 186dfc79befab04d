use log::debug;
use reqwest::blocking::Client;

use super::{AuthError, Credential, TokenEndpoint, TokenGrant};

/// Refreshes credentials against the token endpoint named in each credential.
pub struct OAuthClient {
    http: Client,
}

impl OAuthClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl TokenEndpoint for OAuthClient {
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("refreshing access token at {}", credential.token_uri);
        let res = self
            .http
            .post(&credential.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
            ])
            .send()?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        Ok(res.json()?)
    }
}
