use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{error::CatalogError, spotify::check_status, types::Token};

/// Seconds before expiry at which a token is considered stale.
const EXPIRY_BUFFER_SECS: u64 = 60;

/// Obtains and caches an app access token via the client credentials grant.
///
/// The token lives in memory only; a fresh one is requested when the cached
/// token is missing, about to expire, or was rejected with 401.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<Token>>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(token_url: String, client_id: String, client_secret: String) -> Self {
        TokenManager {
            http: Client::new(),
            token_url,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    /// Returns a usable access token, requesting a new one if needed.
    pub async fn get_valid_token(&self) -> Result<String, CatalogError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !is_expired(token, now()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    /// Forgets the cached token.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<Token, CatalogError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let response = check_status(response).await.map_err(|e| match e {
            CatalogError::Http { status, message } => {
                CatalogError::Auth(format!("token endpoint returned {}: {}", status, message))
            }
            other => other,
        })?;

        let mut token: Token = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        token.obtained_at = now();
        Ok(token)
    }
}

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_BUFFER_SECS >= token.obtained_at + token.expires_in
}
