//! # Spotify Integration Module
//!
//! This module is the provider layer of songfeat: everything that talks HTTP to
//! the Spotify Web API lives here, behind the [`Catalog`] trait that the
//! batching loops depend on.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (resolver, fetcher, joiner)
//!          ↓
//! Catalog trait
//!          ↓
//! SpotifyClient
//!     ├── Authentication (client credentials, in-memory token)
//!     ├── Track search (title + artist → id)
//!     └── Audio features (≤ 100 ids per request)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Client credentials grant and token lifetime handling. Tokens
//!   are kept in memory only and renewed one minute before they expire.
//! - [`search`] - `GET /search` for a single track. An empty result page is a
//!   normal outcome (`Ok(None)`), not an error.
//! - [`features`] - `GET /audio-features` for a batch of ids. The response keeps
//!   request order and uses `null` for ids without features.
//!
//! ## Error Handling
//!
//! Responses are classified by [`check_status`]:
//! - **429 Too Many Requests** becomes [`CatalogError::RateLimited`] carrying the
//!   `Retry-After` header, so callers can wait and retry the same request.
//! - **401 Unauthorized** drops the cached token so the next call fetches a new
//!   one, and is reported as [`CatalogError::Http`].
//! - **Other non-success statuses** become [`CatalogError::Http`]; 5xx responses
//!   count as transient (see [`CatalogError::is_transient`]).
//! - **Transport failures** surface as [`CatalogError::Request`].
//!
//! No retrying happens here. Retry and pacing policy belong to the resolver
//! and fetcher, which keeps this layer a thin pass-through that a test double
//! can replace.
//!
//! ## Usage
//!
//! ```rust
//! let client = SpotifyClient::from_env()?;
//! let id = client.search_track("Halo", Some("Beyonce")).await?;
//! let features = client.audio_features(&[id.unwrap()]).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderMap, RETRY_AFTER},
};

use crate::{
    config,
    error::{CatalogError, ConfigError},
    types::AudioFeatures,
};

pub mod auth;
pub mod features;
pub mod search;

pub use auth::TokenManager;

/// The two provider operations the batching loops need.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up the best matching track id for `title` (and `artist`, when
    /// given). `Ok(None)` means the provider has no match.
    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<String>, CatalogError>;

    /// Fetches audio features for up to 100 ids, one entry per id in request
    /// order. Ids without features come back as `None`.
    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for &C {
    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        (**self).search_track(title, artist).await
    }

    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        (**self).audio_features(ids).await
    }
}

/// Spotify Web API client authenticated with the client credentials grant.
#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: TokenManager,
}

impl SpotifyClient {
    pub fn new(api_url: String, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Builds a client from `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and the
    /// optional endpoint variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tokens = TokenManager::new(
            config::spotify_apitoken_url(),
            config::spotify_client_id()?,
            config::spotify_client_secret()?,
        );
        Ok(Self::new(config::spotify_apiurl(), tokens))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends an authenticated GET to `path` with `query` and classifies the
    /// response status.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, CatalogError> {
        let token = self.tokens.get_valid_token().await?;
        let response = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        check_status(response).await
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        search::search_track(self, title, artist).await
    }

    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        features::get_audio_features(self, ids).await
    }
}

/// Turns a non-success response into the matching [`CatalogError`].
pub async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::RateLimited {
            retry_after: retry_after(response.headers()),
        });
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CatalogError::Http { status, message });
    }

    Ok(response)
}

/// Reads the `Retry-After` header as a number of seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
