//! Configuration management for songfeat.
//!
//! Values come from, in order of priority:
//! 1. Environment variables
//! 2. The `.env` file in the local data directory (`songfeat/.env`)
//! 3. Built-in defaults (endpoints and batching only; credentials have none)

use std::{env, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Largest number of ids the audio-features endpoint accepts per request.
pub const MAX_FEATURE_CHUNK_SIZE: usize = 100;

/// Loads environment variables from `songfeat/.env` in the local data directory.
///
/// The directory is created if needed. A missing `.env` file is not an error,
/// since every variable can also come from the process environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/songfeat/.env`
/// - macOS: `~/Library/Application Support/songfeat/.env`
/// - Windows: `%LOCALAPPDATA%/songfeat/.env`
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songfeat/.env");
    path
}

/// Returns the Spotify client id (`SPOTIFY_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify client secret (`SPOTIFY_CLIENT_SECRET`).
///
/// Keep this value out of logs and version control.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Returns the Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the token endpoint used for the client credentials grant.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Chunk sizes, pauses and retry budgets for the batching loops.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Rows searched per chunk before pausing.
    pub search_chunk_size: usize,
    /// Pause after each search chunk.
    pub search_chunk_delay: Duration,
    /// Ids per audio-features request, capped at [`MAX_FEATURE_CHUNK_SIZE`].
    pub feature_chunk_size: usize,
    /// Pause after each successful audio-features chunk.
    pub feature_chunk_delay: Duration,
    /// Extra attempts for a search that failed with a transient error.
    pub search_retries: u32,
    /// Rate-limit retries per chunk or row; `None` retries until the provider
    /// stops throttling.
    pub max_rate_limit_retries: Option<u32>,
    /// Draw progress bars on the terminal.
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            search_chunk_size: 50,
            search_chunk_delay: Duration::from_secs(30),
            feature_chunk_size: MAX_FEATURE_CHUNK_SIZE,
            feature_chunk_delay: Duration::from_secs(60),
            search_retries: 2,
            max_rate_limit_retries: None,
            show_progress: true,
        }
    }
}

impl BatchConfig {
    /// Defaults overlaid with the `SONGFEAT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    ///
    /// Unset and empty variables keep the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::Invalid { name, value }),
                _ => Ok(None),
            }
        };

        if let Some(n) = number("SONGFEAT_SEARCH_CHUNK_SIZE")? {
            config.search_chunk_size = n as usize;
        }
        if let Some(secs) = number("SONGFEAT_SEARCH_CHUNK_DELAY_SECS")? {
            config.search_chunk_delay = Duration::from_secs(secs);
        }
        if let Some(n) = number("SONGFEAT_FEATURE_CHUNK_SIZE")? {
            config.feature_chunk_size = n as usize;
        }
        if let Some(secs) = number("SONGFEAT_FEATURE_CHUNK_DELAY_SECS")? {
            config.feature_chunk_delay = Duration::from_secs(secs);
        }
        if let Some(n) = number("SONGFEAT_SEARCH_RETRIES")? {
            config.search_retries = n as u32;
        }
        if let Some(n) = number("SONGFEAT_MAX_RATE_LIMIT_RETRIES")? {
            config.max_rate_limit_retries = Some(n as u32);
        }

        Ok(config.normalized())
    }

    /// Clamps chunk sizes into the range the provider accepts.
    pub fn normalized(mut self) -> Self {
        self.search_chunk_size = self.search_chunk_size.max(1);
        self.feature_chunk_size = self.feature_chunk_size.clamp(1, MAX_FEATURE_CHUNK_SIZE);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BatchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BatchConfig::default());
        assert_eq!(config.search_chunk_size, 50);
        assert_eq!(config.search_chunk_delay, Duration::from_secs(30));
        assert_eq!(config.feature_chunk_size, 100);
        assert_eq!(config.feature_chunk_delay, Duration::from_secs(60));
        assert_eq!(config.max_rate_limit_retries, None);
    }

    #[test]
    fn test_overrides() {
        let config = BatchConfig::from_lookup(lookup(&[
            ("SONGFEAT_SEARCH_CHUNK_SIZE", "20"),
            ("SONGFEAT_SEARCH_CHUNK_DELAY_SECS", "5"),
            ("SONGFEAT_FEATURE_CHUNK_DELAY_SECS", "0"),
            ("SONGFEAT_MAX_RATE_LIMIT_RETRIES", "3"),
            ("SONGFEAT_SEARCH_RETRIES", ""),
        ]))
        .unwrap();
        assert_eq!(config.search_chunk_size, 20);
        assert_eq!(config.search_chunk_delay, Duration::from_secs(5));
        assert_eq!(config.feature_chunk_delay, Duration::ZERO);
        assert_eq!(config.max_rate_limit_retries, Some(3));
        assert_eq!(config.search_retries, 2);
    }

    #[test]
    fn test_feature_chunk_size_is_capped() {
        let config =
            BatchConfig::from_lookup(lookup(&[("SONGFEAT_FEATURE_CHUNK_SIZE", "500")])).unwrap();
        assert_eq!(config.feature_chunk_size, MAX_FEATURE_CHUNK_SIZE);

        let config =
            BatchConfig::from_lookup(lookup(&[("SONGFEAT_FEATURE_CHUNK_SIZE", "0")])).unwrap();
        assert_eq!(config.feature_chunk_size, 1);
    }

    #[test]
    fn test_invalid_number() {
        let err = BatchConfig::from_lookup(lookup(&[("SONGFEAT_SEARCH_CHUNK_SIZE", "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "SONGFEAT_SEARCH_CHUNK_SIZE",
                value: "many".to_string()
            }
        );
    }
}
