#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use songfeat::{
    config::BatchConfig, error::CatalogError, pacing::Pacer, spotify::Catalog, table::Table,
    types::AudioFeatures,
};

/// In-memory catalog: titles map to ids, every id has features unless
/// marked otherwise, and failures can be queued per title or per call.
#[derive(Default)]
pub struct FakeCatalog {
    songs: HashMap<String, String>,
    search_failures: Mutex<HashMap<String, VecDeque<CatalogError>>>,
    feature_script: Mutex<VecDeque<Option<CatalogError>>>,
    without_features: HashSet<String>,
    pub search_calls: Mutex<Vec<(String, Option<String>)>>,
    pub feature_calls: Mutex<Vec<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(mut self, title: &str, id: &str) -> Self {
        self.songs.insert(title.to_string(), id.to_string());
        self
    }

    /// Queues an error for the next search of `title`.
    pub fn fail_search(self, title: &str, error: CatalogError) -> Self {
        self.search_failures
            .lock()
            .unwrap()
            .entry(title.to_string())
            .or_default()
            .push_back(error);
        self
    }

    /// Outcome of successive audio-features calls; `None` succeeds. Calls past
    /// the end of the script succeed.
    pub fn script_features(self, outcomes: Vec<Option<CatalogError>>) -> Self {
        self.feature_script.lock().unwrap().extend(outcomes);
        self
    }

    pub fn without_features(mut self, id: &str) -> Self {
        self.without_features.insert(id.to_string());
        self
    }

    pub fn searches_for(&self, title: &str) -> usize {
        self.search_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == title)
            .count()
    }

    pub fn feature_call_sizes(&self) -> Vec<usize> {
        self.feature_calls.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_track(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((title.to_string(), artist.map(str::to_string)));

        if let Some(error) = self
            .search_failures
            .lock()
            .unwrap()
            .get_mut(title)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(self.songs.get(title).cloned())
    }

    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        self.feature_calls.lock().unwrap().push(ids.to_vec());

        if let Some(Some(error)) = self.feature_script.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(ids
            .iter()
            .map(|id| (!self.without_features.contains(id)).then(|| features_for(id)))
            .collect())
    }
}

/// Deterministic features for `id`.
pub fn features_for(id: &str) -> AudioFeatures {
    AudioFeatures {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:track:{}", id)),
        tempo: Some(100.0 + id.len() as f64),
        energy: Some(0.5),
        kind: Some("audio_features".to_string()),
        duration_ms: Some(200_000),
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaceEvent {
    ChunkDone(usize),
    RateLimited(Option<Duration>),
    TransientRetry(u32),
}

/// Pacer that records what it was asked to do instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    events: Mutex<Vec<PaceEvent>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn chunk_pauses(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PaceEvent::ChunkDone(_)))
            .count()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn chunk_done(&self, index: usize) {
        self.events.lock().unwrap().push(PaceEvent::ChunkDone(index));
    }

    async fn rate_limited(&self, retry_after: Option<Duration>) {
        self.events
            .lock()
            .unwrap()
            .push(PaceEvent::RateLimited(retry_after));
    }

    async fn transient_retry(&self, attempt: u32) {
        self.events
            .lock()
            .unwrap()
            .push(PaceEvent::TransientRetry(attempt));
    }
}

pub fn quiet_config() -> BatchConfig {
    BatchConfig {
        show_progress: false,
        ..Default::default()
    }
}

pub fn rate_limited(secs: u64) -> CatalogError {
    CatalogError::RateLimited {
        retry_after: Some(Duration::from_secs(secs)),
    }
}

pub fn server_error() -> CatalogError {
    CatalogError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "upstream unavailable".to_string(),
    }
}

pub fn bad_request() -> CatalogError {
    CatalogError::Http {
        status: StatusCode::BAD_REQUEST,
        message: "invalid id".to_string(),
    }
}

/// Song table with `Song_title` and `Artist` columns.
pub fn songs(rows: &[(&str, &str)]) -> Table {
    let rows = rows
        .iter()
        .map(|(title, artist)| vec![cell(title), cell(artist)])
        .collect();
    Table::from_rows(["Song_title", "Artist"], rows).unwrap()
}

fn cell(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        json!(text)
    }
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
