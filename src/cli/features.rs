use std::time::Duration;

use crate::{
    cli::render_table, config::BatchConfig, error, fetcher::FeatureFetcher, info,
    spotify::SpotifyClient, warning,
};

const COLUMNS: [&str; 8] = [
    "id",
    "danceability",
    "energy",
    "valence",
    "tempo",
    "key",
    "mode",
    "duration_ms",
];

pub async fn features(ids: Vec<String>, mut batch: BatchConfig) {
    // nothing follows a single request
    if ids.len() <= batch.feature_chunk_size {
        batch.feature_chunk_delay = Duration::ZERO;
    }

    let client = match SpotifyClient::from_env() {
        Ok(client) => client,
        Err(e) => error!("Cannot create Spotify client: {}", e),
    };

    info!("Fetching audio features for {} ids", ids.len());

    let fetch = FeatureFetcher::new(&client, batch).fetch(&ids).await;

    if !fetch.table.is_empty() {
        println!("{}", render_table(&fetch.table, &COLUMNS, usize::MAX));
    }
    if !fetch.failed.is_empty() {
        warning!("Request failed for: {}", fetch.failed.join(", "));
    }
    if !fetch.missing.is_empty() {
        warning!("No audio features for: {}", fetch.missing.join(", "));
    }
}
