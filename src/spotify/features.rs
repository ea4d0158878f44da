use crate::{
    error::CatalogError,
    spotify::SpotifyClient,
    types::{AudioFeatures, AudioFeaturesResponse},
};

/// Retrieves audio features for a batch of track ids in a single request.
///
/// The endpoint accepts at most 100 ids; chunking is the caller's job. The
/// returned vector follows request order, with `None` wherever Spotify has no
/// features for an id. An empty `ids` slice returns an empty vector without
/// touching the network.
///
/// # Errors
///
/// - [`CatalogError::RateLimited`] on 429, carrying `Retry-After`
/// - [`CatalogError::Http`] on any other non-success status
/// - [`CatalogError::Parse`] when the body is not an audio-features response
pub async fn get_audio_features(
    client: &SpotifyClient,
    ids: &[String],
) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = ids.join(",");
    let response = client.get("/audio-features", &[("ids", ids.as_str())]).await?;

    let body = response
        .json::<AudioFeaturesResponse>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(body.audio_features)
}
