use crate::{
    error::CatalogError,
    spotify::SpotifyClient,
    types::SearchResponse,
};

/// Searches the catalog for one track and returns its id.
///
/// The query uses Spotify's field filters: `track:{title} artist:{artist}`, or
/// only `track:{title}` when no artist is given. Only the first match is
/// requested (`limit=1`).
///
/// # Returns
///
/// - `Ok(Some(id))` - the first matching track
/// - `Ok(None)` - the search returned no tracks
/// - `Err(CatalogError)` - throttling, HTTP, transport or decoding failure
pub async fn search_track(
    client: &SpotifyClient,
    title: &str,
    artist: Option<&str>,
) -> Result<Option<String>, CatalogError> {
    let query = build_query(title, artist);
    let response = client
        .get("/search", &[("q", query.as_str()), ("type", "track"), ("limit", "1")])
        .await?;

    let body = response
        .json::<SearchResponse>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(first_track_id(body))
}

/// Builds the field-filtered search query for a title and optional artist.
pub fn build_query(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(artist) => format!("track:{} artist:{}", title.trim(), artist),
        None => format!("track:{}", title.trim()),
    }
}

fn first_track_id(response: SearchResponse) -> Option<String> {
    response.tracks.items.into_iter().next().map(|t| t.id)
}
