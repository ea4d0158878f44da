use crate::{error, info, spotify::Catalog, spotify::SpotifyClient, success, warning};

pub async fn search(title: String, artist: Option<String>) {
    let client = match SpotifyClient::from_env() {
        Ok(client) => client,
        Err(e) => error!("Cannot create Spotify client: {}", e),
    };

    info!(
        "Searching for {} - {}",
        title,
        artist.as_deref().unwrap_or("any artist")
    );

    match client.search_track(&title, artist.as_deref()).await {
        Ok(Some(id)) => success!("{}", id),
        Ok(None) => warning!("Song not found"),
        Err(e) => error!("Search failed: {}", e),
    }
}
