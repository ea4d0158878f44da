use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<TrackMatch>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMatch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Attribute names of an [`AudioFeatures`] record, in column order.
pub const FEATURE_NAMES: [&str; 18] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "type",
    "id",
    "uri",
    "track_href",
    "analysis_url",
    "duration_ms",
    "time_signature",
];

/// One audio-features record as returned by `GET /audio-features`.
///
/// Every attribute is optional so that a record with null fields still
/// decodes; a null field becomes a null cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub key: Option<i64>,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub mode: Option<i64>,
    #[serde(default)]
    pub speechiness: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub instrumentalness: Option<f64>,
    #[serde(default)]
    pub liveness: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub track_href: Option<String>,
    #[serde(default)]
    pub analysis_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub time_signature: Option<i64>,
}

impl AudioFeatures {
    /// All attribute values in [`FEATURE_NAMES`] order.
    pub fn values(&self) -> [Value; 18] {
        [
            Value::from(self.danceability),
            Value::from(self.energy),
            Value::from(self.key),
            Value::from(self.loudness),
            Value::from(self.mode),
            Value::from(self.speechiness),
            Value::from(self.acousticness),
            Value::from(self.instrumentalness),
            Value::from(self.liveness),
            Value::from(self.valence),
            Value::from(self.tempo),
            Value::from(self.kind.clone()),
            Value::from(self.id.clone()),
            Value::from(self.uri.clone()),
            Value::from(self.track_href.clone()),
            Value::from(self.analysis_url.clone()),
            Value::from(self.duration_ms),
            Value::from(self.time_signature),
        ]
    }

    /// Value of a single attribute by name.
    pub fn value(&self, name: &str) -> Option<Value> {
        let index = FEATURE_NAMES.iter().position(|n| *n == name)?;
        self.values().into_iter().nth(index)
    }
}

/// One line of the enrichment report.
#[derive(Tabled)]
pub struct SummaryRow {
    pub stage: &'static str,
    pub count: usize,
}
