//! End-to-end enrichment: resolve ids, fetch features, join them back.

use crate::{
    error::TableError,
    fetcher::{FeatureFetch, FeatureFetcher},
    joiner::{JoinType, join},
    pacing::Pacer,
    resolver::{DEFAULT_ARTIST_COLUMN, DEFAULT_TITLE_COLUMN, IdentifierResolver, Resolution},
    spotify::Catalog,
    table::Table,
};

/// Key column of the feature table.
pub const FEATURE_ID_COLUMN: &str = "id";

/// Input column names and join type for [`enrich`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOptions {
    pub title_column: String,
    pub artist_column: String,
    pub how: JoinType,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            artist_column: DEFAULT_ARTIST_COLUMN.to_string(),
            how: JoinType::Inner,
        }
    }
}

/// Everything an enrichment run produced.
#[derive(Debug, Clone)]
pub struct Enrichment {
    /// The clean song table joined with the feature table.
    pub table: Table,
    pub resolution: Resolution,
    pub features: FeatureFetch,
}

impl Enrichment {
    /// One-line account of what was resolved, fetched and lost.
    pub fn summary(&self) -> String {
        format!(
            "{rows} rows: {found} ids found, {missing} not found ({errored} search errors); \
             {records} feature records, {failed} ids in failed chunks, {null} without features; \
             {joined} rows joined",
            rows = self.resolution.identifiers.len(),
            found = self.resolution.found.len(),
            missing = self.resolution.missing(),
            errored = self.resolution.errored.len(),
            records = self.features.columns.len(),
            failed = self.features.failed.len(),
            null = self.features.missing.len(),
            joined = self.table.len(),
        )
    }
}

/// Runs resolver, fetcher and joiner in sequence over `songs`.
///
/// The clean song table (rows with an id) is joined on the resolver's id
/// column against the feature table's `id` column using `options.how`.
pub async fn enrich<C, P, F, Q>(
    resolver: &IdentifierResolver<C, P>,
    fetcher: &FeatureFetcher<F, Q>,
    songs: &Table,
    options: &EnrichOptions,
) -> Result<Enrichment, TableError>
where
    C: Catalog,
    P: Pacer,
    F: Catalog,
    Q: Pacer,
{
    let resolution = resolver
        .resolve(songs, &options.title_column, &options.artist_column)
        .await?;

    let features = fetcher.fetch(&resolution.found).await;

    let table = join(
        &resolution.clean,
        &features.table,
        resolver.id_column_name(),
        FEATURE_ID_COLUMN,
        options.how,
    )?;

    Ok(Enrichment {
        table,
        resolution,
        features,
    })
}
