use std::path::PathBuf;

use tabled::Table as TabledTable;

use crate::{
    cli::{read_table, render_table, write_table},
    config::BatchConfig,
    error,
    fetcher::FeatureFetcher,
    info,
    pipeline::{self, EnrichOptions, Enrichment},
    resolver::IdentifierResolver,
    spotify::SpotifyClient,
    success,
    types::SummaryRow,
    warning,
};

/// Columns shown when the enriched table is printed instead of written.
const PREVIEW_COLUMNS: [&str; 6] = ["danceability", "energy", "valence", "tempo", "key", "mode"];
const PREVIEW_ROWS: usize = 20;

pub async fn enrich(
    input: PathBuf,
    output: Option<PathBuf>,
    options: EnrichOptions,
    id_column: String,
    batch: BatchConfig,
) {
    let songs = match read_table(&input).await {
        Ok(table) => table,
        Err(e) => error!("Cannot read songs from {}: {}", input.display(), e),
    };
    if songs.is_empty() {
        warning!("{} contains no songs", input.display());
    }

    let client = match SpotifyClient::from_env() {
        Ok(client) => client,
        Err(e) => error!("Cannot create Spotify client: {}", e),
    };

    info!(
        "Resolving {} songs in chunks of {} ({}s pause between chunks)",
        songs.len(),
        batch.search_chunk_size,
        batch.search_chunk_delay.as_secs()
    );

    let resolver = IdentifierResolver::new(&client, batch.clone()).id_column(id_column.as_str());
    let fetcher = FeatureFetcher::new(&client, batch);

    let enrichment = match pipeline::enrich(&resolver, &fetcher, &songs, &options).await {
        Ok(enrichment) => enrichment,
        Err(e) => error!("Cannot enrich {}: {}", input.display(), e),
    };

    report(&enrichment);

    match output {
        Some(path) => match write_table(&path, &enrichment.table).await {
            Ok(()) => success!(
                "Wrote {} enriched songs to {}",
                enrichment.table.len(),
                path.display()
            ),
            Err(e) => error!("Cannot write {}: {}", path.display(), e),
        },
        None => {
            let mut columns = vec![
                options.title_column.as_str(),
                options.artist_column.as_str(),
                id_column.as_str(),
            ];
            columns.extend(PREVIEW_COLUMNS);
            println!("{}", render_table(&enrichment.table, &columns, PREVIEW_ROWS));
            if enrichment.table.len() > PREVIEW_ROWS {
                info!(
                    "Showing {} of {} rows, use --output to write all of them",
                    PREVIEW_ROWS,
                    enrichment.table.len()
                );
            }
        }
    }
}

fn report(enrichment: &Enrichment) {
    let resolution = &enrichment.resolution;
    let features = &enrichment.features;

    let rows = vec![
        SummaryRow {
            stage: "songs",
            count: resolution.identifiers.len(),
        },
        SummaryRow {
            stage: "ids found",
            count: resolution.found.len(),
        },
        SummaryRow {
            stage: "ids not found",
            count: resolution.missing(),
        },
        SummaryRow {
            stage: "search errors",
            count: resolution.errored.len(),
        },
        SummaryRow {
            stage: "feature records",
            count: features.columns.len(),
        },
        SummaryRow {
            stage: "ids in failed chunks",
            count: features.failed.len(),
        },
        SummaryRow {
            stage: "ids without features",
            count: features.missing.len(),
        },
        SummaryRow {
            stage: "joined rows",
            count: enrichment.table.len(),
        },
    ];
    println!("{}", TabledTable::new(rows));

    if !features.failed.is_empty() {
        warning!(
            "No features for {} ids because their chunk failed: {}",
            features.failed.len(),
            features.failed.join(", ")
        );
    }
    if !features.missing.is_empty() {
        warning!(
            "Spotify has no features for {} ids: {}",
            features.missing.len(),
            features.missing.join(", ")
        );
    }

    if features.is_complete() && resolution.errored.is_empty() {
        success!("{}", enrichment.summary());
    } else {
        warning!("{}", enrichment.summary());
    }
}
