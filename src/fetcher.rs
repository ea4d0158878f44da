//! Fetching audio features for resolved track ids.

use serde_json::Value;

use crate::{
    chunker::chunks,
    config::BatchConfig,
    error::CatalogError,
    pacing::{FixedDelayPacer, Pacer, rate_limit_wait},
    spotify::Catalog,
    table::Table,
    types::{AudioFeatures, FEATURE_NAMES},
    utils, warning,
};

/// Audio features laid out column-wise: one value list per attribute in
/// [`FEATURE_NAMES`] order.
///
/// Records are only ever appended whole, so every list has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    values: Vec<Vec<Value>>,
}

impl Default for FeatureColumns {
    fn default() -> Self {
        Self {
            values: vec![Vec::new(); FEATURE_NAMES.len()],
        }
    }
}

impl FeatureColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value to every attribute list.
    pub fn push(&mut self, record: &AudioFeatures) {
        for (column, value) in self.values.iter_mut().zip(record.values()) {
            column.push(value);
        }
    }

    /// Values of attribute `name`, one per record.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        let index = FEATURE_NAMES.iter().position(|n| *n == name)?;
        Some(&self.values[index])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.values[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Value])> {
        FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// The same data as a table, one row per record.
    pub fn to_table(&self) -> Table {
        let rows = (0..self.len())
            .map(|row| self.values.iter().map(|column| column[row].clone()).collect())
            .collect();
        Table::from_parts(FEATURE_NAMES.iter().map(|n| n.to_string()).collect(), rows)
    }
}

/// Outcome of [`FeatureFetcher::fetch`].
#[derive(Debug, Clone)]
pub struct FeatureFetch {
    pub columns: FeatureColumns,
    pub table: Table,
    /// Ids whose chunk failed with an error other than rate limiting.
    pub failed: Vec<String>,
    /// Ids the provider answered with a null record.
    pub missing: Vec<String>,
}

impl FeatureFetch {
    /// `true` when every requested id produced a record.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.missing.is_empty()
    }
}

/// Retrieves audio features for a list of ids in provider-sized chunks.
pub struct FeatureFetcher<C, P = FixedDelayPacer> {
    catalog: C,
    pacer: P,
    config: BatchConfig,
}

impl<C: Catalog> FeatureFetcher<C> {
    /// Creates a fetcher that sleeps `config.feature_chunk_delay` after each
    /// successful chunk.
    pub fn new(catalog: C, config: BatchConfig) -> Self {
        let pacer = FixedDelayPacer::new(config.feature_chunk_delay);
        Self::with_pacer(catalog, pacer, config)
    }
}

impl<C: Catalog, P: Pacer> FeatureFetcher<C, P> {
    pub fn with_pacer(catalog: C, pacer: P, config: BatchConfig) -> Self {
        Self {
            catalog,
            pacer,
            config: config.normalized(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Fetches features for `ids`, which may contain duplicates.
    ///
    /// Each chunk of up to `feature_chunk_size` ids is one provider call.
    /// - On success every returned record is appended and the pacer pauses.
    /// - On a rate-limit response the pacer waits and the same chunk is tried
    ///   again; nothing from the throttled attempt is kept.
    /// - On any other error the chunk's ids are reported in
    ///   [`FeatureFetch::failed`] and the next chunk starts immediately.
    ///
    /// The run always completes; check [`FeatureFetch::is_complete`] before
    /// assuming one row per id.
    pub async fn fetch(&self, ids: &[String]) -> FeatureFetch {
        let mut columns = FeatureColumns::new();
        let mut failed = Vec::new();
        let mut missing = Vec::new();
        let pb = utils::progress_bar(ids.len() as u64, self.config.show_progress);

        for (index, chunk) in chunks(ids, self.config.feature_chunk_size)
            .into_iter()
            .enumerate()
        {
            if chunk.is_empty() {
                continue;
            }
            pb.set_message(format!("Retrieving audio features from chunk {}", index));

            let mut rate_limit_retries = 0;
            loop {
                match self.catalog.audio_features(&chunk).await {
                    Ok(records) => {
                        collect_records(&chunk, records, &mut columns, &mut missing);
                        pb.inc(chunk.len() as u64);
                        pb.set_message("Sleeping before the next chunk...");
                        self.pacer.chunk_done(index).await;
                        break;
                    }
                    Err(CatalogError::RateLimited { retry_after }) => {
                        if self
                            .config
                            .max_rate_limit_retries
                            .is_some_and(|max| rate_limit_retries >= max)
                        {
                            pb.suspend(|| {
                                warning!(
                                    "Chunk {} still rate limited after {} retries, skipping it",
                                    index,
                                    rate_limit_retries
                                )
                            });
                            failed.extend(chunk.iter().cloned());
                            pb.inc(chunk.len() as u64);
                            break;
                        }
                        rate_limit_retries += 1;
                        pb.suspend(|| {
                            warning!(
                                "Rate limited. Retrying after {} seconds.",
                                rate_limit_wait(retry_after).as_secs()
                            )
                        });
                        self.pacer.rate_limited(retry_after).await;
                    }
                    Err(e) => {
                        pb.suspend(|| {
                            warning!("Failed to get audio features for chunk {}: {}", index, e)
                        });
                        failed.extend(chunk.iter().cloned());
                        pb.inc(chunk.len() as u64);
                        break;
                    }
                }
            }
        }
        pb.finish_and_clear();

        let table = columns.to_table();
        FeatureFetch {
            columns,
            table,
            failed,
            missing,
        }
    }
}

/// Appends the records of one successful chunk, pairing them with the
/// submitted ids by position.
fn collect_records(
    chunk: &[String],
    records: Vec<Option<AudioFeatures>>,
    columns: &mut FeatureColumns,
    missing: &mut Vec<String>,
) {
    if records.len() > chunk.len() {
        warning!(
            "Provider returned {} records for {} ids, ignoring the extra ones",
            records.len(),
            chunk.len()
        );
    }

    let mut records = records.into_iter();
    for id in chunk {
        match records.next().flatten() {
            Some(record) => {
                if record.id.as_deref() != Some(id.as_str()) {
                    warning!(
                        "Audio features for {} came back with id {:?}",
                        id,
                        record.id
                    );
                }
                columns.push(&record);
            }
            None => missing.push(id.clone()),
        }
    }
}
