//! Resolving song titles and artists to catalog track ids.

use crate::{
    chunker::chunks,
    config::BatchConfig,
    error::{CatalogError, TableError},
    pacing::{FixedDelayPacer, Pacer},
    spotify::Catalog,
    table::Table,
    utils, warning,
};

/// Name of the identifier column appended to the clean table.
pub const DEFAULT_ID_COLUMN: &str = "song_id";
pub const DEFAULT_TITLE_COLUMN: &str = "Song_title";
pub const DEFAULT_ARTIST_COLUMN: &str = "Artist";

/// Outcome of [`IdentifierResolver::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// One slot per input row, in input order; `None` where no id was found.
    pub identifiers: Vec<Option<String>>,
    /// The present identifiers in input order. Duplicates are kept.
    pub found: Vec<String>,
    /// Copy of the input with the id column appended and unresolved rows
    /// removed.
    pub clean: Table,
    /// Input row indexes whose search failed for a reason other than "no
    /// match" (the row is also `None` in `identifiers`).
    pub errored: Vec<usize>,
}

impl Resolution {
    /// Number of rows without an identifier.
    pub fn missing(&self) -> usize {
        self.identifiers.iter().filter(|id| id.is_none()).count()
    }
}

enum Lookup {
    Found(String),
    NotFound,
    Failed(CatalogError),
}

/// Looks up a track id for every row of a song table, one chunk at a time.
pub struct IdentifierResolver<C, P = FixedDelayPacer> {
    catalog: C,
    pacer: P,
    config: BatchConfig,
    id_column: String,
}

impl<C: Catalog> IdentifierResolver<C> {
    /// Creates a resolver that sleeps `config.search_chunk_delay` after each
    /// chunk.
    pub fn new(catalog: C, config: BatchConfig) -> Self {
        let pacer = FixedDelayPacer::new(config.search_chunk_delay);
        Self::with_pacer(catalog, pacer, config)
    }
}

impl<C: Catalog, P: Pacer> IdentifierResolver<C, P> {
    pub fn with_pacer(catalog: C, pacer: P, config: BatchConfig) -> Self {
        Self {
            catalog,
            pacer,
            config: config.normalized(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
        }
    }

    /// Sets the name of the appended identifier column.
    pub fn id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    pub fn id_column_name(&self) -> &str {
        &self.id_column
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Resolves one identifier per row of `table`.
    ///
    /// The table is split into chunks of `search_chunk_size` rows. Each row is
    /// searched by title and artist; a row with a blank artist is searched by
    /// title alone and a row with a blank title is left unresolved without a
    /// call. After every non-empty chunk the pacer is asked to pause.
    ///
    /// A search without a match, or one that keeps failing, never stops the
    /// run: the row simply gets no identifier. Rate-limited searches wait and
    /// retry the same row; transient failures are retried up to
    /// `search_retries` times.
    ///
    /// # Errors
    ///
    /// Fails before any request when a named column is missing or the id
    /// column already exists.
    pub async fn resolve(
        &self,
        table: &Table,
        title_column: &str,
        artist_column: &str,
    ) -> Result<Resolution, TableError> {
        let title_index = table.column_index(title_column)?;
        let artist_index = table.column_index(artist_column)?;
        if table.columns().contains(&self.id_column) {
            return Err(TableError::DuplicateColumn(self.id_column.clone()));
        }

        let mut resolved = table.clone();
        let pb = utils::progress_bar(table.len() as u64, self.config.show_progress);

        let mut identifiers: Vec<Option<String>> = Vec::with_capacity(table.len());
        let mut errored = Vec::new();

        for (index, chunk) in chunks(table, self.config.search_chunk_size)
            .into_iter()
            .enumerate()
        {
            if chunk.is_empty() {
                continue;
            }
            pb.set_message(format!("Collecting song ids for chunk {}", index));

            for row in chunk.rows() {
                let row_number = identifiers.len();
                let Some(title) = utils::cell_text(&row[title_index]) else {
                    pb.suspend(|| warning!("Row {} has no title, skipping search", row_number));
                    identifiers.push(None);
                    pb.inc(1);
                    continue;
                };
                let artist = utils::cell_text(&row[artist_index]);

                match self.lookup(&title, artist.as_deref()).await {
                    Lookup::Found(id) => identifiers.push(Some(id)),
                    Lookup::NotFound => {
                        pb.suspend(|| {
                            warning!(
                                "Song not found: {} - {}",
                                title,
                                artist.as_deref().unwrap_or("?")
                            )
                        });
                        identifiers.push(None);
                    }
                    Lookup::Failed(e) => {
                        pb.suspend(|| warning!("Search failed for '{}': {}", title, e));
                        errored.push(row_number);
                        identifiers.push(None);
                    }
                }
                pb.inc(1);
            }

            pb.set_message("Sleeping before the next chunk...");
            self.pacer.chunk_done(index).await;
        }
        pb.finish_and_clear();

        let cells = identifiers.iter().map(utils::id_cell).collect();
        resolved.push_column(self.id_column.clone(), cells)?;

        let id_index = resolved.column_index(&self.id_column)?;
        let mut clean = resolved;
        clean.retain_rows(|row| !row[id_index].is_null());

        let found = identifiers.iter().flatten().cloned().collect();

        Ok(Resolution {
            identifiers,
            found,
            clean,
            errored,
        })
    }

    async fn lookup(&self, title: &str, artist: Option<&str>) -> Lookup {
        let mut transient_retries = 0;
        let mut rate_limit_retries = 0;

        loop {
            match self.catalog.search_track(title, artist).await {
                Ok(Some(id)) => return Lookup::Found(id),
                Ok(None) => return Lookup::NotFound,
                Err(CatalogError::RateLimited { retry_after }) => {
                    if self
                        .config
                        .max_rate_limit_retries
                        .is_some_and(|max| rate_limit_retries >= max)
                    {
                        return Lookup::Failed(CatalogError::RateLimited { retry_after });
                    }
                    rate_limit_retries += 1;
                    self.pacer.rate_limited(retry_after).await;
                }
                Err(e) if e.is_transient() && transient_retries < self.config.search_retries => {
                    transient_retries += 1;
                    self.pacer.transient_retry(transient_retries).await;
                }
                Err(e) => return Lookup::Failed(e),
            }
        }
    }
}
