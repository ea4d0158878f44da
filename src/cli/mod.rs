//! # CLI Module
//!
//! User-facing commands of the `songfeat` binary. Each command loads what it
//! needs (input files, client credentials), calls into the library, and
//! presents the result with the crate's console macros and tables.
//!
//! ## Commands
//!
//! - [`enrich`] - Resolve ids for a JSON song list, fetch features, join, write
//! - [`search`] - Look up the track id for a single title/artist pair
//! - [`features`] - Fetch and print audio features for given ids
//!
//! ## File Format
//!
//! Input and output files are JSON arrays of objects, one object per row.
//! Keys become columns in first-seen order; a missing key is a null cell.
//!
//! ## Error Handling
//!
//! Problems that prevent a command from running at all (unreadable input,
//! missing credentials, unknown columns) end the process through `error!`.
//! Per-song and per-chunk failures are reported as warnings and summarized at
//! the end; the command still writes whatever it could enrich.

mod enrich;
mod features;
mod search;

pub use enrich::enrich;
pub use features::features;
pub use search::search;

use std::path::Path;

use tabled::builder::Builder;

use crate::{
    Res,
    table::{Table, display_cell},
};

/// Reads a JSON array of objects into a table.
pub async fn read_table(path: &Path) -> Res<Table> {
    let content = async_fs::read_to_string(path).await?;
    let records: serde_json::Value = serde_json::from_str(&content)?;
    Ok(Table::from_records(&records)?)
}

/// Writes a table as a pretty-printed JSON array of objects.
pub async fn write_table(path: &Path, table: &Table) -> Res<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            async_fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(&table.to_records())?;
    async_fs::write(path, json).await?;
    Ok(())
}

/// Renders the given columns of `table` (those that exist) for the terminal,
/// showing at most `limit` rows.
pub fn render_table(table: &Table, columns: &[&str], limit: usize) -> String {
    let shown: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| table.column_index(c).is_ok())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(shown.iter().map(|c| c.to_string()));
    for row in 0..table.len().min(limit) {
        builder.push_record(shown.iter().map(|c| {
            table
                .get(row, c)
                .map(display_cell)
                .unwrap_or_default()
        }));
    }
    builder.build().to_string()
}
