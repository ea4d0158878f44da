//! songfeat library
//!
//! Resolves Spotify track ids for a table of song titles and artists, fetches
//! their audio features in rate-limit friendly batches, and joins the features
//! back onto the songs.
//!
//! # Modules
//!
//! - `chunker` - Splitting lists and tables into provider-sized chunks
//! - `cli` - Command-line interface implementations
//! - `config` - Environment variables and batching configuration
//! - `error` - Error types
//! - `fetcher` - Batched audio-feature retrieval
//! - `joiner` - Relational join of two tables
//! - `pacing` - Pauses between chunks and after throttling
//! - `pipeline` - Resolve, fetch and join in one call
//! - `resolver` - Batched title/artist to track id resolution
//! - `spotify` - Spotify Web API client
//! - `table` - Row-oriented table of JSON cells
//! - `types` - Wire and record types
//! - `utils` - Small helpers shared by the batching loops
//!
//! # Example
//!
//! ```
//! use songfeat::{config::BatchConfig, fetcher::FeatureFetcher, pipeline, resolver::IdentifierResolver};
//!
//! let client = songfeat::spotify::SpotifyClient::from_env()?;
//! let batch = BatchConfig::from_env()?;
//! let resolver = IdentifierResolver::new(&client, batch.clone());
//! let fetcher = FeatureFetcher::new(&client, batch);
//! let enriched = pipeline::enrich(&resolver, &fetcher, &songs, &Default::default()).await?;
//! ```

pub mod chunker;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod joiner;
pub mod pacing;
pub mod pipeline;
pub mod resolver;
pub mod spotify;
pub mod table;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the command layer.
///
/// Library operations return their own error enums from [`error`]; the CLI
/// combines them behind this boxed error.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Reading {} songs", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the binary; library code reports errors through
/// return values.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems such as a song that could not be found or a
/// chunk that was skipped.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
