use std::{path::PathBuf, time::Duration};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use songfeat::{
    cli,
    config::{self, BatchConfig},
    error,
    joiner::JoinType,
    pipeline::EnrichOptions,
    resolver::{DEFAULT_ARTIST_COLUMN, DEFAULT_ID_COLUMN, DEFAULT_TITLE_COLUMN},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add Spotify audio features to a JSON list of songs
    Enrich(EnrichArgs),

    /// Look up the track id of a single song
    Search(SearchArgs),

    /// Print audio features for track ids
    Features(FeaturesArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

/// Overrides for the batching settings from the environment.
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Songs searched per chunk
    #[clap(long)]
    pub search_chunk_size: Option<usize>,

    /// Seconds to pause after each search chunk
    #[clap(long)]
    pub search_delay: Option<u64>,

    /// Ids per audio-features request (at most 100)
    #[clap(long)]
    pub feature_chunk_size: Option<usize>,

    /// Seconds to pause after each audio-features request
    #[clap(long)]
    pub feature_delay: Option<u64>,

    /// Give up on a chunk after this many rate-limit retries
    #[clap(long)]
    pub max_rate_limit_retries: Option<u32>,

    /// Hide progress bars
    #[clap(long, short)]
    pub quiet: bool,
}

impl BatchArgs {
    fn into_config(self) -> BatchConfig {
        let mut config = match BatchConfig::from_env() {
            Ok(config) => config,
            Err(e) => error!("Invalid batch configuration: {}", e),
        };

        if let Some(n) = self.search_chunk_size {
            config.search_chunk_size = n;
        }
        if let Some(secs) = self.search_delay {
            config.search_chunk_delay = Duration::from_secs(secs);
        }
        if let Some(n) = self.feature_chunk_size {
            config.feature_chunk_size = n;
        }
        if let Some(secs) = self.feature_delay {
            config.feature_chunk_delay = Duration::from_secs(secs);
        }
        if self.max_rate_limit_retries.is_some() {
            config.max_rate_limit_retries = self.max_rate_limit_retries;
        }
        if self.quiet {
            config.show_progress = false;
        }
        config.normalized()
    }
}

#[derive(Parser, Debug, Clone)]
pub struct EnrichArgs {
    /// JSON array of song objects
    #[clap(long, short)]
    pub input: PathBuf,

    /// Where to write the enriched songs; prints a preview when omitted
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    #[clap(long, default_value = DEFAULT_TITLE_COLUMN)]
    pub title_column: String,

    #[clap(long, default_value = DEFAULT_ARTIST_COLUMN)]
    pub artist_column: String,

    /// Name of the track id column added to the songs
    #[clap(long, default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Which rows to keep when joining songs with their features
    #[clap(long, value_enum, default_value_t = JoinType::Inner)]
    pub how: JoinType,

    #[clap(flatten)]
    pub batch: BatchArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    #[clap(long, short)]
    pub title: String,

    #[clap(long, short)]
    pub artist: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct FeaturesArgs {
    /// Spotify track ids
    #[clap(required = true)]
    pub ids: Vec<String>,

    #[clap(flatten)]
    pub batch: BatchArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Enrich(opt) => {
            let options = EnrichOptions {
                title_column: opt.title_column,
                artist_column: opt.artist_column,
                how: opt.how,
            };
            cli::enrich(
                opt.input,
                opt.output,
                options,
                opt.id_column,
                opt.batch.into_config(),
            )
            .await
        }
        Command::Search(opt) => cli::search(opt.title, opt.artist).await,
        Command::Features(opt) => cli::features(opt.ids, opt.batch.into_config()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
