//! Repertoire CLI - statistics ingestion and tree building.
//!
//! Two workflows share one statistics model:
//!
//! 1. **`ingest`**: stream a `pgn-extract --fencomments`-style game dump
//!    into the local SQLite statistics store, one upsert per
//!    (position, next move) pair, committed at byte-volume checkpoints.
//! 2. **`build`**: grow a repertoire tree for one side (its move chosen
//!    by win rate among the most-played candidates, every common
//!    opponent reply branched), reading statistics either from the live
//!    opening explorer or from the local store, then write every
//!    root-to-leaf move path as one line of the output file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use builder::{BuildOptions, RepertoireNode, TreeBuilder};
use explorer::{CorpusFilter, ExplorerClient, RetryPolicy};
use ingest::{IngestOptions, Pipeline};
use store::{Database, SqliteIngestWriter, SqliteStatsRepository};

mod config;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(
    name = "repertoire",
    about = "Build chess opening repertoires from aggregate game statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a preprocessed game dump into the statistics store.
    ///
    /// Counter increments are not idempotent: re-running the same input
    /// against a non-empty store double-counts every outcome tally
    /// (successor-move sets stay correct). Re-ingest from a clean store
    /// when exact counts matter.
    Ingest {
        /// Game dump to read (pgn-extract --fencomments output).
        #[arg(long)]
        pgn: PathBuf,

        /// SQLite database path. Defaults to stats.db in the data
        /// directory.
        #[arg(long)]
        db: Option<PathBuf>,

        /// Reject games whose average rating is below this; games
        /// missing a rating are rejected outright. 0 disables the
        /// filter.
        #[arg(long, default_value_t = 2000)]
        min_rating: u32,

        /// Commit the write transaction each time this many input bytes
        /// have been processed.
        #[arg(long, default_value_t = 4 * 1024 * 1024)]
        checkpoint_bytes: u64,

        /// Mirror every recorded tuple to this file as
        /// rating:fen:result:move lines.
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Build a repertoire tree and write its leaf paths.
    Build {
        /// Root position as a FEN string.
        #[arg(long)]
        fen: String,

        /// Side the repertoire is optimized for.
        #[arg(long, value_enum, default_value_t = Side::White)]
        side: Side,

        /// Where to read statistics from.
        #[arg(long, value_enum, default_value_t = Provider::Explorer)]
        from: Provider,

        /// SQLite database path (store provider only). Defaults to
        /// stats.db in the data directory.
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output file, one space-separated move path per leaf.
        #[arg(long, default_value = "repertoire.txt")]
        out: PathBuf,

        /// Branch into every opponent reply whose share of root games
        /// strictly exceeds this.
        #[arg(long, default_value_t = builder::BuildOptions::default().probability_floor)]
        probability: f64,

        /// Ignore opponent replies with this many games or fewer.
        /// 0 disables the floor.
        #[arg(long, default_value_t = builder::BuildOptions::default().min_games)]
        min_games: u64,

        /// Explorer corpus: comma-separated speed classes.
        #[arg(long, default_value = "blitz,rapid,classical")]
        speeds: String,

        /// Explorer corpus: comma-separated rating bands.
        #[arg(long, default_value = "2200,2500")]
        ratings: String,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for chess::Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => chess::Color::White,
            Side::Black => chess::Color::Black,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Provider {
    /// Live opening-explorer API.
    Explorer,
    /// Local SQLite store populated by `ingest`.
    Store,
}

fn default_db_path() -> PathBuf {
    config::data_dir().join("stats.db")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest {
            pgn,
            db,
            min_rating,
            checkpoint_bytes,
            dump,
        } => run_ingest(pgn, db, min_rating, checkpoint_bytes, dump).await,
        Commands::Build {
            fen,
            side,
            from,
            db,
            out,
            probability,
            min_games,
            speeds,
            ratings,
        } => {
            let options = BuildOptions {
                principal: side.into(),
                probability_floor: probability,
                min_games,
            };
            run_build(fen, from, db, out, options, speeds, ratings).await
        }
    }
}

async fn run_ingest(
    pgn: PathBuf,
    db: Option<PathBuf>,
    min_rating: u32,
    checkpoint_bytes: u64,
    dump: Option<PathBuf>,
) -> anyhow::Result<()> {
    let db_path = db.unwrap_or_else(default_db_path);
    tracing::info!(pgn = %pgn.display(), db = %db_path.display(), "starting ingestion");

    let database = Database::open(&db_path).await?;
    let writer = SqliteIngestWriter::new(&database);

    let input = File::open(&pgn).with_context(|| format!("opening {}", pgn.display()))?;
    let options = IngestOptions {
        min_avg_rating: (min_rating > 0).then_some(min_rating),
        checkpoint_bytes,
    };

    let mut pipeline = Pipeline::new(BufReader::new(input), writer, options);
    if let Some(path) = dump {
        let dump_file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        pipeline = pipeline.with_dump(Box::new(BufWriter::new(dump_file)));
    }

    let report = pipeline.run().await?;
    tracing::info!(
        games_seen = report.games_seen,
        games_ingested = report.games_ingested,
        skipped_rating = report.games_skipped_rating,
        unratable = report.games_unratable,
        malformed = report.games_malformed,
        positions = report.positions_recorded,
        bytes = report.bytes_processed,
        "ingestion finished"
    );
    Ok(())
}

async fn run_build(
    fen: String,
    from: Provider,
    db: Option<PathBuf>,
    out: PathBuf,
    options: BuildOptions,
    speeds: String,
    ratings: String,
) -> anyhow::Result<()> {
    let tree = match from {
        Provider::Explorer => {
            let filter = CorpusFilter {
                speeds,
                ratings,
                ..CorpusFilter::default()
            };
            let client = ExplorerClient::new(filter, RetryPolicy::default());
            TreeBuilder::new(client, options).build(&fen).await?
        }
        Provider::Store => {
            let db_path = db.unwrap_or_else(default_db_path);
            let database = Database::open(&db_path).await?;
            let repo = SqliteStatsRepository::new(database.pool().clone());
            TreeBuilder::new(repo, options).build(&fen).await?
        }
    };

    write_tree(&tree, &out)?;
    tracing::info!(
        nodes = tree.size(),
        out = %out.display(),
        "repertoire written"
    );
    Ok(())
}

fn write_tree(tree: &RepertoireNode, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    builder::write_leaf_lines(tree, &mut out)?;
    out.flush()?;
    Ok(())
}
