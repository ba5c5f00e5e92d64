use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "marqueectl", about = "Movie catalog maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a catalog and report how videos pair with records
    Scan {
        /// Catalog config file; overrides --db and --videos
        #[arg(long)]
        config: Option<PathBuf>,
        /// Database directory holding nfo/ and img/
        #[arg(long)]
        db: Option<PathBuf>,
        /// Video directory
        #[arg(long)]
        videos: Option<PathBuf>,
        /// Write migrated records back instead of listing the reasons
        #[arg(long)]
        store: bool,
    },
    /// Merge a freshly scraped record into a stored one
    Merge {
        /// Stored record
        old: PathBuf,
        /// Incoming record
        new: PathBuf,
        /// Take titles from the incoming record
        #[arg(long)]
        prefer_title: bool,
        /// Take year, runtime and rating from the incoming record
        #[arg(long)]
        prefer_details: bool,
        /// Page the incoming record was scraped from; relative image
        /// addresses are resolved against it
        #[arg(long)]
        referrer: Option<Url>,
        /// Image directory of the movie; gives incoming images their paths
        #[arg(long)]
        image_dir: Option<String>,
        /// Database directory whose country aliases both records are mapped
        /// through
        #[arg(long)]
        db: Option<PathBuf>,
        /// Where to write the merged record (standard output by default)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            config,
            db,
            videos,
            store,
        } => commands::scan(config, db, videos, store),
        Command::Merge {
            old,
            new,
            prefer_title,
            prefer_details,
            referrer,
            image_dir,
            db,
            output,
        } => commands::merge(commands::MergeArgs {
            old,
            new,
            prefer_title,
            prefer_details,
            referrer,
            image_dir,
            db,
            output,
        }),
    }
}
