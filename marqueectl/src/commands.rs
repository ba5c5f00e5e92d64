use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use marquee_core::catalog::{self, LoadedMovie};
use marquee_core::model::MovieRecord;
use marquee_core::{Alpha2Aliases, Catalog, CatalogConfig, MergePrefs, Prefer};
use tracing::info;
use url::Url;

pub fn scan(
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    videos: Option<PathBuf>,
    store: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => CatalogConfig::read(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => CatalogConfig::from_dirs(db.as_deref(), videos.as_deref()),
    };
    if let Some(title) = &config.title {
        info!("Catalog: {}", title);
    }

    let movies = Catalog::from_config(&config).load(store);
    for movie in &movies {
        println!("{}", describe(movie));
    }
    Ok(())
}

fn describe(movie: &LoadedMovie) -> String {
    let side = |file: &Option<catalog::FileRef>| {
        file.as_ref()
            .map_or_else(|| "-".to_owned(), |file| file.id.clone())
    };
    let title = movie
        .record
        .title
        .find("")
        .map(|(_, title)| title.text.as_str())
        .unwrap_or_default();
    format!("{} <- {}: {}", side(&movie.info), side(&movie.video), title)
}

pub struct MergeArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    pub prefer_title: bool,
    pub prefer_details: bool,
    pub referrer: Option<Url>,
    pub image_dir: Option<String>,
    pub db: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

fn read_record(path: &Path) -> Result<MovieRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    catalog::deserialize(&text).with_context(|| format!("Failed to load {}", path.display()))
}

fn prefer(theirs: bool) -> Prefer {
    if theirs { Prefer::Theirs } else { Prefer::Mine }
}

pub fn merge(args: MergeArgs) -> Result<()> {
    let mut stored = read_record(&args.old)?;
    let mut incoming = read_record(&args.new)?;
    if let Some(db) = &args.db {
        let aka = Alpha2Aliases::load(db)
            .with_context(|| format!("Failed to load country aliases from {}", db.display()))?;
        for record in [&mut stored, &mut incoming] {
            catalog::map_countries(record, &aka);
        }
    }
    if let Some(referrer) = &args.referrer {
        incoming.image.canonize_urls(referrer);
    }
    if let Some(dirname) = &args.image_dir {
        incoming.image.assign_paths(dirname);
    }

    let prefs = MergePrefs {
        title: prefer(args.prefer_title),
        details: prefer(args.prefer_details),
    };
    let merged = marquee_core::merge(&stored, &incoming, prefs).with_context(|| {
        format!(
            "Failed to merge {} into {}",
            args.new.display(),
            args.old.display()
        )
    })?;

    info!("Merge outcome: {:?}", merged.outcome);
    for op in &merged.image_ops {
        info!("{}", op);
    }

    let text = catalog::serialize(&merged.record)?;
    match &args.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?
        }
        None => print!("{text}"),
    }
    Ok(())
}
