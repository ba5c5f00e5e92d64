//! File-backed movie catalog.
//!
//! Loading pairs every record under the info directory with a video file.
//! Identical identifiers pair first, the [differ](crate::differ) proposes
//! pairs among the leftovers, and whatever is still unpaired is reported on
//! its own.

pub mod scan;
pub mod store;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use marquee_model::{MovieRecord, Notes, Outcome, TitleEntry};
use tracing::{debug, info, warn};

use crate::config::{CatalogConfig, CatalogDirs};
use crate::db_info::Alpha2Aliases;
use crate::differ;
use crate::error::Result;

pub use scan::{make_title, split_simple};
pub use store::{deserialize, map_countries, serialize};

/// A file backing one side of a [`LoadedMovie`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: String,
    /// Last modification, whole seconds. `None` when the file is missing.
    pub mtime: Option<DateTime<Utc>>,
}

impl FileRef {
    fn of(path: &Path, id: &str) -> Self {
        let mtime = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(|time| DateTime::<Utc>::from(time).trunc_subsecs(0));
        Self {
            id: id.to_owned(),
            mtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMovie {
    pub record: MovieRecord,
    pub video: Option<FileRef>,
    pub info: Option<FileRef>,
}

impl LoadedMovie {
    /// A record holding only a title guessed from whichever file exists.
    pub fn empty(video: Option<FileRef>, info: Option<FileRef>) -> Self {
        let mut record = MovieRecord::default();
        if let Some(file) = video.as_ref().or(info.as_ref()) {
            record.title.insert("", TitleEntry::new(make_title(&file.id)));
        }
        Self {
            record,
            video,
            info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    dirs: CatalogDirs,
    aka: Alpha2Aliases,
}

impl Catalog {
    /// Opens a catalog, reading the country aliases next to the records.
    /// Without an alias table countries are left as they are.
    pub fn open(dirs: CatalogDirs) -> Self {
        let aka = match Alpha2Aliases::load(&dirs.db_root()) {
            Ok(aka) => aka,
            Err(err) => {
                debug!("No country aliases: {}", err);
                Alpha2Aliases::default()
            }
        };
        Self::with_aliases(dirs, aka)
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::open(config.dirs.clone())
    }

    pub fn with_aliases(dirs: CatalogDirs, aka: Alpha2Aliases) -> Self {
        Self { dirs, aka }
    }

    pub fn dirs(&self) -> &CatalogDirs {
        &self.dirs
    }

    pub fn aliases(&self) -> &Alpha2Aliases {
        &self.aka
    }

    pub fn load_record(&self, id: &str, notes: &mut Notes) -> Result<(MovieRecord, Outcome)> {
        store::load_record(&self.dirs.infos, id, &self.aka, notes)
    }

    pub fn store_record(&self, id: &str, record: &MovieRecord) -> Result<()> {
        store::store_record(&self.dirs.infos, id, record)
    }

    pub fn info_ref(&self, id: &str) -> FileRef {
        FileRef::of(&store::record_path(&self.dirs.infos, id), id)
    }

    /// Prefers an `.mp4` file, then `.mkv`.
    pub fn video_ref(&self, id: &str) -> FileRef {
        let candidates = scan::VIDEO_EXTENSIONS
            .map(|ext| self.dirs.videos.join(format!("{id}.{ext}")));
        let path = candidates
            .iter()
            .find(|path| path.exists())
            .unwrap_or(&candidates[0]);
        FileRef::of(path, id)
    }

    /// Every readable record, by identifier.
    ///
    /// Records that needed a migration are written back when
    /// `store_updates` is set; otherwise the reasons are logged. Records
    /// that fail to load are skipped.
    pub fn known_movies(&self, store_updates: bool) -> BTreeMap<String, MovieRecord> {
        let mut known = BTreeMap::new();
        for id in scan::scan_ids(&self.dirs.infos, &[store::RECORD_EXTENSION]) {
            let mut notes = Notes::new();
            let (record, outcome) = match self.load_record(&id, &mut notes) {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!("Skipping {}: {}", id, err);
                    continue;
                }
            };

            if outcome.is_updated() {
                if store_updates {
                    match self.store_record(&id, &record) {
                        Ok(()) => debug!("Stored migrated record {}", id),
                        Err(err) => warn!("Cannot store {}: {}", id, err),
                    }
                } else {
                    info!("{}:{}", id, notes);
                }
            }
            known.insert(id, record);
        }
        known
    }

    pub fn downloaded_movies(&self) -> Vec<String> {
        scan::scan_ids(&self.dirs.videos, &scan::VIDEO_EXTENSIONS)
    }

    /// Loads the whole catalog: exact pairs, fuzzy pairs, videos without a
    /// record, then records without a video.
    pub fn load(&self, store_updates: bool) -> Vec<LoadedMovie> {
        let mut known = self.known_movies(store_updates);
        let mut infos: Vec<String> = known.keys().cloned().collect();
        let mut videos = self.downloaded_movies();

        let both = split_simple(&mut infos, &mut videos);
        let matching = differ::match_orphans(&known, &mut infos, &mut videos);

        info!(
            "Catalog scan: {} exact, {} fuzzy, {} videos without info, {} infos without video",
            both.len(),
            matching.len(),
            videos.len(),
            infos.len()
        );

        let mut movies =
            Vec::with_capacity(both.len() + matching.len() + videos.len() + infos.len());
        let mut paired = |video: Option<FileRef>, info_id: &str| {
            let info = Some(self.info_ref(info_id));
            match known.remove(info_id) {
                Some(record) => LoadedMovie {
                    record,
                    video,
                    info,
                },
                None => LoadedMovie::empty(video, info),
            }
        };

        for id in &both {
            movies.push(paired(Some(self.video_ref(id)), id));
        }
        for candidate in &matching {
            movies.push(paired(Some(self.video_ref(&candidate.video)), &candidate.info));
        }
        for id in &videos {
            movies.push(LoadedMovie::empty(Some(self.video_ref(id)), None));
        }
        for id in &infos {
            movies.push(paired(None, id));
        }
        movies
    }
}
