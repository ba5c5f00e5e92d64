//! Catalog configuration.
//!
//! A catalog is described by a small JSON file. Every directory in it is
//! relative to the file's own directory:
//!
//! ```json
//! { "title": "Movies", "path": "library" }
//! { "path": { "db": "meta", "video": "/mnt/videos" } }
//! ```
//!
//! A string `path` names the catalog root (`<root>/db/nfo`, `<root>/db/img`,
//! `<root>/videos`); an object overrides single directories; without a
//! `path` the config directory itself is the root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CatalogError, Result};

pub const DIR_DB: &str = "db";
pub const DIR_NFO: &str = "nfo";
pub const DIR_IMG: &str = "img";
pub const DIR_VIDEOS: &str = "videos";

/// Where a catalog keeps its records, images and videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDirs {
    pub infos: PathBuf,
    pub images: PathBuf,
    pub videos: PathBuf,
}

impl CatalogDirs {
    pub fn under(root: &Path) -> Self {
        let db = root.join(DIR_DB);
        Self {
            infos: db.join(DIR_NFO),
            images: db.join(DIR_IMG),
            videos: root.join(DIR_VIDEOS),
        }
    }

    /// Parent of the record directory, home of the lookup tables.
    pub fn db_root(&self) -> PathBuf {
        self.infos
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DIR_DB))
    }
}

/// Raw configuration as written in the file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
struct FileConfig {
    title: Option<String>,
    path: Option<FilePath>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FilePath {
    Root(PathBuf),
    Dirs(FileDirs),
}

#[derive(Debug, Default, Clone, Deserialize)]
struct FileDirs {
    db: Option<PathBuf>,
    nfo: Option<PathBuf>,
    img: Option<PathBuf>,
    video: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub title: Option<String>,
    pub dirs: CatalogDirs,
}

impl CatalogConfig {
    pub fn read(config_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(config_path).map_err(|source| CatalogError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let raw: FileConfig =
            serde_json::from_str(&text).map_err(|err| CatalogError::Config {
                path: config_path.to_path_buf(),
                reason: err.to_string(),
            })?;
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::resolve(raw, base))
    }

    fn resolve(raw: FileConfig, base: &Path) -> Self {
        let dirs = match raw.path {
            None => CatalogDirs::under(base),
            Some(FilePath::Root(root)) => CatalogDirs::under(&base.join(root)),
            Some(FilePath::Dirs(dirs)) => {
                let defaults = CatalogDirs::under(base);
                let db = dirs.db.map(|db| base.join(db));
                CatalogDirs {
                    infos: dirs
                        .nfo
                        .map(|nfo| base.join(nfo))
                        .or_else(|| db.as_ref().map(|db| db.join(DIR_NFO)))
                        .unwrap_or(defaults.infos),
                    images: dirs
                        .img
                        .map(|img| base.join(img))
                        .or_else(|| db.as_ref().map(|db| db.join(DIR_IMG)))
                        .unwrap_or(defaults.images),
                    videos: dirs
                        .video
                        .map(|video| base.join(video))
                        .unwrap_or(defaults.videos),
                }
            }
        };
        Self {
            title: raw.title,
            dirs,
        }
    }

    /// Config for explicit directories; missing ones default to `db` and
    /// `videos` in the working directory.
    pub fn from_dirs(db: Option<&Path>, videos: Option<&Path>) -> Self {
        let db = db.unwrap_or_else(|| Path::new(DIR_DB));
        Self {
            title: None,
            dirs: CatalogDirs {
                infos: db.join(DIR_NFO),
                images: db.join(DIR_IMG),
                videos: videos
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(DIR_VIDEOS)),
            },
        }
    }
}
