//! # Marquee Core
//!
//! Catalog logic on top of the `marquee-model` record types.
//!
//! ## Overview
//!
//! - **Merge engine** ([`merge`]): folds freshly scraped data into a stored
//!   record field by field, reporting whether anything changed and which
//!   image files need to be fetched or removed
//! - **Differ** ([`differ`]): pairs video files with records when their
//!   identifiers do not match exactly
//! - **Catalog** ([`catalog`]): scans the record and video directories and
//!   reads and writes record files
//! - **Lookup tables** ([`db_info`]): country aliases and identifier renames
//! - **Configuration** ([`config`]): where a catalog keeps its files
//!
//! ## Examples
//!
//! ```no_run
//! use marquee_core::{Catalog, CatalogConfig};
//!
//! let config = CatalogConfig::from_dirs(None, None);
//! for movie in Catalog::from_config(&config).load(false) {
//!     println!("{:?} <-> {:?}", movie.video, movie.info);
//! }
//! ```
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod db_info;
pub mod differ;
pub mod error;
pub mod merge;

pub use catalog::{Catalog, FileRef, LoadedMovie};
pub use config::{CatalogConfig, CatalogDirs};
pub use db_info::{Alpha2Aliases, DbInfo, RefRenames};
pub use differ::{MatchCandidate, match_orphans};
pub use error::{CatalogError, MergeError, Result};
pub use merge::{ImageOp, MergePrefs, Merged, Prefer, merge};

pub use marquee_model as model;
