//! Movie record model shared across Marquee crates.
#![allow(missing_docs)]

pub mod crew;
pub mod dates;
pub mod error;
pub mod image;
pub mod json;
pub mod movie;
pub mod outcome;
pub mod title;
pub mod translated;
pub mod video;

// Intentionally curated re-exports for downstream consumers.
pub use crew::{CrewInfo, PersonIdentity, RoleRef};
pub use dates::DatesInfo;
pub use error::{ModelError, Result as ModelResult};
pub use image::{ImageInfo, ImageUrl, PosterSet};
pub use json::{JsonLoad, JsonStore};
pub use movie::MovieRecord;
pub use outcome::{Notes, Outcome};
pub use title::{TitleEntry, TitleMap, UNKNOWN_ORIGINAL};
pub use translated::TranslatedMap;
pub use video::{MarkerType, VideoInfo, VideoMarker};
