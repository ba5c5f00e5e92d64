//! Reconciliation of a stored record with freshly produced data.
//!
//! Every merge works on the stored side in place and reports an [`Outcome`]:
//! `Updated` when anything changed, `Unchanged` otherwise. Callers that need
//! the stored value untouched on failure go through [`merge`], which works
//! on a copy.

pub mod array;
pub mod crew;
pub mod image;
pub mod movie;
pub mod translated;

use std::fmt;

use marquee_model::Outcome;

use crate::error::MergeError;

pub use array::{ArrayElement, merge_array};
pub use movie::{Merged, merge};

pub type MergeResult = std::result::Result<Outcome, MergeError>;

/// Which side wins when both carry a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Prefer {
    /// Keep what is stored; only fill gaps.
    #[default]
    Mine,
    /// Take the incoming value whenever there is one.
    Theirs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePrefs {
    /// Applies to title text, sort keys and the original-title flag.
    pub title: Prefer,
    /// Applies to `year`, `runtime` and `rating`.
    pub details: Prefer,
}

/// File operation implied by an image merge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageOp {
    /// Stored gallery file no longer referenced by the record.
    Remove { path: String },
    /// Image to download from `url` into `path`.
    Fetch { url: String, path: String },
}

impl fmt::Display for ImageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageOp::Remove { path } => write!(f, "rm {path}"),
            ImageOp::Fetch { url, path } => write!(f, "get {url} -> {path}"),
        }
    }
}

/// State threaded through one record merge.
#[derive(Debug, Default)]
pub struct MergeContext {
    pub prefs: MergePrefs,
    pub image_ops: Vec<ImageOp>,
}

impl MergeContext {
    pub fn new(prefs: MergePrefs) -> Self {
        Self {
            prefs,
            image_ops: Vec::new(),
        }
    }
}

pub trait Mergeable {
    /// Folds `incoming` into `self`.
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult;
}

/// Incoming value replaces the stored one.
pub fn merge_scalar<T: PartialEq + Clone>(old: &mut T, new: &T) -> Outcome {
    if old == new {
        return Outcome::Unchanged;
    }
    old.clone_from(new);
    Outcome::Updated
}

/// Incoming value wins when present.
pub fn merge_optional<T: PartialEq + Clone>(old: &mut Option<T>, new: &Option<T>) -> Outcome {
    match new {
        Some(_) => merge_scalar(old, new),
        None => Outcome::Unchanged,
    }
}

/// Either side may win depending on `prefer`; the loser only fills a gap.
pub fn merge_preferred<T: PartialEq + Clone>(
    old: &mut Option<T>,
    new: &Option<T>,
    prefer: Prefer,
) -> Outcome {
    match prefer {
        Prefer::Theirs => merge_optional(old, new),
        Prefer::Mine if old.is_none() => merge_optional(old, new),
        Prefer::Mine => Outcome::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_reports_change() {
        let mut value = 5;
        assert_eq!(merge_scalar(&mut value, &5), Outcome::Unchanged);
        assert_eq!(merge_scalar(&mut value, &7), Outcome::Updated);
        assert_eq!(value, 7);
    }

    #[test]
    fn optional_keeps_old_when_new_is_missing() {
        let mut value = Some(1999);
        assert_eq!(merge_optional(&mut value, &None), Outcome::Unchanged);
        assert_eq!(value, Some(1999));
        assert_eq!(merge_optional(&mut value, &Some(2000)), Outcome::Updated);
        assert_eq!(value, Some(2000));
    }

    #[test]
    fn preference_decides_conflicts() {
        let mut mine = Some(117);
        assert_eq!(
            merge_preferred(&mut mine, &Some(120), Prefer::Mine),
            Outcome::Unchanged
        );
        assert_eq!(mine, Some(117));

        let mut empty = None;
        assert_eq!(
            merge_preferred(&mut empty, &Some(120), Prefer::Mine),
            Outcome::Updated
        );
        assert_eq!(empty, Some(120));

        let mut theirs = Some(117);
        assert_eq!(
            merge_preferred(&mut theirs, &Some(120), Prefer::Theirs),
            Outcome::Updated
        );
        assert_eq!(
            merge_preferred(&mut theirs, &None, Prefer::Theirs),
            Outcome::Unchanged
        );
        assert_eq!(theirs, Some(120));
    }
}
