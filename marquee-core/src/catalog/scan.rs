//! Directory scanning and identifier bookkeeping.

use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "mkv"];

/// Identifiers of every file under `root` with one of `extensions`.
///
/// An identifier is the path relative to `root` without its extension,
/// with `/` separators. The result is sorted. A missing `root` yields no
/// identifiers.
pub fn scan_ids(root: &Path, extensions: &[&str]) -> Vec<String> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut ids = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if !matches {
            continue;
        }

        let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf)
        else {
            continue;
        };
        let id = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        ids.push(id);
    }

    ids.sort();
    ids
}

/// Moves identifiers present in both sorted lists into the result; the
/// leftovers stay in `infos` and `videos`.
pub fn split_simple(infos: &mut Vec<String>, videos: &mut Vec<String>) -> Vec<String> {
    let mut both = Vec::new();
    let mut infos_left = Vec::new();
    let mut videos_left = Vec::new();

    let mut info_iter = std::mem::take(infos).into_iter().peekable();
    let mut video_iter = std::mem::take(videos).into_iter().peekable();
    loop {
        match (info_iter.peek(), video_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => infos_left.extend(info_iter.next()),
            (None, Some(_)) => videos_left.extend(video_iter.next()),
            (Some(info), Some(video)) if info == video => {
                both.extend(info_iter.next());
                video_iter.next();
            }
            (Some(info), Some(video)) if info < video => infos_left.extend(info_iter.next()),
            (Some(_), Some(_)) => videos_left.extend(video_iter.next()),
        }
    }

    *infos = infos_left;
    *videos = videos_left;
    both
}

/// Display title guessed from a file identifier.
///
/// Identifiers that already contain whitespace are used as they are;
/// otherwise separators become spaces and the first letter is capitalized.
pub fn make_title(id: &str) -> String {
    if id.contains([' ', '\t']) {
        return id.to_owned();
    }

    let spaced = id.replace(['-', '_', '.', '/'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
