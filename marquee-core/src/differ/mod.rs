//! Fuzzy pairing of video files with metadata records.
//!
//! Exact identifier matches are handled by the catalog before this runs;
//! the differ only sees the leftovers on both sides. Every (video, info)
//! pair is scored against the info identifier and each of the record's
//! titles, weak pairs are dropped, and the strongest pairs are accepted
//! greedily so that no identifier is used twice.

pub mod similarity;

use std::collections::{BTreeMap, HashSet};

use marquee_model::MovieRecord;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::debug;

pub use similarity::ratio;

/// Pairs scoring below this are never proposed.
pub const MATCH_THRESHOLD: f64 = 0.8;

/// A proposed pairing. Ordered by ratio, then video, then info.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchCandidate {
    pub ratio: OrderedFloat<f64>,
    pub video: String,
    pub info: String,
}

fn normalize_key(id: &str) -> String {
    id.replace(['-', '_'], " ")
}

fn score(info: &str, record: &MovieRecord, videos: &[(String, String)]) -> Vec<MatchCandidate> {
    let info_key = normalize_key(info);
    let titles: Vec<String> = record
        .title
        .values()
        .map(|title| title.text.to_lowercase())
        .collect();

    videos
        .iter()
        .filter_map(|(video, video_key)| {
            let best = titles
                .iter()
                .map(|title| ratio(title, video_key))
                .fold(ratio(&info_key, video_key), f64::max);
            (best >= MATCH_THRESHOLD).then(|| MatchCandidate {
                ratio: OrderedFloat(best),
                video: video.clone(),
                info: info.to_owned(),
            })
        })
        .collect()
}

/// Pairs unmatched `videos` with unmatched `infos`.
///
/// Accepted identifiers are removed from both lists; infos without a
/// record in `known` are never paired. The result is in descending order.
pub fn match_orphans(
    known: &BTreeMap<String, MovieRecord>,
    infos: &mut Vec<String>,
    videos: &mut Vec<String>,
) -> Vec<MatchCandidate> {
    let video_keys: Vec<(String, String)> = videos
        .iter()
        .map(|video| (video.clone(), normalize_key(video)))
        .collect();

    let mut candidates: Vec<MatchCandidate> = infos
        .par_iter()
        .filter_map(|info| known.get(info).map(|record| (info, record)))
        .flat_map_iter(|(info, record)| score(info, record, &video_keys))
        .collect();
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    let mut used_infos = HashSet::new();
    let mut used_videos = HashSet::new();
    let mut accepted = Vec::new();
    for candidate in candidates {
        if used_infos.contains(&candidate.info) || used_videos.contains(&candidate.video) {
            continue;
        }
        debug!(
            video = %candidate.video,
            info = %candidate.info,
            ratio = candidate.ratio.0,
            "fuzzy match accepted"
        );
        used_infos.insert(candidate.info.clone());
        used_videos.insert(candidate.video.clone());
        accepted.push(candidate);
    }

    infos.retain(|info| !used_infos.contains(info));
    videos.retain(|video| !used_videos.contains(video));
    accepted
}

#[cfg(test)]
mod tests {
    use marquee_model::TitleEntry;

    use super::*;

    fn titled(text: &str) -> MovieRecord {
        let mut record = MovieRecord::default();
        record.title.insert("", TitleEntry::new(text));
        record
    }

    #[test]
    fn keys_use_spaces() {
        assert_eq!(normalize_key("mad-max_fury-road"), "mad max fury road");
    }

    #[test]
    fn titles_are_compared_lowercased() {
        let record = titled("THE THING");
        let videos = vec![("the-thing".to_string(), "the thing".to_string())];
        let found = score("carpenter-1982", &record, &videos);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ratio, OrderedFloat(1.0));
    }

    #[test]
    fn unknown_infos_are_ignored() {
        let known = BTreeMap::new();
        let mut infos = vec!["alien".to_string()];
        let mut videos = vec!["alien".to_string()];
        assert!(match_orphans(&known, &mut infos, &mut videos).is_empty());
        assert_eq!(infos, ["alien"]);
        assert_eq!(videos, ["alien"]);
    }

    #[test]
    fn strongest_pair_wins_and_consumes_both_sides() {
        let known = BTreeMap::from([
            ("alien-1979".to_string(), titled("Alien")),
            ("aliens-1986".to_string(), titled("Aliens")),
        ]);
        let mut infos = vec!["alien-1979".to_string(), "aliens-1986".to_string()];
        let mut videos = vec!["aliens_1986".to_string()];

        let accepted = match_orphans(&known, &mut infos, &mut videos);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].info, "aliens-1986");
        assert_eq!(accepted[0].ratio, OrderedFloat(1.0));
        assert_eq!(infos, ["alien-1979"]);
        assert!(videos.is_empty());
    }
}
