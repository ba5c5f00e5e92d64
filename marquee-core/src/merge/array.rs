//! Order-preserving union of two lists.
//!
//! Both sides are tagged with their position (incoming elements continue
//! the numbering after the stored ones), sorted by value and walked
//! together. Coalesced elements keep the stored position, so the result is
//! the stored list in its original order followed by whatever only the
//! incoming side had, in incoming order.

use marquee_model::{Outcome, VideoMarker};

pub trait ArrayElement: Ord + Clone {
    /// Elements that should collapse into one.
    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }

    /// Whether an equivalent incoming element replaces the stored one (and
    /// moves to its position).
    fn superseded_by(&self, _incoming: &Self) -> bool {
        false
    }
}

impl ArrayElement for String {}

impl ArrayElement for VideoMarker {
    fn equivalent(&self, other: &Self) -> bool {
        VideoMarker::equivalent(self, other)
    }

    fn superseded_by(&self, incoming: &Self) -> bool {
        self.comment != incoming.comment
    }
}

fn indexed<T: Ord + Clone>(values: &[T], offset: usize) -> Vec<(T, usize)> {
    let mut tagged: Vec<_> = values
        .iter()
        .cloned()
        .zip(offset..)
        .collect();
    tagged.sort();
    tagged
}

pub fn merge_array<T: ArrayElement>(old: &mut Vec<T>, new: &[T]) -> Outcome {
    let stored = indexed(old, 0);
    let incoming = indexed(new, stored.len());

    let mut merged = Vec::with_capacity(stored.len() + incoming.len());
    let mut stored_iter = stored.into_iter().peekable();
    let mut incoming_iter = incoming.into_iter().peekable();
    loop {
        let next = match (stored_iter.peek(), incoming_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => stored_iter.next(),
            (None, Some(_)) => incoming_iter.next(),
            (Some((older, _)), Some((newer, _))) if older.equivalent(newer) => {
                let take_new = older.superseded_by(newer);
                let older = stored_iter.next();
                let newer = incoming_iter.next();
                if take_new { newer } else { older }
            }
            (Some((older, _)), Some((newer, _))) if older < newer => stored_iter.next(),
            (Some(_), Some(_)) => incoming_iter.next(),
        };
        merged.extend(next);
    }

    merged.sort_by_key(|(_, index)| *index);
    let merged: Vec<T> = merged.into_iter().map(|(value, _)| value).collect();

    if merged == *old {
        return Outcome::Unchanged;
    }
    *old = merged;
    Outcome::Updated
}

#[cfg(test)]
mod tests {
    use marquee_model::MarkerType;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn appends_new_values_in_incoming_order() {
        let mut old = strings(&["a", "b"]);
        let outcome = merge_array(&mut old, &strings(&["a", "c", "b"]));
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(old, strings(&["a", "b", "c"]));
    }

    #[test]
    fn merging_with_itself_is_a_no_op() {
        let original = strings(&["Sci-Fi", "Horror", "Drama"]);
        let mut old = original.clone();
        assert_eq!(merge_array(&mut old, &original), Outcome::Unchanged);
        assert_eq!(old, original);
    }

    #[test]
    fn stored_order_survives() {
        let mut old = strings(&["z", "m", "a"]);
        let outcome = merge_array(&mut old, &strings(&["b", "a"]));
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(old, strings(&["z", "m", "a", "b"]));
    }

    #[test]
    fn empty_incoming_changes_nothing() {
        let mut old = strings(&["x"]);
        assert_eq!(merge_array(&mut old, &[]), Outcome::Unchanged);
        let mut empty = Vec::new();
        assert_eq!(merge_array(&mut empty, &old), Outcome::Updated);
        assert_eq!(empty, old);
    }

    #[test]
    fn marker_comment_update_moves_to_incoming_position() {
        let credits = VideoMarker::new(MarkerType::Credits, 6000);
        let recap = VideoMarker::new(MarkerType::Recap, 0).until(90);
        let mut old = vec![credits.clone(), recap.clone()];
        let renamed = credits.clone().with_comment("mid-credits");

        let outcome = merge_array(&mut old, &[recap.clone(), renamed.clone()]);

        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(old, [recap.clone(), renamed.clone()]);

        let before = old.clone();
        assert_eq!(merge_array(&mut old, &[renamed]), Outcome::Unchanged);
        assert_eq!(old, before);
    }
}
