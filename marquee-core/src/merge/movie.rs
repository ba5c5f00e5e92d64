use marquee_model::{DatesInfo, MovieRecord, Outcome, VideoInfo};
use tracing::debug;

use super::{
    ImageOp, MergeContext, MergePrefs, MergeResult, Mergeable, merge_array, merge_optional,
    merge_preferred,
};
use crate::error::MergeError;

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub record: MovieRecord,
    pub outcome: Outcome,
    pub image_ops: Vec<ImageOp>,
}

/// Merges `incoming` into a copy of `stored`.
///
/// A failure in any field aborts the whole merge; `stored` is never
/// touched either way.
pub fn merge(
    stored: &MovieRecord,
    incoming: &MovieRecord,
    prefs: MergePrefs,
) -> Result<Merged, MergeError> {
    let mut record = stored.clone();
    let mut ctx = MergeContext::new(prefs);
    let outcome = record.merge_from(incoming, &mut ctx)?;
    Ok(Merged {
        record,
        outcome,
        image_ops: ctx.image_ops,
    })
}

type FieldMerge = fn(&mut MovieRecord, &MovieRecord, &mut MergeContext) -> MergeResult;

const FIELDS: [(&str, FieldMerge); 16] = [
    ("refs", refs),
    ("title", title),
    ("genres", genres),
    ("countries", countries),
    ("age", age),
    ("tags", tags),
    ("episodes", episodes),
    ("crew", crew),
    ("tagline", tagline),
    ("summary", summary),
    ("image", image),
    ("dates", dates),
    ("year", year),
    ("runtime", runtime),
    ("rating", rating),
    ("video", video),
];

impl Mergeable for MovieRecord {
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult {
        let mut outcome = Outcome::Unchanged;
        for (field, merge_field) in FIELDS {
            let changed = merge_field(self, incoming, ctx).map_err(|err| err.at(field))?;
            if changed.is_updated() {
                debug!(field, "field updated by merge");
            }
            outcome.absorb(changed);
        }
        Ok(outcome)
    }
}

fn refs(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    Ok(merge_array(&mut old.refs, &new.refs))
}

fn title(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.title.merge_from(&new.title, ctx)
}

fn genres(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    Ok(merge_array(&mut old.genres, &new.genres))
}

fn countries(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    Ok(merge_array(&mut old.countries, &new.countries))
}

fn age(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    Ok(merge_array(&mut old.age, &new.age))
}

fn tags(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    let outcome = merge_array(&mut old.tags, &new.tags);
    Ok(outcome.and(Outcome::changed(old.dedup_tags())))
}

fn episodes(old: &mut MovieRecord, new: &MovieRecord, _: &mut MergeContext) -> MergeResult {
    Ok(merge_array(&mut old.episodes, &new.episodes))
}

fn crew(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.crew.merge_from(&new.crew, ctx)
}

fn tagline(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.tagline.merge_from(&new.tagline, ctx)
}

fn summary(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.summary.merge_from(&new.summary, ctx)
}

fn image(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.image.merge_from(&new.image, ctx)
}

fn dates(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.dates.merge_from(&new.dates, ctx)
}

fn year(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    Ok(merge_preferred(&mut old.year, &new.year, ctx.prefs.details))
}

fn runtime(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    Ok(merge_preferred(&mut old.runtime, &new.runtime, ctx.prefs.details))
}

fn rating(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    Ok(merge_preferred(&mut old.rating, &new.rating, ctx.prefs.details))
}

fn video(old: &mut MovieRecord, new: &MovieRecord, ctx: &mut MergeContext) -> MergeResult {
    old.video.merge_from(&new.video, ctx)
}

impl Mergeable for DatesInfo {
    fn merge_from(&mut self, incoming: &Self, _: &mut MergeContext) -> MergeResult {
        Ok(merge_optional(&mut self.published, &incoming.published)
            .and(merge_optional(&mut self.stream, &incoming.stream))
            .and(merge_optional(&mut self.poster, &incoming.poster)))
    }
}

impl Mergeable for VideoInfo {
    fn merge_from(&mut self, incoming: &Self, _: &mut MergeContext) -> MergeResult {
        Ok(merge_optional(&mut self.credits, &incoming.credits)
            .and(merge_optional(&mut self.end_of_watch, &incoming.end_of_watch))
            .and(merge_array(&mut self.markers, &incoming.markers)))
    }
}
