//! Image reconciliation.
//!
//! Highlights and posters are merged per language. The gallery is rebuilt
//! from source addresses: a stored image keeps its address, a highlight
//! displaced by the stored one moves into the gallery, and every gallery
//! entry is renamed after its final position. The file operations needed
//! to bring the image directory in line are collected in the merge context.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use marquee_model::image::DEFAULT_EXTENSION;
use marquee_model::{ImageInfo, ImageUrl, Outcome, PosterSet, TranslatedMap};
use tracing::debug;

use super::{ImageOp, MergeContext, MergeResult, Mergeable, merge_array};

impl Mergeable for ImageUrl {
    fn merge_from(&mut self, incoming: &Self, _: &mut MergeContext) -> MergeResult {
        if self.source().is_some() || self == incoming {
            return Ok(Outcome::Unchanged);
        }
        self.clone_from(incoming);
        Ok(Outcome::Updated)
    }
}

impl Mergeable for PosterSet {
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult {
        let mut outcome = Outcome::Unchanged;
        let fresh = [&incoming.small, &incoming.normal, &incoming.large];
        for (current, fresh) in self.sizes_mut().into_iter().zip(fresh) {
            match (current.as_mut(), fresh) {
                (Some(current), Some(fresh)) => {
                    outcome.absorb(current.merge_from(fresh, ctx)?)
                }
                (None, Some(fresh)) => {
                    *current = Some(fresh.clone());
                    outcome = Outcome::Updated;
                }
                (_, None) => {}
            }
        }
        Ok(outcome)
    }
}

fn merge_languages<V: Mergeable + Clone>(
    stored: &mut TranslatedMap<V>,
    incoming: &TranslatedMap<V>,
    ctx: &mut MergeContext,
) -> MergeResult {
    let mut outcome = Outcome::Unchanged;
    for (lang, fresh) in incoming.iter() {
        match stored.get_mut(lang) {
            Some(current) => outcome.absorb(current.merge_from(fresh, ctx)?),
            None => {
                stored.insert(lang, fresh.clone());
                outcome = Outcome::Updated;
            }
        }
    }
    Ok(outcome)
}

/// Directory part shared by every stored path, with a trailing `/`.
fn gallery_prefix<'a>(paths: impl IntoIterator<Item = &'a str>) -> String {
    let mut common: Option<&str> = None;
    for path in paths {
        common = match common {
            None if path.is_empty() => None,
            None => Some(path),
            Some(prefix) => {
                let len = prefix
                    .chars()
                    .zip(path.chars())
                    .take_while(|(a, b)| a == b)
                    .map(|(a, _)| a.len_utf8())
                    .sum();
                Some(&prefix[..len])
            }
        };
    }

    let mut prefix = common.unwrap_or_default();
    if let Some(pos) = prefix.rfind('/') {
        prefix = &prefix[..pos];
    }
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{prefix}/")
    }
}

fn stored_extension(path: &str) -> String {
    if path.is_empty() {
        return DEFAULT_EXTENSION.to_owned();
    }
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

impl Mergeable for ImageInfo {
    fn merge_from(&mut self, incoming: &Self, ctx: &mut MergeContext) -> MergeResult {
        let before = self.clone();

        merge_languages(&mut self.highlight, &incoming.highlight, ctx)?;
        merge_languages(&mut self.poster, &incoming.poster, ctx)?;

        let mut gallery: Vec<String> = Vec::with_capacity(self.gallery.len());
        let mut stored_paths = BTreeMap::<&str, &str>::new();
        for (lang, highlight) in incoming.highlight.iter() {
            let Some(url) = highlight.source() else {
                continue;
            };
            let kept = self.highlight.get(lang).and_then(ImageUrl::source);
            if kept == Some(url)
                || before.gallery.iter().any(|image| image.source() == Some(url))
                || gallery.iter().any(|known| known == url)
            {
                continue;
            }
            debug!(url, lang, "moving displaced highlight into the gallery");
            gallery.push(url.to_owned());
            stored_paths.insert(url, &highlight.path);
        }

        let mut unused_files = BTreeSet::new();
        for image in &before.gallery {
            if !image.path.is_empty() {
                unused_files.insert(image.path.clone());
            }
            let Some(url) = image.source() else {
                continue;
            };
            if gallery.iter().any(|known| known == url) {
                continue;
            }
            gallery.push(url.to_owned());
            stored_paths.insert(url, &image.path);
        }

        let mut fresh = Vec::with_capacity(incoming.gallery.len());
        let mut fresh_paths = BTreeMap::<&str, &str>::new();
        for image in &incoming.gallery {
            if let Some(url) = image.source() {
                fresh.push(url.to_owned());
                fresh_paths.entry(url).or_insert(&image.path);
            }
        }
        merge_array(&mut gallery, &fresh);

        self.highlight.retain(|_, image| !image.is_empty());
        self.poster.retain(|_, poster| {
            poster.clear_empty();
            !poster.is_empty()
        });

        let prefix = {
            let posters = self
                .poster
                .values()
                .flat_map(|set| [&set.small, &set.normal, &set.large])
                .flatten();
            gallery_prefix(
                self.highlight
                    .values()
                    .chain(posters)
                    .chain(&before.gallery)
                    .map(|image| image.path.as_str()),
            )
        };

        self.gallery = gallery
            .iter()
            .enumerate()
            .map(|(index, url)| {
                let previous = stored_paths
                    .get(url.as_str())
                    .or_else(|| fresh_paths.get(url.as_str()))
                    .copied()
                    .unwrap_or_default();
                let ext = stored_extension(previous);
                let path = format!("{prefix}02-gallery-{index:02}{ext}");
                unused_files.remove(&path);
                ImageUrl::new(path, url.as_str())
            })
            .collect();

        ctx.image_ops
            .extend(unused_files.into_iter().map(|path| ImageOp::Remove { path }));
        ctx.image_ops.extend(self.images().filter_map(|image| {
            let url = image.source()?;
            (!image.path.is_empty()).then(|| ImageOp::Fetch {
                url: url.to_owned(),
                path: image.path.clone(),
            })
        }));

        Ok(Outcome::changed(*self != before))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://img.example.com";

    fn url(name: &str) -> String {
        format!("{HOST}/{name}")
    }

    fn canonical() -> ImageInfo {
        let mut info = ImageInfo::default();
        info.highlight
            .insert("", ImageUrl::new("alien/01-highlight.jpg", url("h.jpg")));
        info.poster.insert(
            "",
            PosterSet {
                normal: Some(ImageUrl::new("alien/00-poster-1_normal.png", url("p.png"))),
                ..PosterSet::default()
            },
        );
        info.gallery = vec![
            ImageUrl::new("alien/02-gallery-00.jpg", url("g0.jpg")),
            ImageUrl::new("alien/02-gallery-01.png", url("g1.png")),
        ];
        info
    }

    #[test]
    fn prefix_is_the_shared_directory() {
        assert_eq!(
            gallery_prefix(["alien/01-highlight.jpg", "alien/02-gallery-00.jpg"]),
            "alien/"
        );
        assert_eq!(gallery_prefix(["", "a/b/x.jpg", "a/b/y.jpg"]), "a/b/");
        assert_eq!(gallery_prefix(["a/x.jpg", "b/y.jpg"]), "");
        assert_eq!(gallery_prefix([]), "");
    }

    #[test]
    fn merging_with_itself_is_a_no_op() {
        let mut info = canonical();
        let mut ctx = MergeContext::default();
        assert_eq!(info.merge_from(&canonical(), &mut ctx).unwrap(), Outcome::Unchanged);
        assert_eq!(info, canonical());
        assert!(!ctx.image_ops.iter().any(|op| matches!(op, ImageOp::Remove { .. })));
        assert_eq!(ctx.image_ops.len(), 4);
    }

    #[test]
    fn displaced_highlight_joins_the_gallery() {
        let mut info = canonical();
        let mut incoming = ImageInfo::default();
        incoming.highlight.insert("", ImageUrl::from_url(url("h2.jpg")));
        incoming.gallery = vec![
            ImageUrl::from_url(url("g1.png")),
            ImageUrl::from_url(url("g2.webp")),
        ];

        let mut ctx = MergeContext::default();
        assert_eq!(info.merge_from(&incoming, &mut ctx).unwrap(), Outcome::Updated);

        assert_eq!(info.highlight.get("").and_then(ImageUrl::source), Some(url("h.jpg").as_str()));
        let gallery: Vec<_> = info
            .gallery
            .iter()
            .map(|image| (image.path.as_str(), image.source().unwrap_or_default()))
            .collect();
        assert_eq!(
            gallery,
            [
                ("alien/02-gallery-00.jpg", url("h2.jpg").as_str()),
                ("alien/02-gallery-01.jpg", url("g0.jpg").as_str()),
                ("alien/02-gallery-02.png", url("g1.png").as_str()),
                ("alien/02-gallery-03.jpg", url("g2.webp").as_str()),
            ]
        );
        // g1.png moved from slot 01 to slot 02
        let removed: Vec<_> = ctx
            .image_ops
            .iter()
            .filter(|op| matches!(op, ImageOp::Remove { .. }))
            .collect();
        assert_eq!(
            removed,
            [&ImageOp::Remove {
                path: "alien/02-gallery-01.png".into()
            }]
        );
        assert!(ctx.image_ops.contains(&ImageOp::Fetch {
            url: url("g2.webp"),
            path: "alien/02-gallery-03.jpg".into(),
        }));
    }

    #[test]
    fn dropped_gallery_files_are_removed() {
        let mut info = canonical();
        info.gallery.insert(0, ImageUrl::from_path("alien/02-gallery-07.jpg"));

        let mut ctx = MergeContext::default();
        assert_eq!(info.merge_from(&canonical(), &mut ctx).unwrap(), Outcome::Updated);

        assert_eq!(info, canonical());
        assert!(ctx.image_ops.contains(&ImageOp::Remove {
            path: "alien/02-gallery-07.jpg".into()
        }));
    }

    #[test]
    fn missing_address_takes_incoming_image() {
        let mut stored = ImageUrl::from_path("old.jpg");
        let incoming = ImageUrl::new("", url("new.jpg"));
        let mut ctx = MergeContext::default();
        assert_eq!(stored.merge_from(&incoming, &mut ctx).unwrap(), Outcome::Updated);
        assert_eq!(stored, incoming);

        let mut known = ImageUrl::new("a.jpg", url("a.jpg"));
        assert_eq!(known.merge_from(&incoming, &mut ctx).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn posters_fill_missing_sizes() {
        let mut stored = PosterSet {
            small: Some(ImageUrl::new("s.jpg", url("s.jpg"))),
            ..PosterSet::default()
        };
        let incoming = PosterSet {
            small: Some(ImageUrl::from_url(url("s2.jpg"))),
            large: Some(ImageUrl::from_url(url("l.jpg"))),
            ..PosterSet::default()
        };
        let mut ctx = MergeContext::default();
        assert_eq!(stored.merge_from(&incoming, &mut ctx).unwrap(), Outcome::Updated);
        assert_eq!(stored.small.as_ref().and_then(ImageUrl::source), Some(url("s.jpg").as_str()));
        assert_eq!(stored.large, incoming.large);
    }
}
