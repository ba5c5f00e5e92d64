//! Image references of a record: highlight, posters and gallery.
//!
//! Every image has a `path` relative to the image directory of the catalog
//! and, usually, the `url` it was downloaded from.

use std::path::Path;

use serde_json::Value;
use url::Url;

use crate::error::{ModelError, Result};
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};
use crate::translated::TranslatedMap;

pub const DEFAULT_EXTENSION: &str = ".jpg";

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageUrl {
    pub path: String,
    pub url: Option<String>,
}

impl ImageUrl {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: Some(url.into()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(String::new(), url)
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: None,
        }
    }

    /// Source address, if one is known and non-empty.
    pub fn source(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.source().is_none()
    }
}

fn is_remote(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| url.has_host())
}

impl JsonLoad for ImageUrl {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        if let Some(text) = node.as_str() {
            *self = if is_remote(text) {
                ImageUrl::from_url(text)
            } else {
                ImageUrl::from_path(text)
            };
            return Ok(Outcome::Unchanged);
        }
        if let Some([path, url]) = node.as_array().map(Vec::as_slice)
            && let (Some(path), Some(url)) = (path.as_str(), url.as_str())
        {
            path.clone_into(&mut self.path);
            self.url = (!url.is_empty()).then(|| url.to_owned());
            return Ok(Outcome::Unchanged);
        }
        Err(ModelError::shape("string or [path, url]", node))
    }
}

impl JsonStore for ImageUrl {
    fn store(&self) -> Value {
        match &self.url {
            None => Value::String(self.path.clone()),
            Some(url) if self.path.is_empty() => Value::String(url.clone()),
            Some(url) => Value::Array(vec![
                Value::String(self.path.clone()),
                Value::String(url.clone()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosterSet {
    pub small: Option<ImageUrl>,
    pub normal: Option<ImageUrl>,
    pub large: Option<ImageUrl>,
}

impl PosterSet {
    pub fn sizes(&self) -> [(&'static str, &Option<ImageUrl>); 3] {
        [
            ("small", &self.small),
            ("normal", &self.normal),
            ("large", &self.large),
        ]
    }

    pub fn sizes_mut(&mut self) -> [&mut Option<ImageUrl>; 3] {
        [&mut self.small, &mut self.normal, &mut self.large]
    }

    pub fn is_empty(&self) -> bool {
        self.sizes()
            .iter()
            .all(|(_, image)| image.as_ref().is_none_or(ImageUrl::is_empty))
    }

    /// Drops sizes that carry neither a path nor an address.
    pub fn clear_empty(&mut self) -> bool {
        let mut changed = false;
        for image in self.sizes_mut() {
            if image.as_ref().is_some_and(ImageUrl::is_empty) {
                *image = None;
                changed = true;
            }
        }
        changed
    }
}

impl JsonLoad for PosterSet {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        let mut outcome = Outcome::Absent;
        outcome.absorb(json::load_opt_field(data, "small", &mut self.small, notes)?);
        outcome.absorb(json::load_opt_field(data, "normal", &mut self.normal, notes)?);
        outcome.absorb(json::load_opt_field(data, "large", &mut self.large, notes)?);
        Ok(outcome)
    }
}

impl JsonStore for PosterSet {
    fn store(&self) -> Value {
        let mut data = Object::new();
        for (size, image) in self.sizes() {
            json::store_field(&mut data, size, image);
        }
        json::object_or_null(data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    pub highlight: TranslatedMap<ImageUrl>,
    pub poster: TranslatedMap<PosterSet>,
    pub gallery: Vec<ImageUrl>,
}

impl ImageInfo {
    pub fn is_empty(&self) -> bool {
        self.highlight.is_empty() && self.poster.is_empty() && self.gallery.is_empty()
    }

    /// Every image of the record, highlights first, then posters, then the
    /// gallery.
    pub fn images(&self) -> impl Iterator<Item = &ImageUrl> {
        let posters = self
            .poster
            .values()
            .flat_map(|set| [&set.small, &set.normal, &set.large])
            .flatten();
        self.highlight.values().chain(posters).chain(&self.gallery)
    }

    fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageUrl> {
        let posters = self
            .poster
            .iter_mut()
            .flat_map(|(_, set)| set.sizes_mut())
            .flatten();
        self.highlight
            .iter_mut()
            .map(|(_, image)| image)
            .chain(posters)
            .chain(self.gallery.iter_mut())
    }

    /// Gives every downloadable image its canonical place under `dirname`.
    ///
    /// Non-default languages go into a subdirectory named after the
    /// language. Images without a source address are dropped.
    pub fn assign_paths(&mut self, dirname: &str) {
        self.highlight.retain(|lang, image| {
            place(image, &language_dir(dirname, lang), "01-highlight")
        });

        self.poster.retain(|lang, set| {
            let subdir = language_dir(dirname, lang);
            let names = ["00-poster-0_small", "00-poster-1_normal", "00-poster-2_large"];
            for (slot, filename) in set.sizes_mut().into_iter().zip(names) {
                let kept = slot
                    .as_mut()
                    .is_some_and(|image| place(image, &subdir, filename));
                if !kept {
                    *slot = None;
                }
            }
            !set.is_empty()
        });

        let mut index = 0;
        self.gallery.retain_mut(|image| {
            let kept = place(image, dirname, &format!("02-gallery-{index:02}"));
            if kept {
                index += 1;
            }
            kept
        });
    }

    /// Resolves relative image addresses against the page they came from.
    pub fn canonize_urls(&mut self, base: &Url) {
        for image in self.images_mut() {
            let Some(address) = image.source() else {
                continue;
            };
            if let Ok(resolved) = base.join(address) {
                image.url = Some(resolved.into());
            }
        }
    }
}

fn language_dir(dirname: &str, lang: &str) -> String {
    if lang.is_empty() {
        dirname.to_owned()
    } else {
        format!("{dirname}/{lang}")
    }
}

fn place(image: &mut ImageUrl, dirname: &str, filename: &str) -> bool {
    let Some(address) = image.source() else {
        return false;
    };
    let ext = extension_of(address);
    image.path = format!("{dirname}/{filename}{ext}");
    true
}

/// File extension of the address' path, lower-cased, with `.jpeg` folded into
/// `.jpg` and `.jpg` used when there is none.
pub fn extension_of(address: &str) -> String {
    let path = match Url::parse(address) {
        Ok(url) => url.path().to_owned(),
        Err(_) => address.to_owned(),
    };
    let ext = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    if ext.is_empty() || ext == ".jpeg" {
        DEFAULT_EXTENSION.to_owned()
    } else {
        ext
    }
}

impl JsonLoad for ImageInfo {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        *self = ImageInfo::default();
        let mut outcome = Outcome::Absent;
        outcome.absorb(json::load_translated(data, "highlight", &mut self.highlight, notes)?);
        outcome.absorb(json::load_translated(data, "poster", &mut self.poster, notes)?);
        outcome.absorb(json::load_field(data, "gallery", &mut self.gallery, notes)?);
        Ok(outcome)
    }
}

impl JsonStore for ImageInfo {
    fn store(&self) -> Value {
        let mut data = Object::new();
        json::store_translated(&mut data, "highlight", &self.highlight);
        json::store_translated(&mut data, "poster", &self.poster);
        json::store_field(&mut data, "gallery", &self.gallery);
        json::object_or_null(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn load(node: Value) -> ImageUrl {
        let mut image = ImageUrl::default();
        image.load(&node, &mut Notes::new()).unwrap();
        image
    }

    #[test]
    fn bare_string_is_classified() {
        assert_eq!(
            load(json!("https://img.example.com/a.png")),
            ImageUrl::from_url("https://img.example.com/a.png")
        );
        assert_eq!(load(json!("alien/01-highlight.jpg")), ImageUrl::from_path("alien/01-highlight.jpg"));
        assert_eq!(
            load(json!(["alien/01-highlight.jpg", ""])),
            ImageUrl::from_path("alien/01-highlight.jpg")
        );
    }

    #[test]
    fn stores_shortest_form() {
        let both = ImageUrl::new("alien/a.jpg", "https://img.example.com/a.jpg");
        assert_eq!(both.store(), json!(["alien/a.jpg", "https://img.example.com/a.jpg"]));
        assert_eq!(ImageUrl::from_path("alien/a.jpg").store(), json!("alien/a.jpg"));
        assert_eq!(
            ImageUrl::from_url("https://img.example.com/a.jpg").store(),
            json!("https://img.example.com/a.jpg")
        );
    }

    #[test]
    fn extensions_are_normalized() {
        assert_eq!(extension_of("https://img.example.com/a/B.PNG?size=2"), ".png");
        assert_eq!(extension_of("https://img.example.com/b.jpeg"), ".jpg");
        assert_eq!(extension_of("https://img.example.com/poster"), ".jpg");
    }

    #[test]
    fn assigns_canonical_paths() {
        let mut info = ImageInfo::default();
        info.highlight
            .insert("", ImageUrl::from_url("https://img.example.com/h.png"));
        info.poster.insert(
            "pl",
            PosterSet {
                small: Some(ImageUrl::from_url("https://img.example.com/s.jpeg")),
                normal: Some(ImageUrl::from_path("stale.jpg")),
                large: None,
            },
        );
        info.gallery = vec![
            ImageUrl::from_path("orphan.jpg"),
            ImageUrl::from_url("https://img.example.com/g1.webp"),
            ImageUrl::from_url("https://img.example.com/g2"),
        ];

        info.assign_paths("alien");

        assert_eq!(info.highlight.get("").unwrap().path, "alien/01-highlight.png");
        let poster = info.poster.get("pl").unwrap();
        assert_eq!(poster.small.as_ref().unwrap().path, "alien/pl/00-poster-0_small.jpg");
        assert_eq!(poster.normal, None);
        let paths: Vec<_> = info.gallery.iter().map(|image| image.path.as_str()).collect();
        assert_eq!(paths, ["alien/02-gallery-00.webp", "alien/02-gallery-01.jpg"]);
    }

    #[test]
    fn relative_addresses_are_resolved() {
        let mut info = ImageInfo::default();
        info.gallery.push(ImageUrl::from_url("/media/g1.jpg"));
        info.gallery.push(ImageUrl::from_path("alien/02-gallery-01.jpg"));
        let base = Url::parse("https://movies.example.com/title/alien/").unwrap();

        info.canonize_urls(&base);

        assert_eq!(
            info.gallery[0].url.as_deref(),
            Some("https://movies.example.com/media/g1.jpg")
        );
        assert_eq!(info.gallery[1].url, None);
    }

    #[test]
    fn translated_posters_load() {
        let node = json!({
            "highlight": "https://img.example.com/h.jpg",
            "poster:pl": { "small": ["alien/pl/00-poster-0_small.jpg", "https://img.example.com/s.jpg"] },
            "gallery": ["https://img.example.com/g.jpg"],
        });
        let mut info = ImageInfo::default();
        assert_eq!(info.load(&node, &mut Notes::new()).unwrap(), Outcome::Unchanged);
        assert!(info.poster.get("pl").unwrap().small.is_some());
        assert_eq!(info.store(), node);
    }
}
