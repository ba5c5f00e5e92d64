use serde_json::Value;

use crate::crew::CrewInfo;
use crate::dates::DatesInfo;
use crate::error::Result;
use crate::image::ImageInfo;
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};
use crate::title::{self, TitleMap};
use crate::translated::TranslatedMap;
use crate::video::VideoInfo;

/// Metadata of a single movie, as kept in `<db>/nfo/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieRecord {
    pub refs: Vec<String>,
    pub title: TitleMap,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub age: Vec<String>,
    pub tags: Vec<String>,
    pub episodes: Vec<String>,
    pub crew: CrewInfo,
    pub tagline: TranslatedMap<String>,
    pub summary: TranslatedMap<String>,
    pub image: ImageInfo,
    pub dates: DatesInfo,
    pub year: Option<u32>,
    pub runtime: Option<u32>,
    pub rating: Option<u32>,
    pub video: VideoInfo,
}

impl MovieRecord {
    pub fn add_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_owned());
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|known| known == tag) {
            self.tags.remove(pos);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|known| known == tag)
    }

    /// Removes repeated tags, keeping the first occurrence of each.
    pub fn dedup_tags(&mut self) -> bool {
        let before = self.tags.len();
        let mut seen = Vec::with_capacity(before);
        self.tags.retain(|tag| {
            if seen.contains(tag) {
                false
            } else {
                seen.push(tag.clone());
                true
            }
        });
        self.tags.len() != before
    }

    pub fn from_value(node: &Value, notes: &mut Notes) -> Result<(Self, Outcome)> {
        let mut record = MovieRecord::default();
        let outcome = record.load(node, notes)?;
        Ok((record, outcome))
    }

    pub fn to_value(&self) -> Value {
        let node = self.store();
        if node.is_null() {
            Value::Object(Object::new())
        } else {
            node
        }
    }
}

impl JsonLoad for MovieRecord {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        *self = MovieRecord::default();

        let mut outcome = Outcome::Unchanged;
        outcome.absorb(json::load_field(data, "refs", &mut self.refs, notes)?);
        outcome.absorb(json::load_translated(data, "title", &mut self.title, notes)?);
        outcome.absorb(title::load_legacy_title(data, &mut self.title, notes)?);
        outcome.absorb(json::load_field(data, "genres", &mut self.genres, notes)?);
        outcome.absorb(json::load_field(data, "countries", &mut self.countries, notes)?);
        outcome.absorb(json::load_list_or_value(data, "age", &mut self.age, notes)?);
        outcome.absorb(json::load_field(data, "tags", &mut self.tags, notes)?);
        outcome.absorb(json::load_field(data, "episodes", &mut self.episodes, notes)?);
        outcome.absorb(self.crew.load_from_record(data, notes)?);
        outcome.absorb(json::load_translated(data, "tagline", &mut self.tagline, notes)?);
        outcome.absorb(json::load_translated(data, "summary", &mut self.summary, notes)?);
        outcome.absorb(json::load_field(data, "image", &mut self.image, notes)?);
        outcome.absorb(json::load_field(data, "dates", &mut self.dates, notes)?);
        outcome.absorb(json::load_opt_field(data, "year", &mut self.year, notes)?);
        outcome.absorb(json::load_opt_field(data, "runtime", &mut self.runtime, notes)?);
        outcome.absorb(json::load_opt_field(data, "rating", &mut self.rating, notes)?);
        outcome.absorb(json::load_field(data, "video", &mut self.video, notes)?);

        outcome.absorb(title::drop_unneeded_original(&mut self.title, notes));
        if self.dedup_tags() {
            notes.push("Duplicate tags found");
            outcome = Outcome::Updated;
        }
        Ok(outcome)
    }
}

impl JsonStore for MovieRecord {
    fn store(&self) -> Value {
        let mut data = Object::new();
        json::store_field(&mut data, "refs", &self.refs);
        json::store_translated(&mut data, "title", &self.title);
        json::store_field(&mut data, "genres", &self.genres);
        json::store_field(&mut data, "countries", &self.countries);
        json::store_field(&mut data, "age", &self.age);
        json::store_field(&mut data, "tags", &self.tags);
        json::store_field(&mut data, "episodes", &self.episodes);
        json::store_field(&mut data, "crew", &self.crew);
        json::store_translated(&mut data, "tagline", &self.tagline);
        json::store_translated(&mut data, "summary", &self.summary);
        json::store_field(&mut data, "image", &self.image);
        json::store_field(&mut data, "dates", &self.dates);
        json::store_field(&mut data, "year", &self.year);
        json::store_field(&mut data, "runtime", &self.runtime);
        json::store_field(&mut data, "rating", &self.rating);
        json::store_field(&mut data, "video", &self.video);
        json::object_or_null(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::crew::{PersonIdentity, RoleRef};
    use crate::title::TitleEntry;

    fn alien() -> Value {
        json!({
            "refs": ["imdb:tt0078748"],
            "title": { "text": "Alien", "original": true },
            "title:pl": "Obcy - 8. pasażer Nostromo",
            "genres": ["Horror", "Sci-Fi"],
            "countries": ["GB", "US"],
            "age": ["R"],
            "tags": ["classic"],
            "crew": {
                "directors": [0],
                "cast": [[1, "Ripley"]],
                "names": [["Ridley Scott", "imdb:nm0000631"], "Sigourney Weaver"],
            },
            "tagline": "In space no one can hear you scream.",
            "dates": { "published": 296_697_600 },
            "year": 1979,
            "runtime": 117,
            "video": { "credits": 6600 },
        })
    }

    #[test]
    fn loads_and_stores_the_same_document() {
        let mut notes = Notes::new();
        let (record, outcome) = MovieRecord::from_value(&alien(), &mut notes).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(notes.is_empty());
        assert_eq!(record.title.get(""), Some(&TitleEntry::new("Alien").original()));
        assert_eq!(record.crew.cast, [RoleRef::with_contribution(1, "Ripley")]);
        assert_eq!(
            record.crew.names[0],
            PersonIdentity::with_refs("Ridley Scott", ["imdb:nm0000631"])
        );
        assert_eq!(record.year, Some(1979));
        assert_eq!(record.to_value(), alien());
    }

    #[test]
    fn empty_record_stores_as_empty_object() {
        assert_eq!(MovieRecord::default().to_value(), json!({}));
        let (record, outcome) = MovieRecord::from_value(&json!({}), &mut Notes::new()).unwrap();
        assert_eq!(record, MovieRecord::default());
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn duplicate_tags_are_dropped_on_load() {
        let mut notes = Notes::new();
        let (record, outcome) =
            MovieRecord::from_value(&json!({ "tags": ["a", "b", "a"] }), &mut notes).unwrap();
        assert_eq!(record.tags, ["a", "b"]);
        assert_eq!(outcome, Outcome::Updated);
    }

    #[test]
    fn tag_helpers_keep_tags_unique() {
        let mut record = MovieRecord::default();
        record.add_tag("watched");
        record.add_tag("watched");
        record.add_tag("favourite");
        assert!(record.has_tag("watched"));
        record.remove_tag("watched");
        assert_eq!(record.tags, ["favourite"]);
    }

    #[test]
    fn broken_field_names_its_path() {
        let err = MovieRecord::from_value(
            &json!({ "video": { "markers": [{ "type": "bookmark", "start": -5 }] } }),
            &mut Notes::new(),
        )
        .unwrap_err();
        assert_eq!(err.path(), "video.markers.0.start");
    }
}
