use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerType {
    #[default]
    Bookmark,
    Recap,
    Credits,
    CreditsScene,
    Chapter,
}

impl MarkerType {
    pub const ALL: [MarkerType; 5] = [
        MarkerType::Bookmark,
        MarkerType::Recap,
        MarkerType::Credits,
        MarkerType::CreditsScene,
        MarkerType::Chapter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerType::Bookmark => "bookmark",
            MarkerType::Recap => "recap",
            MarkerType::Credits => "credits",
            MarkerType::CreditsScene => "credits_scene",
            MarkerType::Chapter => "chapter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonLoad for MarkerType {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        match node {
            Value::String(name) => {
                *self = MarkerType::from_name(name).ok_or_else(|| {
                    ModelError::UnknownVariant {
                        kind: "marker type",
                        name: name.clone(),
                    }
                })?;
                Ok(Outcome::Unchanged)
            }
            Value::Number(number) => {
                let kind = number
                    .as_u64()
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| MarkerType::ALL.get(index).copied())
                    .ok_or_else(|| ModelError::UnknownVariant {
                        kind: "marker type",
                        name: number.to_string(),
                    })?;
                *self = kind;
                notes.push("Numeric enum has a known name");
                Ok(Outcome::Updated)
            }
            other => Err(ModelError::shape("string", other)),
        }
    }
}

impl JsonStore for MarkerType {
    fn store(&self) -> Value {
        Value::String(self.as_str().to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMarker {
    pub kind: MarkerType,
    pub start: u32,
    pub stop: Option<u32>,
    pub comment: Option<String>,
}

impl VideoMarker {
    pub fn new(kind: MarkerType, start: u32) -> Self {
        Self {
            kind,
            start,
            ..Self::default()
        }
    }

    pub fn until(mut self, stop: u32) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Same marker, ignoring the comment.
    pub fn equivalent(&self, other: &Self) -> bool {
        self.kind == other.kind && self.start == other.start && self.stop == other.stop
    }
}

impl Ord for VideoMarker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.stop.cmp(&other.stop))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.comment.cmp(&other.comment))
    }
}

impl PartialOrd for VideoMarker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl JsonLoad for VideoMarker {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        *self = VideoMarker::default();
        let mut outcome = json::load_field(data, "type", &mut self.kind, notes)?;
        outcome.absorb(json::load_field(data, "start", &mut self.start, notes)?);
        outcome.absorb(json::load_opt_field(data, "stop", &mut self.stop, notes)?);
        outcome.absorb(json::load_opt_field(data, "comment", &mut self.comment, notes)?);
        Ok(outcome)
    }
}

impl JsonStore for VideoMarker {
    fn store(&self) -> Value {
        let mut data = Object::new();
        json::store_field(&mut data, "type", &self.kind);
        json::store_field(&mut data, "start", &self.start);
        json::store_field(&mut data, "stop", &self.stop);
        json::store_field(&mut data, "comment", &self.comment);
        Value::Object(data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub credits: Option<u32>,
    pub end_of_watch: Option<u32>,
    pub markers: Vec<VideoMarker>,
}

impl VideoInfo {
    pub fn is_empty(&self) -> bool {
        self.credits.is_none() && self.end_of_watch.is_none() && self.markers.is_empty()
    }
}

impl JsonLoad for VideoInfo {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        let mut outcome = Outcome::Absent;
        outcome.absorb(json::load_opt_field(data, "credits", &mut self.credits, notes)?);
        outcome.absorb(json::load_opt_field(
            data,
            "end_of_watch",
            &mut self.end_of_watch,
            notes,
        )?);
        self.markers.clear();
        outcome.absorb(json::load_field(data, "markers", &mut self.markers, notes)?);
        Ok(outcome)
    }
}

impl JsonStore for VideoInfo {
    fn store(&self) -> Value {
        let mut data = Object::new();
        json::store_field(&mut data, "credits", &self.credits);
        json::store_field(&mut data, "end_of_watch", &self.end_of_watch);
        json::store_field(&mut data, "markers", &self.markers);
        json::object_or_null(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ordering_ignores_comment_until_last() {
        let early = VideoMarker::new(MarkerType::Chapter, 10);
        let recap = VideoMarker::new(MarkerType::Recap, 10).until(40);
        let late = VideoMarker::new(MarkerType::Bookmark, 600).with_comment("b");
        let mut markers = vec![late.clone(), recap.clone(), early.clone()];
        markers.sort();
        assert_eq!(markers, [early, recap, late]);
    }

    #[test]
    fn equivalence_skips_comment() {
        let plain = VideoMarker::new(MarkerType::Credits, 5000);
        assert!(plain.equivalent(&plain.clone().with_comment("post-credits")));
        assert!(!plain.equivalent(&plain.clone().until(5100)));
    }

    #[test]
    fn numeric_type_is_renamed() {
        let mut notes = Notes::new();
        let mut marker = VideoMarker::default();
        let outcome = marker
            .load(&json!({ "type": 3, "start": 120 }), &mut notes)
            .unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(marker.kind, MarkerType::CreditsScene);
        assert!(notes.contains("Numeric enum has a known name"));
        assert_eq!(marker.store(), json!({ "type": "credits_scene", "start": 120 }));
    }

    #[test]
    fn unknown_type_name_fails() {
        let mut marker = VideoMarker::default();
        let err = marker
            .load(&json!({ "type": "intro", "start": 0 }), &mut Notes::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "type: unknown marker type 'intro'");
    }
}
