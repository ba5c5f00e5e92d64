use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};
use crate::translated::TranslatedMap;

/// Language key of an original title whose language is not known.
pub const UNKNOWN_ORIGINAL: &str = "<?>";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleEntry {
    pub text: String,
    pub sort: Option<String>,
    pub original: bool,
}

pub type TitleMap = TranslatedMap<TitleEntry>;

impl TitleEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn original(mut self) -> Self {
        self.original = true;
        self
    }

    /// Brings the entry into canonical form: an empty text borrows the sort
    /// key, and a sort key equal to the text or empty is dropped.
    pub fn normalize(&mut self, notes: &mut Notes) -> Outcome {
        if self.text.is_empty()
            && let Some(sort) = &self.sort
        {
            self.text = sort.clone();
        }
        if self.sort.as_deref() == Some(self.text.as_str()) {
            self.sort = None;
        }
        if self.sort.as_deref() == Some("") {
            self.sort = None;
            notes.push("Empty sort title string found");
            return Outcome::Updated;
        }
        Outcome::Unchanged
    }
}

impl JsonLoad for TitleEntry {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        match node {
            Value::String(text) => {
                *self = TitleEntry::new(text.clone());
            }
            Value::Object(data) => {
                // `local`/`orig` maps are picked up by `load_legacy_title`.
                if data.contains_key("local") || data.contains_key("orig") {
                    return Ok(Outcome::Absent);
                }
                let mut text = None::<String>;
                let mut outcome =
                    json::load_opt_field(data, "text", &mut text, notes)?;
                let Some(text) = text else {
                    return Ok(Outcome::Absent);
                };
                self.text = text;
                outcome.absorb(json::load_opt_field(
                    data, "sort", &mut self.sort, notes,
                )?);
                self.original = false;
                json::load_field(data, "original", &mut self.original, notes)?;
                return Ok(outcome.and(self.normalize(notes)));
            }
            other => return Err(ModelError::shape("string or object", other)),
        }
        Ok(self.normalize(notes))
    }
}

impl JsonStore for TitleEntry {
    fn store(&self) -> Value {
        if self.sort.is_none() && !self.original {
            return Value::String(self.text.clone());
        }
        let mut data = Object::new();
        data.insert("text".into(), Value::String(self.text.clone()));
        json::store_field(&mut data, "sort", &self.sort);
        if self.original {
            data.insert("original".into(), Value::Bool(true));
        }
        Value::Object(data)
    }
}

/// Migrates the old `{"title": {"local": .., "orig": ..}}` layout.
///
/// The local title becomes the default-language entry, the original one is
/// kept under [`UNKNOWN_ORIGINAL`]. Newer `title:<lang>` properties loaded
/// earlier take precedence.
pub fn load_legacy_title(
    data: &Object,
    titles: &mut TitleMap,
    notes: &mut Notes,
) -> Result<Outcome> {
    let Some(Value::Object(legacy)) = data.get("title") else {
        return Ok(Outcome::Absent);
    };
    if !legacy.contains_key("local") && !legacy.contains_key("orig") {
        return Ok(Outcome::Absent);
    }

    let mut local = None::<String>;
    let mut orig = None::<String>;
    json::load_opt_field(legacy, "local", &mut local, notes)
        .map_err(|err| err.at("title"))?;
    json::load_opt_field(legacy, "orig", &mut orig, notes)
        .map_err(|err| err.at("title"))?;

    if let Some(local) = local.filter(|text| !text.is_empty())
        && !titles.contains("")
    {
        titles.insert("", TitleEntry::new(local));
    }
    if let Some(orig) = orig.filter(|text| !text.is_empty())
        && !titles.contains(UNKNOWN_ORIGINAL)
    {
        titles.insert(UNKNOWN_ORIGINAL, TitleEntry::new(orig).original());
    }

    notes.push("Old-style title found");
    Ok(Outcome::Updated)
}

/// Drops the unknown-language original when another original title exists.
pub fn drop_unneeded_original(titles: &mut TitleMap, notes: &mut Notes) -> Outcome {
    let unknown = titles
        .get(UNKNOWN_ORIGINAL)
        .is_some_and(|entry| entry.original);
    let other = titles
        .iter()
        .any(|(lang, entry)| entry.original && lang != UNKNOWN_ORIGINAL);

    if unknown && other {
        titles.remove(UNKNOWN_ORIGINAL);
        notes.push(format!("There is an unneeded title:{UNKNOWN_ORIGINAL}"));
        return Outcome::Updated;
    }
    Outcome::Unchanged
}
