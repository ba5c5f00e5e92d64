//! Record files.
//!
//! Each record lives in `<infos>/<id>.json`, where the identifier may
//! contain `/` separated subdirectories. Files are written with four-space
//! indentation.

use std::fs;
use std::path::{Path, PathBuf};

use marquee_model::{MovieRecord, Notes, Outcome};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::db_info::Alpha2Aliases;
use crate::error::{CatalogError, Result};

pub const RECORD_EXTENSION: &str = "json";

pub fn record_path(infos: &Path, id: &str) -> PathBuf {
    infos.join(format!("{id}.{RECORD_EXTENSION}"))
}

pub fn serialize(record: &MovieRecord) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    record.to_value().serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parses a record, discarding the migration trail.
pub fn deserialize(text: &str) -> Result<MovieRecord> {
    let node: Value = serde_json::from_str(text)?;
    let (record, _) = MovieRecord::from_value(&node, &mut Notes::new())?;
    Ok(record)
}

pub fn store_record(infos: &Path, id: &str, record: &MovieRecord) -> Result<()> {
    let path = record_path(infos, id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CatalogError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serialize(record)?;
    fs::write(&path, text).map_err(|source| CatalogError::Write { path, source })
}

/// Reads a record and brings its country list in line with `aka`.
pub fn load_record(
    infos: &Path,
    id: &str,
    aka: &Alpha2Aliases,
    notes: &mut Notes,
) -> Result<(MovieRecord, Outcome)> {
    let path = record_path(infos, id);
    let text = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
        path: path.clone(),
        source,
    })?;
    let node: Value = serde_json::from_str(&text)?;
    let (mut record, mut outcome) =
        MovieRecord::from_value(&node, notes).map_err(|source| CatalogError::InvalidRecord {
            id: id.to_owned(),
            source,
        })?;
    if map_countries(&mut record, aka) {
        notes.push("Country list updated to ISO alpha2");
        outcome.absorb(Outcome::Updated);
    }
    Ok((record, outcome))
}

/// Splits `A/B` entries and replaces names with alpha-2 codes.
pub fn map_countries(record: &mut MovieRecord, aka: &Alpha2Aliases) -> bool {
    let mapped: Vec<String> = record
        .countries
        .iter()
        .flat_map(|entry| entry.split('/'))
        .map(|country| aka.map(country.trim()))
        .collect();
    if mapped == record.countries {
        return false;
    }
    record.countries = mapped;
    true
}

#[cfg(test)]
mod tests {
    use marquee_model::TitleEntry;
    use tempfile::TempDir;

    use super::*;

    fn aliases() -> Alpha2Aliases {
        let mut aka = Alpha2Aliases::default();
        aka.insert("US", &["United States", "USA"]);
        aka.insert("GB", &["United Kingdom"]);
        aka
    }

    #[test]
    fn countries_are_split_and_mapped() {
        let mut record = MovieRecord {
            countries: vec!["United Kingdom / USA".into(), "Atlantis".into()],
            ..MovieRecord::default()
        };
        assert!(map_countries(&mut record, &aliases()));
        assert_eq!(record.countries, ["GB", "US", "Atlantis"]);
        assert!(!map_countries(&mut record, &aliases()));
    }

    #[test]
    fn serialized_records_use_four_spaces() {
        let mut record = MovieRecord::default();
        record.title.insert("", TitleEntry::new("Alien"));
        record.year = Some(1979);
        let text = serialize(&record).unwrap();
        assert_eq!(text, "{\n    \"title\": \"Alien\",\n    \"year\": 1979\n}\n");
        assert_eq!(deserialize(&text).unwrap(), record);
    }

    #[test]
    fn stored_records_load_back() {
        let dir = TempDir::new().unwrap();
        let mut record = MovieRecord::default();
        record.title.insert("", TitleEntry::new("Alien"));
        record.countries = vec!["US".into()];

        store_record(dir.path(), "scifi/alien", &record).unwrap();
        assert!(dir.path().join("scifi/alien.json").is_file());

        let mut notes = Notes::new();
        let (loaded, outcome) =
            load_record(dir.path(), "scifi/alien", &aliases(), &mut notes).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(notes.is_empty());
    }

    #[test]
    fn country_names_mark_record_updated() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("alien.json"),
            r#"{"title": "Alien", "countries": ["United States/United Kingdom"]}"#,
        )
        .unwrap();

        let mut notes = Notes::new();
        let (loaded, outcome) = load_record(dir.path(), "alien", &aliases(), &mut notes).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(loaded.countries, ["US", "GB"]);
        assert!(notes.contains("ISO alpha2"));
    }

    #[test]
    fn broken_record_names_its_id() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("alien.json"), r#"{"year": "soon"}"#).unwrap();
        let err = load_record(dir.path(), "alien", &aliases(), &mut Notes::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid record alien: year: expected unsigned integer, found string");
    }
}
