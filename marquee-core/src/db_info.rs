//! Lookup tables kept next to the catalog database.
//!
//! `iso-alpha-2.json` maps ISO 3166 alpha-2 codes to the country names seen
//! in scraped data; `refs.json` holds identifier renames per reference
//! domain.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{CatalogError, Result};

pub const ALIASES_FILE: &str = "iso-alpha-2.json";
pub const RENAMES_FILE: &str = "refs.json";

fn read_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(object) => Ok(object),
        _ => Err(CatalogError::Format {
            path: path.to_path_buf(),
            reason: "expected an object".into(),
        }),
    }
}

fn strings(node: &Value) -> impl Iterator<Item = &str> {
    node.as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alpha2Aliases {
    codes: BTreeSet<String>,
    /// Lower-cased alias to code.
    aliases: HashMap<String, String>,
}

impl Alpha2Aliases {
    pub fn load(db_root: &Path) -> Result<Self> {
        let mut result = Self::default();
        for (code, aliases) in read_object(&db_root.join(ALIASES_FILE))? {
            for alias in strings(&aliases) {
                result.aliases.insert(alias.to_lowercase(), code.clone());
            }
            result.codes.insert(code);
        }
        debug!(
            codes = result.codes.len(),
            aliases = result.aliases.len(),
            "country aliases loaded"
        );
        Ok(result)
    }

    /// Code to its first listed name.
    pub fn load_names(db_root: &Path) -> Result<BTreeMap<String, String>> {
        Ok(read_object(&db_root.join(ALIASES_FILE))?
            .into_iter()
            .filter_map(|(code, aliases)| {
                let name = strings(&aliases).next().filter(|name| !name.is_empty())?;
                Some((code, name.to_owned()))
            })
            .collect())
    }

    pub fn insert(&mut self, code: impl Into<String>, aliases: &[&str]) {
        let code = code.into();
        for alias in aliases {
            self.aliases.insert(alias.to_lowercase(), code.clone());
        }
        self.codes.insert(code);
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Known codes map to themselves, aliases (in any case) to their code;
    /// anything else is returned as is.
    pub fn map(&self, country: &str) -> String {
        if self.codes.contains(country) {
            return country.to_owned();
        }
        self.aliases
            .get(&country.to_lowercase())
            .cloned()
            .unwrap_or_else(|| country.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRenames {
    renames: HashMap<String, String>,
}

impl RefRenames {
    /// Loads the renames listed under `domain`. A missing domain yields an
    /// empty table.
    pub fn load(db_root: &Path, domain: &str) -> Result<Self> {
        let path: PathBuf = db_root.join(RENAMES_FILE);
        let mut root = read_object(&path)?;
        let renames = match root.remove(domain) {
            Some(Value::Object(renames)) => renames
                .into_iter()
                .filter_map(|(id, rename)| match rename {
                    Value::String(rename) => Some((id, rename)),
                    _ => None,
                })
                .collect(),
            Some(_) => {
                return Err(CatalogError::Format {
                    path,
                    reason: format!("'{domain}' is not an object"),
                });
            }
            None => HashMap::new(),
        };
        Ok(Self { renames })
    }

    pub fn map(&self, id: &str) -> String {
        self.renames
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_owned())
    }
}

/// Both tables, loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbInfo {
    pub aka: Alpha2Aliases,
    pub refs: RefRenames,
}

impl DbInfo {
    pub fn load(db_root: &Path, domain: &str) -> Result<Self> {
        Ok(Self {
            aka: Alpha2Aliases::load(db_root)?,
            refs: RefRenames::load(db_root, domain)?,
        })
    }

    pub fn map_aka(&self, country: &str) -> String {
        self.aka.map(country)
    }

    pub fn map_ref(&self, id: &str) -> String {
        self.refs.map(id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn db() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(ALIASES_FILE),
            r#"{
                "US": ["United States", "USA"],
                "GB": ["United Kingdom", "UK", 44],
                "XX": []
            }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(RENAMES_FILE),
            r#"{"imdb": {"tt0078748": "tt0078748a", "bad": 5}, "tmdb": {}}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn aliases_map_to_codes() {
        let dir = db();
        let aka = Alpha2Aliases::load(dir.path()).unwrap();
        assert_eq!(aka.map("US"), "US");
        assert_eq!(aka.map("united kingdom"), "GB");
        assert_eq!(aka.map("USA"), "US");
        assert_eq!(aka.map("Narnia"), "Narnia");
        assert_eq!(aka.map("XX"), "XX");
    }

    #[test]
    fn names_are_first_aliases() {
        let dir = db();
        let names = Alpha2Aliases::load_names(dir.path()).unwrap();
        assert_eq!(
            names,
            BTreeMap::from([
                ("GB".to_string(), "United Kingdom".to_string()),
                ("US".to_string(), "United States".to_string()),
            ])
        );
    }

    #[test]
    fn renames_are_per_domain() {
        let dir = db();
        let info = DbInfo::load(dir.path(), "imdb").unwrap();
        assert_eq!(info.map_ref("tt0078748"), "tt0078748a");
        assert_eq!(info.map_ref("bad"), "bad");
        assert_eq!(info.map_aka("United States"), "US");

        let other = RefRenames::load(dir.path(), "filmweb").unwrap();
        assert_eq!(other.map("tt0078748"), "tt0078748");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Alpha2Aliases::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
