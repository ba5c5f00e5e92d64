//! Language-keyed values with fallback lookup.
//!
//! Keys are language tags (`"pl"`, `"en-US"`, ...). The empty key holds the
//! default value, used when the record was produced without language
//! information.

use std::collections::BTreeMap;

pub const DEFAULT_LANGUAGE: &str = "";
const ENGLISH_FALLBACK: [&str; 2] = ["en-US", "en"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedMap<V> {
    items: BTreeMap<String, V>,
}

impl<V> Default for TranslatedMap<V> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<V> TranslatedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, lang: &str) -> Option<&V> {
        self.items.get(lang)
    }

    pub fn get_mut(&mut self, lang: &str) -> Option<&mut V> {
        self.items.get_mut(lang)
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.items.contains_key(lang)
    }

    pub fn insert(&mut self, lang: impl Into<String>, value: V) -> Option<V> {
        self.items.insert(lang.into(), value)
    }

    pub fn remove(&mut self, lang: &str) -> Option<V> {
        self.items.remove(lang)
    }

    pub fn retain(&mut self, keep: impl FnMut(&String, &mut V) -> bool) {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.items.iter().map(|(lang, value)| (lang.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.items
            .iter_mut()
            .map(|(lang, value)| (lang.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Finds the best value for a single language tag.
    ///
    /// The tag is probed as-is, then truncated at its last `-` until nothing
    /// is left (`"pt-BR-x"` → `"pt-BR"` → `"pt"`). When the chain is exhausted
    /// the default entry is tried, then the English fallback.
    pub fn find(&self, lang: &str) -> Option<(&str, &V)> {
        let mut lang = lang;
        while !lang.is_empty() {
            if let Some(found) = self.entry(lang) {
                return Some(found);
            }
            lang = match lang.rfind('-') {
                Some(pos) => &lang[..pos],
                None => "",
            };
        }

        self.entry(DEFAULT_LANGUAGE).or_else(|| self.fallback())
    }

    /// Finds the first value among an ordered list of language tags.
    ///
    /// Candidates are probed without truncation. The default entry is tried
    /// next, and the English fallback only when the list did not already
    /// cover both `en-US` and `en`.
    pub fn find_any<S: AsRef<str>>(&self, langs: &[S]) -> Option<(&str, &V)> {
        let mut has_en_us = false;
        let mut has_en = false;
        for lang in langs {
            let lang = lang.as_ref();
            has_en_us |= lang == "en-US";
            has_en |= lang == "en";
            if let Some(found) = self.entry(lang) {
                return Some(found);
            }
        }

        if let Some(found) = self.entry(DEFAULT_LANGUAGE) {
            return Some(found);
        }
        if has_en_us && has_en {
            return None;
        }
        self.fallback()
    }

    pub fn fallback(&self) -> Option<(&str, &V)> {
        self.find_any(&ENGLISH_FALLBACK)
    }

    pub fn map<U>(&self, mut op: impl FnMut(&V) -> U) -> TranslatedMap<U> {
        TranslatedMap {
            items: self
                .items
                .iter()
                .map(|(lang, value)| (lang.clone(), op(value)))
                .collect(),
        }
    }

    fn entry(&self, lang: &str) -> Option<(&str, &V)> {
        self.items
            .get_key_value(lang)
            .map(|(lang, value)| (lang.as_str(), value))
    }
}

impl<V: PartialEq> TranslatedMap<V> {
    /// Inserts or replaces the value under `lang`; reports whether the map
    /// changed.
    pub fn insert_or_update(&mut self, lang: &str, value: V) -> bool {
        match self.items.get_mut(lang) {
            Some(current) if *current == value => false,
            Some(current) => {
                *current = value;
                true
            }
            None => {
                self.items.insert(lang.to_owned(), value);
                true
            }
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for TranslatedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(lang, value)| (lang.into(), value))
                .collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a TranslatedMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
