//! Loading and storing record values through `serde_json::Value`.
//!
//! Records are read leniently: a missing or `null` property is
//! [`Outcome::Absent`], legacy shapes are migrated and reported as
//! [`Outcome::Updated`] with a line in [`Notes`], and only a value of a
//! genuinely wrong shape is an error. Storing is the reverse; a value that
//! stores as `Value::Null` is left out of the enclosing object, and so are
//! empty lists and maps.

use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::outcome::{Notes, Outcome};
use crate::translated::TranslatedMap;

pub type Object = Map<String, Value>;

pub trait JsonLoad {
    /// Replaces `self` with the value read from `node`.
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome>;
}

pub trait JsonStore {
    /// `Value::Null` means the property should not be written at all.
    fn store(&self) -> Value;
}

pub fn as_object<'a>(node: &'a Value, expected: &'static str) -> Result<&'a Object> {
    node.as_object()
        .ok_or_else(|| ModelError::shape(expected, node))
}

pub fn load_field<T: JsonLoad>(
    object: &Object,
    key: &str,
    target: &mut T,
    notes: &mut Notes,
) -> Result<Outcome> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Outcome::Absent),
        Some(node) => target.load(node, notes).map_err(|err| err.at(key)),
    }
}

pub fn load_opt_field<T: JsonLoad + Default>(
    object: &Object,
    key: &str,
    target: &mut Option<T>,
    notes: &mut Notes,
) -> Result<Outcome> {
    let mut value = T::default();
    let outcome = load_field(object, key, &mut value, notes)?;
    *target = (!outcome.is_absent()).then_some(value);
    Ok(outcome)
}

/// Loads a list that older files may carry as a single bare string.
///
/// An empty bare string becomes an empty list and is reported as updated.
pub fn load_list_or_value(
    object: &Object,
    key: &str,
    target: &mut Vec<String>,
    notes: &mut Notes,
) -> Result<Outcome> {
    match object.get(key) {
        Some(Value::String(single)) if single.is_empty() => {
            target.clear();
            notes.push(format!("Empty {key} string found"));
            Ok(Outcome::Updated)
        }
        Some(Value::String(single)) => {
            *target = vec![single.clone()];
            Ok(Outcome::Unchanged)
        }
        _ => load_field(object, key, target, notes),
    }
}

/// Loads every `prefix` / `prefix:<lang>` property of `object` into `map`.
///
/// The bare `prefix` lands under the default language.
pub fn load_translated<V: JsonLoad + Default>(
    object: &Object,
    prefix: &str,
    map: &mut TranslatedMap<V>,
    notes: &mut Notes,
) -> Result<Outcome> {
    let mut outcome = Outcome::Absent;
    for (key, node) in object {
        let Some(lang) = translated_lang(key, prefix) else {
            continue;
        };
        if node.is_null() {
            continue;
        }

        let mut value = V::default();
        let loaded = value.load(node, notes).map_err(|err| err.at(key))?;
        if loaded.is_absent() {
            continue;
        }
        map.insert(lang, value);
        outcome.absorb(loaded);
    }
    Ok(outcome)
}

fn translated_lang<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(':')
}

pub fn store_field<T: JsonStore + ?Sized>(object: &mut Object, key: &str, value: &T) {
    let node = value.store();
    if !node.is_null() {
        object.insert(key.to_owned(), node);
    }
}

pub fn store_translated<V: JsonStore>(
    object: &mut Object,
    prefix: &str,
    map: &TranslatedMap<V>,
) {
    for (lang, value) in map.iter() {
        if lang.is_empty() {
            store_field(object, prefix, value);
        } else {
            store_field(object, &format!("{prefix}:{lang}"), value);
        }
    }
}

/// Wraps a finished object, collapsing an empty one to `null`.
pub fn object_or_null(object: Object) -> Value {
    if object.is_empty() {
        Value::Null
    } else {
        Value::Object(object)
    }
}

impl JsonLoad for String {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        let text = node.as_str().ok_or_else(|| ModelError::shape("string", node))?;
        text.clone_into(self);
        Ok(Outcome::Unchanged)
    }
}

impl JsonStore for String {
    fn store(&self) -> Value {
        Value::String(self.clone())
    }
}

impl JsonLoad for bool {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        *self = node.as_bool().ok_or_else(|| ModelError::shape("bool", node))?;
        Ok(Outcome::Unchanged)
    }
}

impl JsonLoad for i64 {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        *self = node
            .as_i64()
            .ok_or_else(|| ModelError::shape("integer", node))?;
        Ok(Outcome::Unchanged)
    }
}

impl JsonStore for i64 {
    fn store(&self) -> Value {
        Value::from(*self)
    }
}

impl JsonLoad for u32 {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        *self = node
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| ModelError::shape("unsigned integer", node))?;
        Ok(Outcome::Unchanged)
    }
}

impl JsonStore for u32 {
    fn store(&self) -> Value {
        Value::from(*self)
    }
}

impl<T: JsonStore> JsonStore for Option<T> {
    fn store(&self) -> Value {
        self.as_ref().map_or(Value::Null, JsonStore::store)
    }
}

impl<T: JsonLoad + Default> JsonLoad for Vec<T> {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let items = node
            .as_array()
            .ok_or_else(|| ModelError::shape("array", node))?;

        self.clear();
        self.reserve(items.len());
        let mut outcome = Outcome::Unchanged;
        for (index, item) in items.iter().enumerate() {
            let mut value = T::default();
            let loaded = value
                .load(item, notes)
                .map_err(|err| err.at(index.to_string()))?;
            if loaded.is_absent() {
                continue;
            }
            outcome.absorb(loaded);
            self.push(value);
        }
        Ok(outcome)
    }
}

impl<T: JsonStore> JsonStore for Vec<T> {
    fn store(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        Value::Array(self.iter().map(JsonStore::store).collect())
    }
}
