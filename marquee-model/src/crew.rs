//! Crew roles and the person identities they point at.
//!
//! Each role list entry carries an index into the shared `names` list, so one
//! person directing and writing a movie is stored once.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::json::{self, JsonLoad, JsonStore, Object};
use crate::outcome::{Notes, Outcome};

pub const ROLE_LISTS: [&str; 3] = ["directors", "writers", "cast"];
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoleRef {
    pub id: i64,
    pub contribution: Option<String>,
}

impl RoleRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            contribution: None,
        }
    }

    pub fn with_contribution(id: i64, contribution: impl Into<String>) -> Self {
        Self {
            id,
            contribution: Some(contribution.into()),
        }
    }
}

impl JsonLoad for RoleRef {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        if let Some(id) = node.as_i64() {
            *self = RoleRef::new(id);
            return Ok(Outcome::Unchanged);
        }
        if let Some([id, contribution]) = node.as_array().map(Vec::as_slice)
            && let (Some(id), Some(contribution)) =
                (id.as_i64(), contribution.as_str())
        {
            self.id = id;
            self.contribution =
                (!contribution.is_empty()).then(|| contribution.to_owned());
            return Ok(Outcome::Unchanged);
        }
        Err(ModelError::shape("integer or [integer, string]", node))
    }
}

impl JsonStore for RoleRef {
    fn store(&self) -> Value {
        match &self.contribution {
            None => Value::from(self.id),
            Some(contribution) => {
                Value::Array(vec![Value::from(self.id), contribution.clone().into()])
            }
        }
    }
}

/// A person as known to the record: display name plus reference strings,
/// each either `key` or `key:value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PersonIdentity {
    pub name: String,
    pub refs: Vec<String>,
}

impl PersonIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            refs: Vec::new(),
        }
    }

    pub fn with_refs<I, S>(name: impl Into<String>, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            refs: refs.into_iter().map(Into::into).collect(),
        }
    }

    /// References split into `key` → `value`; a bare `key` maps to an empty
    /// value and a repeated key keeps its last value.
    pub fn ref_map(&self) -> BTreeMap<String, String> {
        self.refs
            .iter()
            .map(|reference| match reference.split_once(':') {
                Some((key, value)) => (key.to_owned(), value.to_owned()),
                None => (reference.clone(), String::new()),
            })
            .collect()
    }

    pub fn from_ref_map(name: impl Into<String>, refs: &BTreeMap<String, String>) -> Self {
        Self::with_refs(
            name,
            refs.iter().map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else {
                    format!("{key}:{value}")
                }
            }),
        )
    }

    /// Same person with references sorted by key, one per key.
    pub fn canonical(&self) -> Self {
        Self::from_ref_map(self.name.clone(), &self.ref_map())
    }
}

impl JsonLoad for PersonIdentity {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        const EXPECTED: &str = "string or [string, ...]";
        match node {
            Value::String(name) => *self = PersonIdentity::new(name.clone()),
            Value::Array(items) => {
                let mut strings = items.iter().map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| ModelError::shape(EXPECTED, item))
                });
                let Some(name) = strings.next() else {
                    return Err(ModelError::shape(EXPECTED, node));
                };
                self.name = name?;
                self.refs = strings.collect::<Result<_>>()?;
            }
            other => return Err(ModelError::shape(EXPECTED, other)),
        }
        Ok(Outcome::Unchanged)
    }
}

impl JsonStore for PersonIdentity {
    fn store(&self) -> Value {
        if self.refs.is_empty() {
            return Value::String(self.name.clone());
        }
        let mut items = Vec::with_capacity(self.refs.len() + 1);
        items.push(Value::String(self.name.clone()));
        items.extend(self.refs.iter().cloned().map(Value::String));
        Value::Array(items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrewInfo {
    pub directors: Vec<RoleRef>,
    pub writers: Vec<RoleRef>,
    pub cast: Vec<RoleRef>,
    pub names: Vec<PersonIdentity>,
}

impl CrewInfo {
    pub fn is_empty(&self) -> bool {
        self.directors.is_empty()
            && self.writers.is_empty()
            && self.cast.is_empty()
            && self.names.is_empty()
    }

    pub fn roles(&self) -> [(&'static str, &Vec<RoleRef>); 3] {
        [
            (ROLE_LISTS[0], &self.directors),
            (ROLE_LISTS[1], &self.writers),
            (ROLE_LISTS[2], &self.cast),
        ]
    }

    pub fn roles_mut(&mut self) -> [&mut Vec<RoleRef>; 3] {
        [&mut self.directors, &mut self.writers, &mut self.cast]
    }

    /// First role whose index does not point into `names`.
    pub fn dangling(&self) -> Option<(&'static str, i64)> {
        let names = self.names.len();
        self.roles().into_iter().find_map(|(list, roles)| {
            roles
                .iter()
                .find(|role| !usize::try_from(role.id).is_ok_and(|id| id < names))
                .map(|role| (list, role.id))
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self.dangling() {
            Some((list, index)) => Err(ModelError::DanglingRole {
                list,
                index,
                names: self.names.len(),
            }),
            None => Ok(()),
        }
    }

    /// Removes every identity named `N/A` or with no name at all, along with
    /// the roles pointing at it; higher indices shift down.
    pub fn remove_placeholder_names(&mut self, notes: &mut Notes) -> Outcome {
        let placeholder = self.remove_names(|name| name == NOT_AVAILABLE);
        if placeholder {
            notes.push("N/A found in the name list");
        }
        let unnamed = self.remove_names(str::is_empty);
        if unnamed {
            notes.push("Unnamed person found in the name list");
        }
        Outcome::changed(placeholder || unnamed)
    }

    fn remove_names(&mut self, matches: impl Fn(&str) -> bool) -> bool {
        let mut changed = false;
        while let Some(id) = self.names.iter().position(|person| matches(&person.name)) {
            let id = id as i64;
            for roles in self.roles_mut() {
                roles.retain(|role| role.id != id);
                for role in roles.iter_mut().filter(|role| role.id > id) {
                    role.id -= 1;
                }
            }
            self.names.remove(id as usize);
            changed = true;
        }
        changed
    }

    /// Renumbers `names` in order of first use across directors, writers and
    /// cast, with references sorted. Identities that end up equal share one
    /// entry and unused ones are dropped. A crew merge builds its identity
    /// list the same way.
    pub fn canonicalize(&mut self, notes: &mut Notes) -> Outcome {
        let known: Vec<PersonIdentity> = self.names.iter().map(PersonIdentity::canonical).collect();
        let mut used = Vec::with_capacity(known.len());
        for roles in self.roles_mut() {
            for role in roles.iter_mut() {
                if let Some(person) = usize::try_from(role.id).ok().and_then(|id| known.get(id)) {
                    role.id = intern(&mut used, person);
                }
            }
        }

        if used == self.names {
            return Outcome::Unchanged;
        }
        self.names = used;
        notes.push("Crew identities renumbered");
        Outcome::Updated
    }

    /// Reads the `crew` property of a record, migrating the old layout where
    /// roles held person keys resolved through a top-level `people` map.
    pub fn load_from_record(&mut self, data: &Object, notes: &mut Notes) -> Result<Outcome> {
        let Some(node) = data.get("crew").filter(|node| !node.is_null()) else {
            return Ok(Outcome::Absent);
        };
        let crew = json::as_object(node, "object").map_err(|err| err.at("crew"))?;

        if is_legacy(crew) {
            self.rebuild_legacy(crew, data.get("people"), notes)
                .map_err(|err| err.at("crew"))?;
            notes.push("Old-style crew found");
            self.remove_placeholder_names(notes);
            self.canonicalize(notes);
            return Ok(Outcome::Updated);
        }

        self.load(node, notes).map_err(|err| err.at("crew"))
    }

    fn rebuild_legacy(
        &mut self,
        crew: &Object,
        people: Option<&Value>,
        notes: &mut Notes,
    ) -> Result<()> {
        let mut display = BTreeMap::<String, String>::new();
        if let Some(people) = people.filter(|node| !node.is_null()) {
            let people = json::as_object(people, "object").map_err(|err| err.at("people"))?;
            for (key, name) in people {
                if let Some(name) = name.as_str().filter(|name| !name.is_empty()) {
                    display.insert(key.clone(), name.to_owned());
                }
            }
        }

        *self = CrewInfo::default();
        for (slot, list) in ROLE_LISTS.into_iter().enumerate() {
            let mut keys = Vec::<LegacyRole>::new();
            json::load_field(crew, list, &mut keys, notes)?;

            let resolved = keys
                .into_iter()
                .map(|LegacyRole { key, contribution }| {
                    let person = match display.get(&key) {
                        Some(name) => PersonIdentity::with_refs(name.clone(), [key]),
                        None => PersonIdentity::new(key),
                    };
                    RoleRef {
                        id: intern(&mut self.names, &person),
                        contribution,
                    }
                })
                .collect();
            *self.roles_mut()[slot] = resolved;
        }
        Ok(())
    }

}

/// Index of `person` in `names`, appending it when missing.
fn intern(names: &mut Vec<PersonIdentity>, person: &PersonIdentity) -> i64 {
    let id = match names.iter().position(|known| known == person) {
        Some(id) => id,
        None => {
            names.push(person.clone());
            names.len() - 1
        }
    };
    id as i64
}

fn is_legacy(crew: &Object) -> bool {
    ROLE_LISTS
        .iter()
        .filter_map(|list| crew.get(*list)?.as_array())
        .flatten()
        .any(|role| match role {
            Value::String(_) => true,
            Value::Array(items) => items.first().is_some_and(Value::is_string),
            _ => false,
        })
}

#[derive(Debug, Default)]
struct LegacyRole {
    key: String,
    contribution: Option<String>,
}

impl JsonLoad for LegacyRole {
    fn load(&mut self, node: &Value, _: &mut Notes) -> Result<Outcome> {
        if let Some(key) = node.as_str() {
            key.clone_into(&mut self.key);
            return Ok(Outcome::Unchanged);
        }
        if let Some([key, contribution]) = node.as_array().map(Vec::as_slice)
            && let (Some(key), Some(contribution)) = (key.as_str(), contribution.as_str())
        {
            key.clone_into(&mut self.key);
            self.contribution = (!contribution.is_empty()).then(|| contribution.to_owned());
            return Ok(Outcome::Unchanged);
        }
        Err(ModelError::shape("string or [string, string]", node))
    }
}

impl JsonLoad for CrewInfo {
    fn load(&mut self, node: &Value, notes: &mut Notes) -> Result<Outcome> {
        let data = json::as_object(node, "object")?;
        *self = CrewInfo::default();

        let mut outcome = Outcome::Absent;
        for (list, roles) in ROLE_LISTS.into_iter().zip(self.roles_mut()) {
            outcome.absorb(json::load_field(data, list, roles, notes)?);
        }
        outcome.absorb(json::load_field(data, "names", &mut self.names, notes)?);

        self.validate()?;
        outcome.absorb(self.remove_placeholder_names(notes));
        outcome.absorb(self.canonicalize(notes));
        Ok(outcome)
    }
}

impl JsonStore for CrewInfo {
    fn store(&self) -> Value {
        let mut data = Object::new();
        for (list, roles) in self.roles() {
            json::store_field(&mut data, list, roles);
        }
        json::store_field(&mut data, "names", &self.names);
        json::object_or_null(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(node: Value) -> Object {
        match node {
            Value::Object(data) => data,
            _ => unreachable!(),
        }
    }

    #[test]
    fn role_shapes() {
        let mut notes = Notes::new();
        let mut role = RoleRef::default();
        role.load(&json!(3), &mut notes).unwrap();
        assert_eq!(role, RoleRef::new(3));
        role.load(&json!([1, "voice"]), &mut notes).unwrap();
        assert_eq!(role, RoleRef::with_contribution(1, "voice"));
        role.load(&json!([1, ""]), &mut notes).unwrap();
        assert_eq!(role, RoleRef::new(1));
        assert!(role.load(&json!([1, "voice", 2]), &mut notes).is_err());
        assert!(role.load(&json!("1"), &mut notes).is_err());
    }

    #[test]
    fn identity_shapes() {
        let mut person = PersonIdentity::default();
        person
            .load(&json!(["Ridley Scott", "imdb:nm0000631"]), &mut Notes::new())
            .unwrap();
        assert_eq!(
            person,
            PersonIdentity::with_refs("Ridley Scott", ["imdb:nm0000631"])
        );
        assert_eq!(person.store(), json!(["Ridley Scott", "imdb:nm0000631"]));
        assert_eq!(PersonIdentity::new("Sigourney Weaver").store(), json!("Sigourney Weaver"));
        assert!(person.load(&json!([]), &mut Notes::new()).is_err());
    }

    #[test]
    fn dangling_role_is_rejected_on_load() {
        let data = record(json!({ "crew": { "directors": [2], "names": ["A", "B"] } }));
        let err = CrewInfo::default()
            .load_from_record(&data, &mut Notes::new())
            .unwrap_err();
        assert_eq!(err.path(), "crew");
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn placeholder_names_are_removed() {
        let data = record(json!({ "crew": {
            "directors": [0, 1],
            "writers": [1, 2],
            "cast": [[2, "Ripley"], 1],
            "names": ["Ridley Scott", "N/A", "Sigourney Weaver"],
        } }));
        let mut crew = CrewInfo::default();
        let mut notes = Notes::new();
        let outcome = crew.load_from_record(&data, &mut notes).unwrap();

        assert_eq!(outcome, Outcome::Updated);
        assert!(notes.contains("N/A found in the name list"));
        assert_eq!(crew.directors, [RoleRef::new(0)]);
        assert_eq!(crew.writers, [RoleRef::new(1)]);
        assert_eq!(crew.cast, [RoleRef::with_contribution(1, "Ripley")]);
        assert_eq!(
            crew.names,
            [PersonIdentity::new("Ridley Scott"), PersonIdentity::new("Sigourney Weaver")]
        );
    }

    #[test]
    fn legacy_crew_is_rebuilt() {
        let data = record(json!({
            "crew": {
                "directors": ["ridley"],
                "writers": ["dan", "ridley"],
                "cast": [["sigourney", "Ripley"], "Tom Skerritt"],
            },
            "people": { "ridley": "Ridley Scott", "dan": "Dan O'Bannon", "sigourney": "Sigourney Weaver" },
        }));
        let mut crew = CrewInfo::default();
        let mut notes = Notes::new();
        let outcome = crew.load_from_record(&data, &mut notes).unwrap();

        assert_eq!(outcome, Outcome::Updated);
        assert!(notes.contains("Old-style crew found"));
        assert_eq!(crew.directors, [RoleRef::new(0)]);
        assert_eq!(crew.writers, [RoleRef::new(1), RoleRef::new(0)]);
        assert_eq!(
            crew.cast,
            [RoleRef::with_contribution(2, "Ripley"), RoleRef::new(3)]
        );
        assert_eq!(crew.names[0], PersonIdentity::with_refs("Ridley Scott", ["ridley"]));
        assert_eq!(crew.names[3], PersonIdentity::new("Tom Skerritt"));
    }

    #[test]
    fn unnamed_people_are_dropped() {
        let data = record(json!({ "crew": {
            "cast": [0, [1, "Ripley"], [0, "Extra"]],
            "names": ["", "Sigourney Weaver"],
        } }));
        let mut crew = CrewInfo::default();
        let mut notes = Notes::new();
        let outcome = crew.load_from_record(&data, &mut notes).unwrap();

        assert_eq!(outcome, Outcome::Updated);
        assert!(notes.contains("Unnamed person found in the name list"));
        assert_eq!(crew.cast, [RoleRef::with_contribution(0, "Ripley")]);
        assert_eq!(crew.names, [PersonIdentity::new("Sigourney Weaver")]);
    }

    #[test]
    fn identities_are_renumbered_by_first_use() {
        let data = record(json!({ "crew": {
            "directors": [2],
            "writers": [0, 2],
            "cast": [[3, "Ripley"]],
            "names": [
                "Dan O'Bannon",
                "Unused",
                "Ridley Scott",
                ["Sigourney Weaver", "imdb:nm0000244", "filmweb:1", "imdb"],
            ],
        } }));
        let mut crew = CrewInfo::default();
        let mut notes = Notes::new();
        let outcome = crew.load_from_record(&data, &mut notes).unwrap();

        assert_eq!(outcome, Outcome::Updated);
        assert!(notes.contains("Crew identities renumbered"));
        assert_eq!(crew.directors, [RoleRef::new(0)]);
        assert_eq!(crew.writers, [RoleRef::new(1), RoleRef::new(0)]);
        assert_eq!(crew.cast, [RoleRef::with_contribution(2, "Ripley")]);
        assert_eq!(
            crew.names,
            [
                PersonIdentity::new("Ridley Scott"),
                PersonIdentity::new("Dan O'Bannon"),
                PersonIdentity::with_refs("Sigourney Weaver", ["filmweb:1", "imdb"]),
            ]
        );

        let mut again = crew.clone();
        assert_eq!(again.canonicalize(&mut Notes::new()), Outcome::Unchanged);
        assert_eq!(again, crew);
    }

    #[test]
    fn duplicate_identities_share_an_entry() {
        let mut crew = CrewInfo {
            directors: vec![RoleRef::new(1)],
            cast: vec![RoleRef::new(0)],
            names: vec![
                PersonIdentity::with_refs("Ridley Scott", ["imdb:nm0000631", "filmweb:1"]),
                PersonIdentity::with_refs("Ridley Scott", ["filmweb:1", "imdb:nm0000631"]),
            ],
            ..CrewInfo::default()
        };
        assert_eq!(crew.canonicalize(&mut Notes::new()), Outcome::Updated);
        assert_eq!(crew.directors, [RoleRef::new(0)]);
        assert_eq!(crew.cast, [RoleRef::new(0)]);
        assert_eq!(
            crew.names,
            [PersonIdentity::with_refs("Ridley Scott", ["filmweb:1", "imdb:nm0000631"])]
        );
    }

    #[test]
    fn empty_crew_is_not_stored() {
        assert_eq!(CrewInfo::default().store(), Value::Null);
    }
}
