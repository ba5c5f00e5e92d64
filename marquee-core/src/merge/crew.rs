//! Crew reconciliation.
//!
//! Role lists are compared by the people they name rather than by index,
//! since the two records number their identities independently. Each list
//! is resolved into self-contained entries, merged by name, then written
//! back against a freshly built identity list.

use std::collections::BTreeMap;

use marquee_model::{CrewInfo, Outcome, PersonIdentity, RoleRef};

use super::{MergeContext, MergeResult, Mergeable};
use crate::error::MergeError;

#[derive(Debug, Clone)]
struct CrewEntry {
    name: String,
    refs: BTreeMap<String, String>,
    contribution: Option<String>,
    position: usize,
    existing: bool,
}

impl CrewEntry {
    fn absorb(mut self, incoming: CrewEntry) -> CrewEntry {
        for (key, value) in incoming.refs {
            self.refs.entry(key).or_insert(value);
        }
        if incoming.contribution.is_some() {
            self.contribution = incoming.contribution;
        }
        self
    }

    /// Index of this person in `used`, appending a new identity when no
    /// entry with the same name and references exists yet.
    fn add_to(&self, used: &mut Vec<PersonIdentity>) -> i64 {
        let person = PersonIdentity::from_ref_map(self.name.clone(), &self.refs);
        let index = match used.iter().position(|known| *known == person) {
            Some(index) => index,
            None => {
                used.push(person);
                used.len() - 1
            }
        };
        index as i64
    }
}

fn resolve(
    list: &'static str,
    roles: &[RoleRef],
    names: &[PersonIdentity],
    existing: bool,
) -> Result<Vec<CrewEntry>, MergeError> {
    let mut entries = roles
        .iter()
        .enumerate()
        .map(|(position, role)| {
            let person = usize::try_from(role.id)
                .ok()
                .and_then(|id| names.get(id))
                .ok_or(MergeError::DanglingRole {
                    list,
                    index: role.id,
                    names: names.len(),
                })?;
            Ok(CrewEntry {
                name: person.name.clone(),
                refs: person.ref_map(),
                contribution: role.contribution.clone(),
                position,
                existing,
            })
        })
        .collect::<Result<Vec<_>, MergeError>>()?;

    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.contribution.cmp(&b.contribution))
            .then_with(|| a.refs.cmp(&b.refs))
            .then_with(|| a.position.cmp(&b.position))
    });
    Ok(entries)
}

fn merge_entries(stored: Vec<CrewEntry>, incoming: Vec<CrewEntry>) -> Vec<CrewEntry> {
    let mut merged = Vec::with_capacity(stored.len() + incoming.len());
    let mut stored = stored.into_iter().peekable();
    let mut incoming = incoming.into_iter().peekable();

    loop {
        match (stored.peek(), incoming.peek()) {
            (None, None) => break,
            (Some(_), None) => merged.extend(stored.next()),
            (None, Some(_)) => merged.extend(incoming.next()),
            (Some(older), Some(newer))
                if !older.name.is_empty() && older.name == newer.name =>
            {
                if let (Some(older), Some(newer)) = (stored.next(), incoming.next()) {
                    merged.push(older.absorb(newer));
                }
            }
            (Some(older), Some(newer)) if older.name <= newer.name => {
                merged.extend(stored.next())
            }
            (Some(_), Some(_)) => merged.extend(incoming.next()),
        }
    }

    merged.sort_by(|a, b| {
        b.existing
            .cmp(&a.existing)
            .then_with(|| a.position.cmp(&b.position))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.contribution.cmp(&b.contribution))
            .then_with(|| a.refs.cmp(&b.refs))
    });
    merged
}

impl Mergeable for CrewInfo {
    fn merge_from(&mut self, incoming: &Self, _: &mut MergeContext) -> MergeResult {
        let mut used = Vec::with_capacity(self.names.len());
        let mut lists: [Vec<RoleRef>; 3] = Default::default();

        for (slot, ((list, stored), (_, fresh))) in
            self.roles().into_iter().zip(incoming.roles()).enumerate()
        {
            let stored = resolve(list, stored, &self.names, true)?;
            let fresh = resolve(list, fresh, &incoming.names, false)?;
            lists[slot] = merge_entries(stored, fresh)
                .into_iter()
                .map(|entry| RoleRef {
                    id: entry.add_to(&mut used),
                    contribution: entry.contribution,
                })
                .collect();
        }

        let mut outcome = Outcome::Unchanged;
        for (roles, merged) in self.roles_mut().into_iter().zip(lists) {
            if *roles != merged {
                *roles = merged;
                outcome = Outcome::Updated;
            }
        }
        if used != self.names {
            self.names = used;
            outcome = Outcome::Updated;
        }
        Ok(outcome)
    }
}
