//! Result taxonomy shared by every load and merge step.
//!
//! Hard failures travel as `Err(..)`; everything else is an [`Outcome`]. An
//! `Updated` outcome is usually paired with a line in [`Notes`] so automatic
//! migrations can be audited later.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Nothing changed semantically.
    #[default]
    Unchanged,
    /// The value changed, either by reconciliation or a legacy-format fixup.
    Updated,
    /// The property was not present; not an error.
    Absent,
}

impl Outcome {
    pub fn changed(changed: bool) -> Self {
        if changed {
            Outcome::Updated
        } else {
            Outcome::Unchanged
        }
    }

    pub fn is_updated(self) -> bool {
        self == Outcome::Updated
    }

    pub fn is_absent(self) -> bool {
        self == Outcome::Absent
    }

    /// Folds the result of a sub-step into this one. `Updated` sticks,
    /// `Absent` from a sub-step never overrides what was already collected.
    pub fn absorb(&mut self, other: Outcome) {
        match (*self, other) {
            (_, Outcome::Updated) => *self = Outcome::Updated,
            (Outcome::Absent, Outcome::Unchanged) => {
                *self = Outcome::Unchanged
            }
            _ => {}
        }
    }

    pub fn and(mut self, other: Outcome) -> Outcome {
        self.absorb(other);
        self
    }
}

/// Human-readable rationale trail for `Updated` outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    lines: Vec<String>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for Notes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            write!(f, "\n- {line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_sticks_and_absent_is_ignored() {
        let mut outcome = Outcome::Unchanged;
        outcome.absorb(Outcome::Absent);
        assert_eq!(outcome, Outcome::Unchanged);
        outcome.absorb(Outcome::Updated);
        outcome.absorb(Outcome::Unchanged);
        outcome.absorb(Outcome::Absent);
        assert_eq!(outcome, Outcome::Updated);
    }

    #[test]
    fn absent_becomes_unchanged_once_something_loads() {
        assert_eq!(Outcome::Absent.and(Outcome::Unchanged), Outcome::Unchanged);
        assert_eq!(Outcome::Absent.and(Outcome::Absent), Outcome::Absent);
    }

    #[test]
    fn notes_render_as_bullets() {
        let mut notes = Notes::new();
        notes.push("Empty sort title string found");
        notes.push("N/A found in the name list");
        assert_eq!(
            notes.to_string(),
            "\n- Empty sort title string found\n- N/A found in the name list"
        );
        assert!(notes.contains("N/A"));
    }
}
