//! Mapping of symbolic atom labels to concrete atom keys.
//!
//! A measurement refers to its atoms by label. A label that parses as an
//! integer is a position in the geometry file (`atom_index`); anything else
//! is an alias assigned by substitution. Both styles can be mixed within a
//! single measurement.

use crate::model::key::AtomKey;
use crate::store::AtomStore;
use log::warn;
use std::fmt;
use thiserror::Error;

/// A resolver label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomLabel {
    /// Selects by `atom_index`. Negative positions never match.
    Position(i64),
    /// Selects by exact alias equality.
    Alias(String),
}

impl AtomLabel {
    /// Classifies `label`: strings that parse as an integer after trimming
    /// are positional, everything else is an alias.
    pub fn parse(label: &str) -> Self {
        match label.trim().parse::<i64>() {
            Ok(idx) => AtomLabel::Position(idx),
            Err(_) => AtomLabel::Alias(label.to_string()),
        }
    }

    fn matches(&self, atom_index: usize, alias: &str) -> bool {
        match self {
            AtomLabel::Position(idx) => usize::try_from(*idx).is_ok_and(|i| i == atom_index),
            AtomLabel::Alias(a) => a == alias,
        }
    }
}

impl fmt::Display for AtomLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomLabel::Position(idx) => write!(f, "{}", idx),
            AtomLabel::Alias(alias) => f.write_str(alias),
        }
    }
}

impl From<&str> for AtomLabel {
    fn from(label: &str) -> Self {
        AtomLabel::parse(label)
    }
}

impl From<i64> for AtomLabel {
    fn from(idx: i64) -> Self {
        AtomLabel::Position(idx)
    }
}

/// What to do when a label matches more than one atom in scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ambiguity {
    /// Take the first candidate in store order and log a warning.
    #[default]
    FirstMatch,
    /// Treat the label as unresolvable for that frame.
    Reject,
}

/// Soft resolution failures. Callers record a missing result for the
/// affected frame and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("atom '{label}' not found (file: {file}, timestep: {timestep})")]
    NotFound {
        label: AtomLabel,
        file: String,
        timestep: String,
    },

    #[error("atom '{label}' is ambiguous: {count} atoms match (file: {file}, timestep: {timestep})")]
    Ambiguous {
        label: AtomLabel,
        file: String,
        timestep: String,
        count: usize,
    },
}

fn is_wildcard(scope: Option<&str>) -> bool {
    scope.is_none_or(|s| s.trim().is_empty())
}

fn scope_name(scope: Option<&str>) -> String {
    match scope {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => "*".to_string(),
    }
}

/// Resolves labels against an [`AtomStore`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    atoms: &'a AtomStore,
    ambiguity: Ambiguity,
}

impl<'a> Resolver<'a> {
    pub fn new(atoms: &'a AtomStore) -> Self {
        Self {
            atoms,
            ambiguity: Ambiguity::default(),
        }
    }

    pub fn with_ambiguity(mut self, ambiguity: Ambiguity) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Finds the atom `label` refers to within the given scope.
    ///
    /// A `file_name` or `timestep_name` that is `None`, empty or blank
    /// matches every value of that dimension.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when nothing matches, and [`Error::Ambiguous`]
    /// when several atoms match under [`Ambiguity::Reject`].
    pub fn resolve(
        &self,
        label: &AtomLabel,
        file_name: Option<&str>,
        timestep_name: Option<&str>,
    ) -> Result<&'a AtomKey, Error> {
        let any_file = is_wildcard(file_name);
        let any_timestep = is_wildcard(timestep_name);

        let atoms = self.atoms;
        let mut candidates = atoms
            .iter()
            .filter(|r| any_file || Some(r.key.file_name()) == file_name)
            .filter(|r| any_timestep || Some(r.key.timestep_name()) == timestep_name)
            .filter(|r| label.matches(r.key.atom_index, &r.alias))
            .map(|r| &r.key);

        let Some(first) = candidates.next() else {
            return Err(Error::NotFound {
                label: label.clone(),
                file: scope_name(file_name),
                timestep: scope_name(timestep_name),
            });
        };

        let rest = candidates.count();
        if rest == 0 {
            return Ok(first);
        }

        match self.ambiguity {
            Ambiguity::FirstMatch => {
                warn!(
                    "atom '{}' matches {} atoms (file: {}, timestep: {}); using {}",
                    label,
                    rest + 1,
                    scope_name(file_name),
                    scope_name(timestep_name),
                    first
                );
                Ok(first)
            }
            Ambiguity::Reject => Err(Error::Ambiguous {
                label: label.clone(),
                file: scope_name(file_name),
                timestep: scope_name(timestep_name),
                count: rest + 1,
            }),
        }
    }
}
