//! Alias assignment by substitution rules.
//!
//! A rule names an alias and lists entries; each entry selects atoms by
//! key. Rules and their entries are applied strictly in order, so when two
//! entries select the same atom the later one decides its alias.

use crate::pattern::{KeyFilter, Pattern};
use crate::store::AtomStore;
use log::{debug, info};

/// One atom selector of a substitution rule.
///
/// Every field left as `None` matches all values of that key dimension.
/// Pattern fields are compiled with [`Pattern::compile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionEntry {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub timestep_name: Option<String>,
    pub atom_index: Option<usize>,
}

impl SubstitutionEntry {
    /// The key filter this entry describes.
    pub fn filter(&self) -> KeyFilter {
        KeyFilter {
            file_name: self.file_name.as_deref().map(Pattern::compile),
            file_path: self.file_path.as_deref().map(Pattern::compile),
            timestep_name: self.timestep_name.as_deref().map(Pattern::compile),
            atom_index: self.atom_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub alias: String,
    pub entries: Vec<SubstitutionEntry>,
}

impl SubstitutionRule {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: SubstitutionEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// Applies `rules` to `atoms` in order.
///
/// Entries that match no atom are not an error.
pub fn apply_substitutions(atoms: &mut AtomStore, rules: &[SubstitutionRule]) {
    for rule in rules {
        for (n, entry) in rule.entries.iter().enumerate() {
            let count = atoms.set_alias_where(&entry.filter(), &rule.alias);
            if count == 0 {
                info!(
                    "substitution '{}' entry #{} matched no atoms",
                    rule.alias,
                    n + 1
                );
            } else {
                debug!(
                    "substitution '{}' entry #{} assigned {} atom(s)",
                    rule.alias,
                    n + 1,
                    count
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::AtomAttrs;
    use crate::model::key::FrameKey;

    fn store(files: &[&str], atoms_per_frame: usize) -> AtomStore {
        let mut store = AtomStore::new();
        for file in files {
            let frame = FrameKey::new(*file, format!("/data/{file}.xyz"), "");
            for idx in 0..atoms_per_frame {
                store
                    .append(frame.atom(idx), AtomAttrs::new("C", [idx as f64, 0.0, 0.0]))
                    .unwrap();
            }
        }
        store
    }

    fn alias_of(store: &AtomStore, file: &str, idx: usize) -> String {
        let key = FrameKey::new(file, format!("/data/{file}.xyz"), "").atom(idx);
        store.get(&key).unwrap().alias.clone()
    }

    #[test]
    fn later_rule_overwrites_earlier_one() {
        let mut atoms = store(&["benz"], 3);
        let rules = vec![
            SubstitutionRule::new("R1").with_entry(SubstitutionEntry {
                atom_index: Some(1),
                ..Default::default()
            }),
            SubstitutionRule::new("R2").with_entry(SubstitutionEntry {
                file_name: Some("benz".into()),
                atom_index: Some(1),
                ..Default::default()
            }),
        ];
        apply_substitutions(&mut atoms, &rules);
        assert_eq!(alias_of(&atoms, "benz", 1), "R2");
        assert_eq!(alias_of(&atoms, "benz", 0), "0");
    }

    #[test]
    fn wildcard_file_pattern_targets_matching_frames_only() {
        let mut atoms = store(&["mol_a", "mol_b", "ref"], 2);
        let rules = vec![SubstitutionRule::new("S1").with_entry(SubstitutionEntry {
            file_name: Some("mol_*".into()),
            atom_index: Some(0),
            ..Default::default()
        })];
        apply_substitutions(&mut atoms, &rules);

        assert_eq!(alias_of(&atoms, "mol_a", 0), "S1");
        assert_eq!(alias_of(&atoms, "mol_b", 0), "S1");
        assert_eq!(alias_of(&atoms, "mol_a", 1), "1");
        assert_eq!(alias_of(&atoms, "ref", 0), "0");
    }

    #[test]
    fn entry_without_constraints_matches_every_atom() {
        let mut atoms = store(&["a", "b"], 2);
        apply_substitutions(
            &mut atoms,
            &[SubstitutionRule::new("X").with_entry(SubstitutionEntry::default())],
        );
        assert!(atoms.iter().all(|r| r.alias == "X"));
    }

    #[test]
    fn rule_matching_nothing_is_silent() {
        let mut atoms = store(&["a"], 2);
        let before: Vec<_> = atoms.iter().map(|r| r.alias.clone()).collect();
        apply_substitutions(
            &mut atoms,
            &[SubstitutionRule::new("none").with_entry(SubstitutionEntry {
                file_name: Some("zzz".into()),
                ..Default::default()
            })],
        );
        let after: Vec<_> = atoms.iter().map(|r| r.alias.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn entries_within_a_rule_accumulate() {
        let mut atoms = store(&["a"], 4);
        let rule = SubstitutionRule::new("ring")
            .with_entry(SubstitutionEntry {
                atom_index: Some(0),
                ..Default::default()
            })
            .with_entry(SubstitutionEntry {
                atom_index: Some(2),
                ..Default::default()
            });
        apply_substitutions(&mut atoms, &[rule]);
        let aliases: Vec<_> = atoms.iter().map(|r| r.alias.as_str()).collect();
        assert_eq!(aliases, vec!["ring", "1", "ring", "3"]);
    }
}
