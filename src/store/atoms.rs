use super::error::Error;
use crate::model::atom::{AtomAttrs, AtomRecord};
use crate::model::key::AtomKey;
use crate::model::value::Value;
use crate::pattern::KeyFilter;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Attribute columns of the atom table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomColumn {
    Element,
    Alias,
    Charge,
    X,
    Y,
    Z,
}

impl AtomColumn {
    pub fn name(self) -> &'static str {
        match self {
            AtomColumn::Element => "element",
            AtomColumn::Alias => "alias",
            AtomColumn::Charge => "charge",
            AtomColumn::X => "x",
            AtomColumn::Y => "y",
            AtomColumn::Z => "z",
        }
    }

    fn value_of(self, record: &AtomRecord) -> Value {
        match self {
            AtomColumn::Element => Value::Text(record.element.clone()),
            AtomColumn::Alias => Value::Text(record.alias.clone()),
            AtomColumn::Charge => Value::from(record.charge),
            AtomColumn::X => Value::Number(record.x()),
            AtomColumn::Y => Value::Number(record.y()),
            AtomColumn::Z => Value::Number(record.z()),
        }
    }
}

impl fmt::Display for AtomColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AtomColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "element" => Ok(AtomColumn::Element),
            "alias" => Ok(AtomColumn::Alias),
            "charge" => Ok(AtomColumn::Charge),
            "x" => Ok(AtomColumn::X),
            "y" => Ok(AtomColumn::Y),
            "z" => Ok(AtomColumn::Z),
            _ => Err(Error::UnknownColumn(s.to_string())),
        }
    }
}

/// Insertion-ordered table of atom records keyed by [`AtomKey`].
///
/// Iteration order equals insertion order, which the resolver relies on to
/// break ties deterministically.
#[derive(Debug, Clone, Default)]
pub struct AtomStore {
    records: Vec<AtomRecord>,
    index: HashMap<AtomKey, usize>,
}

impl AtomStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a new atom.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateAtom`] if `key` is already present; the
    /// store is left unchanged.
    pub fn append(&mut self, key: AtomKey, attrs: AtomAttrs) -> Result<(), Error> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateAtom(key));
        }
        self.index.insert(key.clone(), self.records.len());
        self.records.push(AtomRecord::new(key, attrs));
        Ok(())
    }

    pub fn contains(&self, key: &AtomKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &AtomKey) -> Option<&AtomRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Coordinates of the atom at `key`.
    pub fn position(&self, key: &AtomKey) -> Result<[f64; 3], Error> {
        self.get(key)
            .map(|r| r.position)
            .ok_or_else(|| Error::AtomNotFound(key.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AtomRecord> {
        self.records.iter()
    }

    /// Records whose key matches `filter`, in store order.
    pub fn select<'a>(&'a self, filter: &'a KeyFilter) -> impl Iterator<Item = &'a AtomRecord> {
        self.records.iter().filter(|r| filter.matches_atom(&r.key))
    }

    /// Projects one attribute across all records matching `filter`.
    pub fn column(&self, column: AtomColumn, filter: &KeyFilter) -> Vec<Value> {
        self.select(filter).map(|r| column.value_of(r)).collect()
    }

    /// Sets the alias of the atom at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AtomNotFound`] if no such atom exists.
    pub fn set_alias(&mut self, key: &AtomKey, alias: impl Into<String>) -> Result<(), Error> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| Error::AtomNotFound(key.clone()))?;
        self.records[idx].alias = alias.into();
        Ok(())
    }

    /// Sets the alias of every atom matching `filter` and returns how many
    /// records were touched.
    pub fn set_alias_where(&mut self, filter: &KeyFilter, alias: &str) -> usize {
        let mut count = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| filter.matches_atom(&r.key))
        {
            record.alias = alias.to_string();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::key::FrameKey;
    use crate::pattern::Pattern;

    fn store_with_two_frames() -> AtomStore {
        let mut store = AtomStore::new();
        for name in ["a", "b"] {
            let frame = FrameKey::new(name, format!("{name}.xyz"), "");
            store
                .append(frame.atom(0), AtomAttrs::new("O", [0.0, 0.0, 0.0]))
                .unwrap();
            store
                .append(frame.atom(1), AtomAttrs::new("H", [0.96, 0.0, 0.0]))
                .unwrap();
        }
        store
    }

    #[test]
    fn append_preserves_insertion_order() {
        let store = store_with_two_frames();
        let order: Vec<_> = store
            .iter()
            .map(|r| (r.key.file_name().to_string(), r.key.atom_index))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), 0),
                ("a".to_string(), 1),
                ("b".to_string(), 0),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut store = store_with_two_frames();
        let key = FrameKey::new("a", "a.xyz", "").atom(1);
        let err = store
            .append(key.clone(), AtomAttrs::new("C", [1.0, 1.0, 1.0]))
            .unwrap_err();
        assert_eq!(err, Error::DuplicateAtom(key.clone()));
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(&key).unwrap().element, "H");
    }

    #[test]
    fn set_alias_requires_existing_key() {
        let mut store = store_with_two_frames();
        let key = FrameKey::new("a", "a.xyz", "").atom(0);
        store.set_alias(&key, "O1").unwrap();
        assert_eq!(store.get(&key).unwrap().alias, "O1");

        let missing = FrameKey::new("c", "c.xyz", "").atom(0);
        assert_eq!(
            store.set_alias(&missing, "X"),
            Err(Error::AtomNotFound(missing))
        );
    }

    #[test]
    fn column_projection_respects_filter() {
        let store = store_with_two_frames();
        let filter = KeyFilter::all().file_name(Pattern::compile("b"));
        let elements = store.column(AtomColumn::Element, &filter);
        assert_eq!(elements, vec![Value::from("O"), Value::from("H")]);

        let xs = store.column(AtomColumn::X, &KeyFilter::all().atom_index(1));
        assert_eq!(xs, vec![Value::Number(0.96), Value::Number(0.96)]);

        let aliases = store.column("alias".parse().unwrap(), &KeyFilter::all());
        assert_eq!(aliases[1], Value::from("1"));
    }

    #[test]
    fn unknown_column_name_fails_to_parse() {
        let err = "mass".parse::<AtomColumn>().unwrap_err();
        assert_eq!(err, Error::UnknownColumn("mass".into()));
    }

    #[test]
    fn position_lookup() {
        let store = store_with_two_frames();
        let key = FrameKey::new("b", "b.xyz", "").atom(1);
        assert_eq!(store.position(&key).unwrap(), [0.96, 0.0, 0.0]);
        let missing = FrameKey::new("b", "b.xyz", "").atom(9);
        assert!(matches!(
            store.position(&missing),
            Err(Error::AtomNotFound(_))
        ));
    }
}
