use super::error::Error;
use crate::model::frame::{FrameAttrs, columns};
use crate::model::key::FrameKey;
use crate::model::value::Value;
use crate::pattern::KeyFilter;
use std::collections::HashMap;

static MISSING: Value = Value::Missing;

#[derive(Debug, Clone)]
struct Column {
    name: String,
    cells: Vec<Value>,
}

/// Column-oriented table of per-frame values keyed by [`FrameKey`].
///
/// The table always has one cell per row in every column. Adding a column
/// fills it with [`Value::Missing`]; adding a row pads every column the new
/// row does not provide.
#[derive(Debug, Clone)]
pub struct FrameStore {
    keys: Vec<FrameKey>,
    index: HashMap<FrameKey, usize>,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
}

impl Default for FrameStore {
    fn default() -> Self {
        let mut store = Self {
            keys: Vec::new(),
            index: HashMap::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
        };
        for name in columns::BUILTIN {
            store.ensure_column(name);
        }
        store
    }
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Appends a new frame row.
    ///
    /// Attributes naming a column that does not exist yet create it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFrame`] if `key` is already present; the
    /// store is left unchanged.
    pub fn append(&mut self, key: FrameKey, attrs: FrameAttrs) -> Result<(), Error> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateFrame(key));
        }
        let row = self.keys.len();
        self.index.insert(key.clone(), row);
        self.keys.push(key);
        for column in &mut self.columns {
            column.cells.push(Value::Missing);
        }
        for (name, value) in attrs.into_cells() {
            let col = self.ensure_column(&name);
            self.columns[col].cells[row] = value;
        }
        Ok(())
    }

    pub fn contains(&self, key: &FrameKey) -> bool {
        self.index.contains_key(key)
    }

    /// Row number of `key`, in insertion order.
    pub fn row(&self, key: &FrameKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// All frame keys in insertion order.
    pub fn keys(&self) -> &[FrameKey] {
        &self.keys
    }

    /// Cell at (`key`, `column`).
    ///
    /// A column that has never been created reads as [`Value::Missing`].
    pub fn get(&self, key: &FrameKey, column: &str) -> Result<&Value, Error> {
        let row = self
            .row(key)
            .ok_or_else(|| Error::FrameNotFound(key.clone()))?;
        Ok(self
            .column_index
            .get(column)
            .map_or(&MISSING, |&c| &self.columns[c].cells[row]))
    }

    /// Writes a single cell, creating the column if needed.
    pub fn set(
        &mut self,
        key: &FrameKey,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<(), Error> {
        let row = self
            .row(key)
            .ok_or_else(|| Error::FrameNotFound(key.clone()))?;
        let col = self.ensure_column(column);
        self.columns[col].cells[row] = value.into();
        Ok(())
    }

    /// Creates `name` filled with [`Value::Missing`] if it does not exist and
    /// returns its position.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(&col) = self.column_index.get(name) {
            return col;
        }
        let col = self.columns.len();
        self.columns.push(Column {
            name: name.to_string(),
            cells: vec![Value::Missing; self.keys.len()],
        });
        self.column_index.insert(name.to_string(), col);
        col
    }

    /// Replaces (or creates) a whole column at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLength`] unless `cells` has exactly one value
    /// per row.
    pub fn write_column(&mut self, name: &str, cells: Vec<Value>) -> Result<(), Error> {
        if cells.len() != self.keys.len() {
            return Err(Error::ColumnLength {
                column: name.to_string(),
                expected: self.keys.len(),
                got: cells.len(),
            });
        }
        let col = self.ensure_column(name);
        self.columns[col].cells = cells;
        Ok(())
    }

    /// All cells of `name` in row order.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.column_index
            .get(name)
            .map(|&c| self.columns[c].cells.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Column names in creation order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Row numbers of frames matching `filter`, in insertion order.
    pub fn select(&self, filter: &KeyFilter) -> Vec<usize> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| filter.matches_frame(key))
            .map(|(row, _)| row)
            .collect()
    }

    /// Iterates rows as `(key, cells)` with cells in column order.
    pub fn rows(&self) -> impl Iterator<Item = (&FrameKey, Vec<&Value>)> {
        self.keys.iter().enumerate().map(|(row, key)| {
            let cells = self.columns.iter().map(|c| &c.cells[row]).collect();
            (key, cells)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn key(name: &str, ts: &str) -> FrameKey {
        FrameKey::new(name, format!("/data/{name}.log"), ts)
    }

    #[test]
    fn new_store_has_builtin_columns() {
        let store = FrameStore::new();
        let names: Vec<_> = store.column_names().collect();
        assert_eq!(names, columns::BUILTIN.to_vec());
        assert!(store.is_empty());
    }

    #[test]
    fn append_fills_builtin_and_extra_columns() {
        let mut store = FrameStore::new();
        let attrs = FrameAttrs {
            energy: Some(-76.4),
            ..FrameAttrs::new()
        }
        .with_extra("multiplicity", 1.0);
        store.append(key("water", ""), attrs).unwrap();

        let k = key("water", "");
        assert_eq!(store.get(&k, "energy").unwrap(), &Value::Number(-76.4));
        assert_eq!(store.get(&k, "multiplicity").unwrap(), &Value::Number(1.0));
        assert!(store.get(&k, "comment").unwrap().is_missing());
        assert!(store.get(&k, "never_created").unwrap().is_missing());
    }

    #[test]
    fn new_columns_are_padded_with_missing() {
        let mut store = FrameStore::new();
        store
            .append(key("a", ""), FrameAttrs::new().with_extra("dipole", 1.2))
            .unwrap();
        store.append(key("b", ""), FrameAttrs::new()).unwrap();

        let dipole = store.column("dipole").unwrap();
        assert_eq!(dipole, &[Value::Number(1.2), Value::Missing]);

        store.set(&key("b", ""), "note", "ok").unwrap();
        assert_eq!(store.column("note").unwrap(), &[Value::Missing, Value::from("ok")]);
    }

    #[test]
    fn duplicate_frame_is_rejected_without_side_effects() {
        let mut store = FrameStore::new();
        store.append(key("a", "opt"), FrameAttrs::new()).unwrap();
        let err = store
            .append(key("a", "opt"), FrameAttrs::new().with_extra("x", 1.0))
            .unwrap_err();
        assert_eq!(err, Error::DuplicateFrame(key("a", "opt")));
        assert_eq!(store.len(), 1);
        assert!(!store.has_column("x"));
    }

    #[test]
    fn write_column_checks_length() {
        let mut store = FrameStore::new();
        store.append(key("a", ""), FrameAttrs::new()).unwrap();
        store.append(key("b", ""), FrameAttrs::new()).unwrap();

        let err = store
            .write_column("d", vec![Value::Number(1.0)])
            .unwrap_err();
        assert!(matches!(err, Error::ColumnLength { expected: 2, got: 1, .. }));

        store
            .write_column("d", vec![Value::Number(1.0), Value::Missing])
            .unwrap();
        assert_eq!(store.get(&key("a", ""), "d").unwrap(), &Value::Number(1.0));
    }

    #[test]
    fn unknown_frame_is_reported() {
        let store = FrameStore::new();
        assert_eq!(
            store.get(&key("z", ""), "energy"),
            Err(Error::FrameNotFound(key("z", "")))
        );
    }

    #[test]
    fn select_filters_rows_by_key() {
        let mut store = FrameStore::new();
        for (name, ts) in [("scan_1", "opt"), ("scan_2", "opt"), ("ref", "opt"), ("scan_1", "freq")] {
            store.append(key(name, ts), FrameAttrs::new()).unwrap();
        }
        let filter = KeyFilter::all()
            .file_name(Pattern::compile("scan_*"))
            .timestep_name(Pattern::compile("opt"));
        assert_eq!(store.select(&filter), vec![0, 1]);
        assert_eq!(store.select(&KeyFilter::all()).len(), 4);
    }

    #[test]
    fn rows_follow_column_order() {
        let mut store = FrameStore::new();
        store
            .append(
                key("a", ""),
                FrameAttrs {
                    comment: Some("hello".into()),
                    ..FrameAttrs::new()
                },
            )
            .unwrap();
        let (k, cells) = store.rows().next().unwrap();
        assert_eq!(k, &key("a", ""));
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3], &Value::from("hello"));
    }
}
