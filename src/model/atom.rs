use super::key::AtomKey;

/// Attributes of an atom as produced by a geometry reader, before it is
/// keyed into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomAttrs {
    pub element: String,
    /// Alias supplied by the input file; `None` falls back to the atom index.
    pub alias: Option<String>,
    pub charge: Option<f64>,
    /// Cartesian coordinates in Ångström.
    pub position: [f64; 3],
}

impl AtomAttrs {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            element: element.into(),
            alias: None,
            charge: None,
            position,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }
}

/// One row of the atom table.
///
/// Only `alias` may change after the record has been appended.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub key: AtomKey,
    pub element: String,
    pub alias: String,
    pub charge: Option<f64>,
    pub position: [f64; 3],
}

impl AtomRecord {
    pub fn new(key: AtomKey, attrs: AtomAttrs) -> Self {
        let alias = attrs
            .alias
            .unwrap_or_else(|| key.atom_index.to_string());
        Self {
            key,
            element: attrs.element,
            alias,
            charge: attrs.charge,
            position: attrs.position,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position[1]
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.position[2]
    }
}
