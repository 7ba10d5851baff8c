use super::atom::AtomAttrs;
use super::value::Value;

/// Names of the columns every frame table starts with.
pub mod columns {
    pub const RAW_DATA: &str = "raw_data";
    pub const ENERGY: &str = "energy";
    pub const ZERO_POINT_ENERGY: &str = "zero_point_energy";
    pub const COMMENT: &str = "comment";

    pub const BUILTIN: [&str; 4] = [RAW_DATA, ENERGY, ZERO_POINT_ENERGY, COMMENT];

    pub const CHARGE: &str = "charge";
    pub const MULTIPLICITY: &str = "multiplicity";
    pub const ZPE: &str = "zpe";
    pub const THERMAL: &str = "thermal";
    pub const RMSD: &str = "rmsd";
    pub const RMSF: &str = "rmsf";
    pub const DIPOLE: &str = "dipole";
    pub const NIMAG: &str = "nimag";

    /// Extra columns filled by the Gaussian output reader.
    pub const GAUSSIAN: [&str; 8] = [CHARGE, MULTIPLICITY, ZPE, THERMAL, RMSD, RMSF, DIPOLE, NIMAG];
}

/// Frame-level attributes produced by a reader.
///
/// `extra` holds reader-specific columns (e.g. multiplicity or dipole for
/// Gaussian outputs), appended to the frame table in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAttrs {
    pub raw_data: Option<String>,
    pub energy: Option<f64>,
    pub zero_point_energy: Option<f64>,
    pub comment: Option<String>,
    pub extra: Vec<(String, Value)>,
}

impl FrameAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.push((column.into(), value.into()));
        self
    }

    /// All attributes as `(column, value)` pairs, built-in columns first.
    pub fn into_cells(self) -> Vec<(String, Value)> {
        let mut cells = vec![
            (columns::RAW_DATA.to_string(), Value::from(self.raw_data)),
            (columns::ENERGY.to_string(), Value::from(self.energy)),
            (
                columns::ZERO_POINT_ENERGY.to_string(),
                Value::from(self.zero_point_energy),
            ),
            (columns::COMMENT.to_string(), Value::from(self.comment)),
        ];
        cells.extend(self.extra);
        cells
    }
}

/// Everything a reader extracts from one geometry snapshot.
///
/// Atom indices are implied by position in `atoms`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFrame {
    pub attrs: FrameAttrs,
    pub atoms: Vec<AtomAttrs>,
}

impl ParsedFrame {
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }
}
