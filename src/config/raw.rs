//! Serde mirror of the procedure file. Nothing here is validated beyond
//! its shape; see [`Procedure`](super::Procedure) for the checked form.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProcedure {
    #[serde(default)]
    pub name: String,
    pub comment: Option<String>,
    pub version: Option<i64>,
    #[serde(default)]
    pub strict_resolution: bool,
    #[serde(default)]
    pub files: Vec<RawInput>,
    #[serde(default)]
    pub substitutions: Vec<RawSubstitution>,
    #[serde(default)]
    pub measurements: RawMeasurements,
    #[serde(default)]
    pub calc: Vec<RawCalc>,
    #[serde(default)]
    pub output: RawOutput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInput {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub glob: Option<bool>,
    pub timestep: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubstitution {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<RawSubstitutionEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubstitutionEntry {
    pub file: Option<String>,
    pub file_path: Option<String>,
    pub timestep: Option<String>,
    pub atom_index: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMeasurements {
    #[serde(default)]
    pub distance: Vec<RawMeasurement>,
    #[serde(default)]
    pub angle: Vec<RawMeasurement>,
    #[serde(default)]
    pub dihedral: Vec<RawMeasurement>,
    #[serde(default)]
    pub signed_dihedral: Vec<RawMeasurement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMeasurement {
    pub name: String,
    pub a: Option<RawLabel>,
    pub b: Option<RawLabel>,
    pub c: Option<RawLabel>,
    pub d: Option<RawLabel>,
    pub timestep: Option<String>,
}

/// Atom labels may be written as TOML integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCalc {
    pub name: String,
    pub expr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOutput {
    #[serde(default)]
    pub files: Vec<RawOutputFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOutputFile {
    pub path: String,
    #[serde(rename = "type", default = "default_output_kind")]
    pub kind: String,
    #[serde(default)]
    pub multiindex: bool,
    #[serde(default)]
    pub include_raw_data: bool,
}

fn default_output_kind() -> String {
    "csv".to_string()
}
