//! Procedure files.
//!
//! A procedure is a TOML document listing the input files to ingest and the
//! directives to run over them: substitutions, measurements, derived
//! columns and outputs. [`Procedure::from_toml_str`] parses and validates
//! the whole document up front, so shape errors surface before any file is
//! read.

mod raw;

use crate::calc::{self, CalcSpec};
use crate::io::{Format, ParseFormatError, export::CsvLayout, export::ExportOptions};
use crate::measure::{self, MeasurementKind, MeasurementSpec};
use crate::model::frame::columns;
use crate::pattern::has_glob_meta;
use crate::resolve::{Ambiguity, AtomLabel};
use crate::substitute::{SubstitutionEntry, SubstitutionRule};
use raw::{RawInput, RawLabel, RawMeasurement, RawOutputFile, RawProcedure};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read procedure file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid procedure file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("input '{path}': {source}")]
    UnknownFileType {
        path: String,
        #[source]
        source: ParseFormatError,
    },

    #[error("input '{path}': {format} files can not be used as input")]
    UnsupportedInput { path: String, format: Format },

    #[error("output '{path}': unsupported output type '{kind}' (expected csv)")]
    UnsupportedOutput { path: String, kind: String },

    #[error("column '{0}' is defined more than once or shadows a built-in column")]
    DuplicateColumn(String),

    #[error("{kind} '{name}' is missing atom '{key}'")]
    MissingAtom {
        kind: MeasurementKind,
        name: String,
        key: &'static str,
    },

    #[error("{kind} '{name}' takes {arity} atoms, unexpected atom '{key}'")]
    UnexpectedAtom {
        kind: MeasurementKind,
        name: String,
        arity: usize,
        key: &'static str,
    },

    #[error("invalid measurement: {0}")]
    Measurement(#[from] measure::Error),

    #[error(transparent)]
    Expression(#[from] calc::Error),

    #[error("{what} #{index} has an empty name")]
    EmptyName { what: &'static str, index: usize },
}

/// One `[[files]]` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    /// Path as written, relative paths resolve against the root path.
    pub path: PathBuf,
    pub format: Format,
    /// Frame `file_name`; defaults to the file name.
    pub name: Option<String>,
    /// Expand `path` as a glob.
    pub glob: bool,
    /// Frame `timestep_name`; empty when not given.
    pub timestep: String,
}

/// One `[[output.files]]` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub options: ExportOptions,
}

/// A validated procedure.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub name: String,
    pub comment: Option<String>,
    pub version: Option<i64>,
    pub ambiguity: Ambiguity,
    pub inputs: Vec<InputFile>,
    pub substitutions: Vec<SubstitutionRule>,
    pub measurements: Vec<MeasurementSpec>,
    pub calculations: Vec<CalcSpec>,
    pub outputs: Vec<OutputFile>,
}

impl Procedure {
    /// Reads and validates a procedure file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let raw: RawProcedure = toml::from_str(text)?;
        validate(raw)
    }

    /// Input files producing frames, in declaration order.
    pub fn geometry_inputs(&self) -> impl Iterator<Item = &InputFile> {
        self.inputs.iter().filter(|i| i.format.is_geometry())
    }

    /// Input files adding constant columns, in declaration order.
    pub fn constant_inputs(&self) -> impl Iterator<Item = &InputFile> {
        self.inputs.iter().filter(|i| i.format.is_constants())
    }
}

fn validate(raw: RawProcedure) -> Result<Procedure, Error> {
    let inputs = raw
        .files
        .into_iter()
        .map(input_file)
        .collect::<Result<Vec<_>, _>>()?;

    let substitutions = raw
        .substitutions
        .into_iter()
        .enumerate()
        .map(|(i, sub)| {
            if sub.name.trim().is_empty() {
                return Err(Error::EmptyName {
                    what: "substitution",
                    index: i + 1,
                });
            }
            let entries = sub
                .entries
                .into_iter()
                .map(|e| SubstitutionEntry {
                    file_name: non_blank(e.file),
                    file_path: non_blank(e.file_path),
                    timestep_name: non_blank(e.timestep),
                    atom_index: e.atom_index,
                })
                .collect();
            Ok(SubstitutionRule {
                alias: sub.name,
                entries,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns: HashSet<String> = columns::BUILTIN
        .iter()
        .chain(columns::GAUSSIAN.iter())
        .map(|c| c.to_string())
        .collect();
    let mut claim = |name: &str| {
        if columns.insert(name.to_string()) {
            Ok(())
        } else {
            Err(Error::DuplicateColumn(name.to_string()))
        }
    };

    let m = raw.measurements;
    let mut measurements = Vec::new();
    for (kind, specs) in [
        (MeasurementKind::Distance, m.distance),
        (MeasurementKind::Angle, m.angle),
        (MeasurementKind::Dihedral, m.dihedral),
        (MeasurementKind::SignedDihedral, m.signed_dihedral),
    ] {
        for (i, spec) in specs.into_iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(Error::EmptyName {
                    what: kind.name(),
                    index: i + 1,
                });
            }
            claim(&spec.name)?;
            measurements.push(measurement(kind, spec)?);
        }
    }

    let mut calculations = Vec::with_capacity(raw.calc.len());
    for (i, calc) in raw.calc.into_iter().enumerate() {
        if calc.name.trim().is_empty() {
            return Err(Error::EmptyName {
                what: "calc",
                index: i + 1,
            });
        }
        claim(&calc.name)?;
        calculations.push(CalcSpec::new(calc.name, &calc.expr)?);
    }

    let outputs = raw
        .output
        .files
        .into_iter()
        .map(output_file)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Procedure {
        name: raw.name,
        comment: raw.comment,
        version: raw.version,
        ambiguity: if raw.strict_resolution {
            Ambiguity::Reject
        } else {
            Ambiguity::FirstMatch
        },
        inputs,
        substitutions,
        measurements,
        calculations,
        outputs,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn input_file(raw: RawInput) -> Result<InputFile, Error> {
    let format: Format = raw.kind.parse().map_err(|e| Error::UnknownFileType {
        path: raw.path.clone(),
        source: e,
    })?;
    if !format.is_geometry() && !format.is_constants() {
        return Err(Error::UnsupportedInput {
            path: raw.path,
            format,
        });
    }
    let glob = raw.glob.unwrap_or_else(|| has_glob_meta(&raw.path));
    Ok(InputFile {
        path: PathBuf::from(raw.path),
        format,
        name: non_blank(raw.name),
        glob,
        timestep: raw.timestep.unwrap_or_default().trim().to_string(),
    })
}

fn label(raw: RawLabel) -> AtomLabel {
    match raw {
        RawLabel::Int(idx) => AtomLabel::Position(idx),
        RawLabel::Text(text) => AtomLabel::parse(&text),
    }
}

const ATOM_KEYS: [&str; 4] = ["a", "b", "c", "d"];

/// Slots `a..` up to the kind's arity must be present and later ones absent.
fn measurement(kind: MeasurementKind, raw: RawMeasurement) -> Result<MeasurementSpec, Error> {
    let slots = [raw.a, raw.b, raw.c, raw.d];
    let arity = kind.arity();
    let mut atoms = Vec::with_capacity(arity);
    for (i, (key, slot)) in ATOM_KEYS.into_iter().zip(slots).enumerate() {
        match (slot, i < arity) {
            (Some(raw_label), true) => atoms.push(label(raw_label)),
            (None, true) => {
                return Err(Error::MissingAtom {
                    kind,
                    name: raw.name,
                    key,
                });
            }
            (Some(_), false) => {
                return Err(Error::UnexpectedAtom {
                    kind,
                    name: raw.name,
                    arity,
                    key,
                });
            }
            (None, false) => {}
        }
    }
    let spec = MeasurementSpec::new(kind, raw.name, atoms)?;
    Ok(match non_blank(raw.timestep) {
        Some(ts) => spec.with_timestep(ts),
        None => spec,
    })
}

fn output_file(raw: RawOutputFile) -> Result<OutputFile, Error> {
    match raw.kind.parse::<Format>() {
        Ok(Format::Csv) => Ok(OutputFile {
            path: PathBuf::from(raw.path),
            options: ExportOptions {
                layout: if raw.multiindex {
                    CsvLayout::MultiIndex
                } else {
                    CsvLayout::Tuples
                },
                include_raw_data: raw.include_raw_data,
            },
        }),
        _ => Err(Error::UnsupportedOutput {
            path: raw.path,
            kind: raw.kind,
        }),
    }
}
