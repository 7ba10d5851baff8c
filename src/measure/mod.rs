//! Geometric measurements over resolved atoms.
//!
//! A [`MeasurementSpec`] names a measurement kind and the labels of the atoms
//! it involves. [`run_measurements`] evaluates each spec for every frame of a
//! [`Dataset`] and writes the results as one frame column per spec.
//!
//! Per-frame failures (an unresolvable label, coincident atoms) never abort
//! the run: the cell is left [`Value::Missing`] and the failure is logged.

pub mod geometry;

use crate::model::key::{AtomKey, FrameKey};
use crate::model::value::Value;
use crate::resolve::{self, Ambiguity, AtomLabel, Resolver};
use crate::store::{self, AtomStore, Dataset};
use geometry::GeometryError;
use log::{debug, warn};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use geometry::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Distance,
    Angle,
    /// Unsigned torsion, [0°, 180°].
    Dihedral,
    /// Signed torsion, (-180°, 180°].
    SignedDihedral,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 4] = [
        MeasurementKind::Distance,
        MeasurementKind::Angle,
        MeasurementKind::Dihedral,
        MeasurementKind::SignedDihedral,
    ];

    /// Number of atoms the measurement takes.
    pub fn arity(self) -> usize {
        match self {
            MeasurementKind::Distance => 2,
            MeasurementKind::Angle => 3,
            MeasurementKind::Dihedral | MeasurementKind::SignedDihedral => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MeasurementKind::Distance => "distance",
            MeasurementKind::Angle => "angle",
            MeasurementKind::Dihedral => "dihedral",
            MeasurementKind::SignedDihedral => "signed_dihedral",
        }
    }

    /// Unit of the computed value.
    pub fn unit(self) -> &'static str {
        match self {
            MeasurementKind::Distance => "Å",
            _ => "°",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeasurementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasurementKind::ALL
            .into_iter()
            .find(|k| k.name() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] resolve::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] store::Error),

    #[error("{kind} '{name}' takes {expected} atoms, got {got}")]
    Arity {
        kind: MeasurementKind,
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown measurement kind '{0}'")]
    UnknownKind(String),
}

/// One measurement directive.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSpec {
    kind: MeasurementKind,
    name: String,
    atoms: Vec<AtomLabel>,
    timestep: Option<String>,
}

impl MeasurementSpec {
    /// # Errors
    ///
    /// Returns [`Error::Arity`] if `atoms` does not hold exactly as many
    /// labels as `kind` needs.
    pub fn new(
        kind: MeasurementKind,
        name: impl Into<String>,
        atoms: Vec<AtomLabel>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if atoms.len() != kind.arity() {
            return Err(Error::Arity {
                kind,
                name,
                expected: kind.arity(),
                got: atoms.len(),
            });
        }
        Ok(Self {
            kind,
            name,
            atoms,
            timestep: None,
        })
    }

    /// Restricts evaluation to frames whose timestep name equals `timestep`.
    pub fn with_timestep(mut self, timestep: impl Into<String>) -> Self {
        self.timestep = Some(timestep.into());
        self
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[AtomLabel] {
        &self.atoms
    }

    pub fn timestep(&self) -> Option<&str> {
        self.timestep.as_deref()
    }

    fn applies_to(&self, frame: &FrameKey) -> bool {
        self.timestep
            .as_deref()
            .is_none_or(|ts| ts == frame.timestep_name)
    }
}

/// Computes measurements from atom keys. Holds no state besides the atom
/// table it reads coordinates from.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementEngine<'a> {
    atoms: &'a AtomStore,
}

impl<'a> MeasurementEngine<'a> {
    pub fn new(atoms: &'a AtomStore) -> Self {
        Self { atoms }
    }

    fn positions<const N: usize>(&self, keys: [&AtomKey; N]) -> Result<[Vec3; N], Error> {
        let mut out = [[0.0; 3]; N];
        for (slot, key) in out.iter_mut().zip(keys) {
            *slot = self.atoms.position(key)?;
        }
        Ok(out)
    }

    pub fn distance(&self, a: &AtomKey, b: &AtomKey) -> Result<f64, Error> {
        let [pa, pb] = self.positions([a, b])?;
        Ok(geometry::distance(pa, pb))
    }

    pub fn angle(&self, a: &AtomKey, b: &AtomKey, c: &AtomKey) -> Result<f64, Error> {
        let [pa, pb, pc] = self.positions([a, b, c])?;
        Ok(geometry::angle(pa, pb, pc)?)
    }

    pub fn plane_normal(&self, a: &AtomKey, b: &AtomKey, c: &AtomKey) -> Result<Vec3, Error> {
        let [pa, pb, pc] = self.positions([a, b, c])?;
        Ok(geometry::plane_normal(pa, pb, pc)?)
    }

    /// Unsigned dihedral; see [`geometry::dihedral`].
    pub fn dihedral(
        &self,
        a: &AtomKey,
        b: &AtomKey,
        c: &AtomKey,
        d: &AtomKey,
    ) -> Result<f64, Error> {
        let [pa, pb, pc, pd] = self.positions([a, b, c, d])?;
        Ok(geometry::dihedral(pa, pb, pc, pd)?)
    }

    pub fn signed_dihedral(
        &self,
        a: &AtomKey,
        b: &AtomKey,
        c: &AtomKey,
        d: &AtomKey,
    ) -> Result<f64, Error> {
        let [pa, pb, pc, pd] = self.positions([a, b, c, d])?;
        Ok(geometry::signed_dihedral(pa, pb, pc, pd)?)
    }

    /// Dispatches on `kind`. `keys` must hold `kind.arity()` atoms.
    pub fn measure(&self, kind: MeasurementKind, keys: &[&AtomKey]) -> Result<f64, Error> {
        match (kind, keys) {
            (MeasurementKind::Distance, [a, b]) => self.distance(a, b),
            (MeasurementKind::Angle, [a, b, c]) => self.angle(a, b, c),
            (MeasurementKind::Dihedral, [a, b, c, d]) => self.dihedral(a, b, c, d),
            (MeasurementKind::SignedDihedral, [a, b, c, d]) => self.signed_dihedral(a, b, c, d),
            _ => Err(Error::Arity {
                kind,
                name: kind.name().to_string(),
                expected: kind.arity(),
                got: keys.len(),
            }),
        }
    }

    /// Resolves the labels of `spec` within `frame` and measures.
    pub fn evaluate(
        &self,
        resolver: &Resolver<'_>,
        spec: &MeasurementSpec,
        frame: &FrameKey,
    ) -> Result<f64, Error> {
        let keys = spec
            .atoms
            .iter()
            .map(|label| {
                resolver.resolve(
                    label,
                    Some(frame.file_name.as_str()),
                    Some(frame.timestep_name.as_str()),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.measure(spec.kind, &keys)
    }
}

/// Outcome counts for one measurement column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementSummary {
    pub name: String,
    pub kind: MeasurementKind,
    pub computed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// The column existed before and was overwritten.
    pub replaced: bool,
}

/// Evaluates every spec over every frame and stores one column per spec.
///
/// Frames outside a spec's timestep filter and frames where evaluation
/// fails get [`Value::Missing`]. Only store integrity errors are returned.
pub fn run_measurements(
    data: &mut Dataset,
    specs: &[MeasurementSpec],
    ambiguity: Ambiguity,
) -> Result<Vec<MeasurementSummary>, store::Error> {
    let mut summaries = Vec::with_capacity(specs.len());

    for spec in specs {
        let (cells, mut summary) = {
            let resolver = Resolver::new(&data.atoms).with_ambiguity(ambiguity);
            let engine = MeasurementEngine::new(&data.atoms);
            measure_column(&engine, &resolver, spec, data.frames.keys())
        };
        if data.frames.has_column(&spec.name) {
            warn!("{} '{}' replaces existing column", spec.kind, spec.name);
            summary.replaced = true;
        }
        debug!(
            "{} '{}': {} computed, {} failed, {} skipped",
            spec.kind, spec.name, summary.computed, summary.failed, summary.skipped
        );
        data.frames.write_column(&spec.name, cells)?;
        summaries.push(summary);
    }

    Ok(summaries)
}

fn measure_column(
    engine: &MeasurementEngine<'_>,
    resolver: &Resolver<'_>,
    spec: &MeasurementSpec,
    frames: &[FrameKey],
) -> (Vec<Value>, MeasurementSummary) {
    let mut summary = MeasurementSummary {
        name: spec.name.clone(),
        kind: spec.kind,
        computed: 0,
        failed: 0,
        skipped: 0,
        replaced: false,
    };

    let cells = frames
        .iter()
        .map(|frame| {
            if !spec.applies_to(frame) {
                summary.skipped += 1;
                return Value::Missing;
            }
            match engine.evaluate(resolver, spec, frame) {
                Ok(v) => {
                    summary.computed += 1;
                    Value::Number(v)
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("{} '{}' for frame {}: {}", spec.kind, spec.name, frame, e);
                    Value::Missing
                }
            }
        })
        .collect();

    (cells, summary)
}
