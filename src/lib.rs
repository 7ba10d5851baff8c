//! Batch geometry analysis of quantum-chemistry output files.
//!
//! The library ingests geometry snapshots (XYZ files, Gaussian outputs) into
//! two keyed tables, one row per atom and one row per frame, labels atoms
//! with aliases, resolves symbolic atom references per frame and measures
//! distances, angles and dihedrals across every frame in one pass. Results
//! land as columns of the frame table, next to energies and user constants,
//! and can be combined with arithmetic expressions before export to CSV.
//!
//! # Features
//!
//! - **Keyed storage**: frames are keyed by `(file_name, file_path,
//!   timestep_name)`, atoms additionally by `atom_index`
//! - **Substitution**: assign aliases to atoms selected by exact names or
//!   shell-style wildcards
//! - **Resolution**: numeric labels select by position, other labels by
//!   alias, scoped to each frame
//! - **Measurement**: distance, angle, unsigned and signed dihedral; per-frame
//!   failures leave a missing cell instead of aborting the batch
//! - **Derived columns**: small expression language over frame columns
//! - **I/O**: XYZ and Gaussian output readers, constant tables, CSV export
//!
//! # Quick Start
//!
//! ```
//! use qm_analysis::{
//!     Ambiguity, AtomAttrs, AtomLabel, Dataset, FrameAttrs, FrameKey, MeasurementKind,
//!     MeasurementSpec, ParsedFrame, run_measurements,
//! };
//!
//! let mut data = Dataset::new();
//! let water = ParsedFrame {
//!     attrs: FrameAttrs::new(),
//!     atoms: vec![
//!         AtomAttrs::new("O", [0.0, 0.0, 0.0]),
//!         AtomAttrs::new("H", [0.96, 0.0, 0.0]),
//!         AtomAttrs::new("H", [0.0, 0.96, 0.0]),
//!     ],
//! };
//! data.ingest(FrameKey::new("water", "water.xyz", ""), water)?;
//!
//! let hoh = MeasurementSpec::new(
//!     MeasurementKind::Angle,
//!     "HOH",
//!     vec![AtomLabel::Position(1), AtomLabel::Position(0), AtomLabel::Position(2)],
//! )?;
//! run_measurements(&mut data, &[hoh], Ambiguity::FirstMatch)?;
//!
//! let angle = data.frames.column("HOH").unwrap()[0].as_number().unwrap();
//! assert!((angle - 90.0).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Whole runs are described by a TOML [`Procedure`] and executed with
//! [`pipeline::run`].
//!
//! # Module Organization
//!
//! - [`io`] – Readers for geometry and constants files, CSV export
//! - [`config`] – Procedure files
//! - [`measure`] – Geometric measurements and the batch runner
//! - [`calc`] – Derived columns
//! - [`pipeline`] – Phase-by-phase execution of a procedure

mod model;
mod pattern;
mod resolve;
mod store;
mod substitute;

pub mod calc;
pub mod config;
pub mod io;
pub mod measure;
pub mod pipeline;

pub use model::atom::{AtomAttrs, AtomRecord};
pub use model::elements;
pub use model::frame::{FrameAttrs, ParsedFrame, columns};
pub use model::key::{AtomKey, FrameKey};
pub use model::value::Value;

pub use pattern::{KeyFilter, Pattern, has_glob_meta};
pub use resolve::{Ambiguity, AtomLabel, Resolver};
pub use store::{AtomColumn, AtomStore, Dataset, FrameStore};
pub use substitute::{SubstitutionEntry, SubstitutionRule, apply_substitutions};

pub use calc::{CalcSpec, CalcSummary, run_calculations};
pub use config::Procedure;
pub use measure::{
    MeasurementEngine, MeasurementKind, MeasurementSpec, MeasurementSummary, run_measurements,
};

pub use resolve::Error as ResolveError;
pub use store::Error as StoreError;
