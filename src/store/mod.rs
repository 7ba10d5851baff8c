//! In-memory tables of atoms and frames.
//!
//! [`AtomStore`] holds one row per atom keyed by
//! `(file_name, file_path, timestep_name, atom_index)`; [`FrameStore`] holds
//! one row per frame keyed by the first three components and grows columns
//! as measurements, constants and calculations are added. [`Dataset`] owns
//! both and keeps them referentially consistent.

mod atoms;
mod dataset;
mod error;
mod frames;

pub use atoms::{AtomColumn, AtomStore};
pub use dataset::Dataset;
pub use error::Error;
pub use frames::FrameStore;
