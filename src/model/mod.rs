//! Core data structures describing ingested geometry snapshots.
//!
//! - [`key`] – Composite keys identifying frames and atoms.
//! - [`atom`] – Atom attributes as read and atom records as stored.
//! - [`frame`] – Frame attributes, built-in column names and reader output.
//! - [`value`] – Cells of the dynamically typed frame table.
//! - [`elements`] – Atomic number to chemical symbol lookup.
//!
//! Readers produce [`ParsedFrame`]s; the [`crate::store`] module keys them
//! into ordered tables that the substitution, resolution and measurement
//! stages operate on.
//!
//! [`ParsedFrame`]: frame::ParsedFrame

pub mod atom;
pub mod elements;
pub mod frame;
pub mod key;
pub mod value;
