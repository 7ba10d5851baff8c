//! XYZ coordinate files.
//!
//! ```text
//! 3
//! water, optimized
//! O   0.000  0.000  0.117
//! H   0.000  0.757 -0.467  H1
//! H   0.000 -0.757 -0.467  H2  0.41
//! ```
//!
//! The first non-blank line holds the atom count and the line after it is a
//! free-form comment. Each atom line carries an element symbol and three
//! coordinates, optionally followed by an alias and a partial charge.
//! Blank lines between atoms are ignored, as is anything after the last
//! declared atom.

mod reader;

pub use reader::read;
