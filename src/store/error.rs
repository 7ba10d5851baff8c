use crate::model::key::{AtomKey, FrameKey};
use thiserror::Error;

/// Integrity violations of the atom and frame tables.
///
/// All variants are fatal for the record or operation that caused them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("a frame with key {0} already exists")]
    DuplicateFrame(FrameKey),

    #[error("an atom with key {0} already exists")]
    DuplicateAtom(AtomKey),

    #[error("no frame with key {0}")]
    FrameNotFound(FrameKey),

    #[error("no atom with key {0}")]
    AtomNotFound(AtomKey),

    #[error("atom {0} refers to a frame that has not been ingested")]
    OrphanAtom(AtomKey),

    #[error("unknown atom column '{0}' (expected element, alias, charge, x, y or z)")]
    UnknownColumn(String),

    #[error("column '{column}' has {got} cells but the frame table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}
