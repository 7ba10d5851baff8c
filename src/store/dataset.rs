use super::atoms::AtomStore;
use super::error::Error;
use super::frames::FrameStore;
use crate::model::atom::AtomAttrs;
use crate::model::frame::{FrameAttrs, ParsedFrame};
use crate::model::key::{AtomKey, FrameKey};

/// The pair of tables a run operates on.
///
/// Every atom record refers to a frame row; [`Dataset::append_atom`]
/// refuses atoms whose frame is unknown.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub atoms: AtomStore,
    pub frames: FrameStore,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_frame(&mut self, key: FrameKey, attrs: FrameAttrs) -> Result<(), Error> {
        self.frames.append(key, attrs)
    }

    pub fn append_atom(&mut self, key: AtomKey, attrs: AtomAttrs) -> Result<(), Error> {
        if !self.frames.contains(&key.frame) {
            return Err(Error::OrphanAtom(key));
        }
        self.atoms.append(key, attrs)
    }

    /// Adds one parsed geometry snapshot under `key` and returns the number
    /// of atoms stored.
    ///
    /// Atoms are keyed by their position in `frame.atoms`. Since atoms can
    /// only exist under an ingested frame, a fresh frame key cannot collide
    /// with existing atoms.
    pub fn ingest(&mut self, key: FrameKey, frame: ParsedFrame) -> Result<usize, Error> {
        let count = frame.atom_count();
        self.append_frame(key.clone(), frame.attrs)?;
        for (idx, attrs) in frame.atoms.into_iter().enumerate() {
            self.append_atom(key.atom(idx), attrs)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> ParsedFrame {
        ParsedFrame {
            attrs: FrameAttrs {
                comment: Some("water".into()),
                ..FrameAttrs::new()
            },
            atoms: vec![
                AtomAttrs::new("O", [0.0, 0.0, 0.0]),
                AtomAttrs::new("H", [0.96, 0.0, 0.0]),
                AtomAttrs::new("H", [-0.24, 0.93, 0.0]).with_alias("H2"),
            ],
        }
    }

    #[test]
    fn ingest_creates_frame_and_atoms() {
        let mut data = Dataset::new();
        let key = FrameKey::new("w", "w.xyz", "");
        assert_eq!(data.ingest(key.clone(), water()).unwrap(), 3);
        assert_eq!(data.frames.len(), 1);
        assert_eq!(data.atoms.len(), 3);
        assert_eq!(data.atoms.get(&key.atom(1)).unwrap().alias, "1");
        assert_eq!(data.atoms.get(&key.atom(2)).unwrap().alias, "H2");
    }

    #[test]
    fn second_ingest_under_same_key_fails() {
        let mut data = Dataset::new();
        let key = FrameKey::new("w", "w.xyz", "");
        data.ingest(key.clone(), water()).unwrap();
        assert_eq!(
            data.ingest(key.clone(), water()),
            Err(Error::DuplicateFrame(key.clone()))
        );
        assert_eq!(data.atoms.len(), 3);
        assert_eq!(data.frames.len(), 1);
    }

    #[test]
    fn orphan_atoms_are_refused() {
        let mut data = Dataset::new();
        let key = FrameKey::new("ghost", "ghost.xyz", "").atom(0);
        assert_eq!(
            data.append_atom(key.clone(), AtomAttrs::new("C", [0.0; 3])),
            Err(Error::OrphanAtom(key))
        );
        assert!(data.atoms.is_empty());
    }
}
