use std::fmt;

/// Composite key of a frame: one ingested file, or one timestep within a file.
///
/// An empty `timestep_name` marks a frame read without a timestep label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameKey {
    pub file_name: String,
    pub file_path: String,
    pub timestep_name: String,
}

impl FrameKey {
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        timestep_name: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            timestep_name: timestep_name.into(),
        }
    }

    /// Key of the atom at `atom_index` within this frame.
    pub fn atom(&self, atom_index: usize) -> AtomKey {
        AtomKey {
            frame: self.clone(),
            atom_index,
        }
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', '{}', '{}')",
            self.file_name, self.file_path, self.timestep_name
        )
    }
}

/// Composite key of an atom record: the owning frame key plus the atom's
/// position in the geometry file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomKey {
    pub frame: FrameKey,
    pub atom_index: usize,
}

impl AtomKey {
    pub fn new(frame: FrameKey, atom_index: usize) -> Self {
        Self { frame, atom_index }
    }

    #[inline]
    pub fn file_name(&self) -> &str {
        &self.frame.file_name
    }

    #[inline]
    pub fn file_path(&self) -> &str {
        &self.frame.file_path
    }

    #[inline]
    pub fn timestep_name(&self) -> &str {
        &self.frame.timestep_name
    }
}

impl fmt::Display for AtomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', '{}', '{}', {})",
            self.frame.file_name, self.frame.file_path, self.frame.timestep_name, self.atom_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_key_display_is_tuple_like() {
        let key = FrameKey::new("benz", "data/benzene.xyz", "opt");
        assert_eq!(key.to_string(), "('benz', 'data/benzene.xyz', 'opt')");
    }

    #[test]
    fn atom_key_carries_frame_prefix() {
        let frame = FrameKey::new("benz", "data/benzene.xyz", "");
        let atom = frame.atom(4);
        assert_eq!(atom.frame, frame);
        assert_eq!(atom.atom_index, 4);
        assert_eq!(atom.file_name(), "benz");
        assert_eq!(atom.timestep_name(), "");
        assert_eq!(atom.to_string(), "('benz', 'data/benzene.xyz', '', 4)");
    }
}
