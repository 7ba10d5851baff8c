//! Exact and shell-style wildcard matching of key values.
//!
//! Substitution entries and frame-constant rows select records by comparing
//! key components (file name, file path, timestep name) against patterns.
//! A pattern that contains any of `*`, `?` or `[` is compiled into a glob
//! matcher; any other pattern only matches an identical string.
//!
//! Glob syntax follows `fnmatch`:
//!
//! | Token      | Matches                                        |
//! |------------|------------------------------------------------|
//! | `*`        | any sequence of characters, including none     |
//! | `?`        | exactly one character                          |
//! | `[abc]`    | one character from the set                     |
//! | `[a-z]`    | one character from the range                   |
//! | `[!abc]`   | one character not in the set                   |
//!
//! A pattern that is not a valid glob (an unterminated `[`) falls back to
//! string equality. Matching is case-sensitive and `*` also matches path
//! separators.

use crate::model::key::{AtomKey, FrameKey};

const GLOB_META: [char; 3] = ['*', '?', '['];

/// Returns `true` if `pattern` contains a glob metacharacter and therefore
/// needs wildcard matching rather than string equality.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// A compiled key pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    glob: Option<glob::Pattern>,
}

impl Pattern {
    /// Compiles `pattern`, choosing glob matching only when it contains
    /// glob metacharacters.
    pub fn compile(pattern: &str) -> Self {
        let glob = if has_glob_meta(pattern) {
            glob::Pattern::new(pattern).ok()
        } else {
            None
        };
        Self {
            source: pattern.to_string(),
            glob,
        }
    }

    /// A pattern that matches `value` literally, even if it contains
    /// glob metacharacters.
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            source: value.into(),
            glob: None,
        }
    }

    #[inline]
    pub fn is_glob(&self) -> bool {
        self.glob.is_some()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.glob {
            None => self.source == candidate,
            Some(glob) => glob.matches(candidate),
        }
    }
}

/// Conjunction of optional per-dimension constraints on record keys.
///
/// Dimensions left as `None` match every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    pub file_name: Option<Pattern>,
    pub file_path: Option<Pattern>,
    pub timestep_name: Option<Pattern>,
    pub atom_index: Option<usize>,
}

impl KeyFilter {
    /// A filter without constraints.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn file_name(mut self, pattern: Pattern) -> Self {
        self.file_name = Some(pattern);
        self
    }

    pub fn file_path(mut self, pattern: Pattern) -> Self {
        self.file_path = Some(pattern);
        self
    }

    pub fn timestep_name(mut self, pattern: Pattern) -> Self {
        self.timestep_name = Some(pattern);
        self
    }

    pub fn atom_index(mut self, atom_index: usize) -> Self {
        self.atom_index = Some(atom_index);
        self
    }

    /// Matches the frame dimensions only; `atom_index` is ignored.
    pub fn matches_frame(&self, key: &FrameKey) -> bool {
        let hit = |pattern: &Option<Pattern>, value: &str| {
            pattern.as_ref().is_none_or(|p| p.matches(value))
        };
        hit(&self.file_name, &key.file_name)
            && hit(&self.file_path, &key.file_path)
            && hit(&self.timestep_name, &key.timestep_name)
    }

    pub fn matches_atom(&self, key: &AtomKey) -> bool {
        self.atom_index.is_none_or(|idx| idx == key.atom_index) && self.matches_frame(&key.frame)
    }
}
