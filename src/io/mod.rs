//! Readers that turn input files into frames and constants, and the CSV
//! exporter for the finished frame table.
//!
//! Readers take any [`BufRead`](std::io::BufRead) and never touch the
//! stores directly; the caller decides the frame key and ingests the result.

use std::fmt;
use std::str::FromStr;

pub mod constants;
pub mod error;
pub mod export;
pub mod gaussian;
pub mod xyz;

pub use error::Error;

/// Input and output file types understood by a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Xyz,
    GaussianOut,
    GlobalConstantsCsv,
    PerFileConstantsCsv,
    FrameConstantsCsv,
    Csv,
}

impl Format {
    /// Formats that produce frames and atoms.
    pub fn is_geometry(self) -> bool {
        matches!(self, Format::Xyz | Format::GaussianOut)
    }

    /// Formats that add columns to existing frames.
    pub fn is_constants(self) -> bool {
        matches!(
            self,
            Format::GlobalConstantsCsv | Format::PerFileConstantsCsv | Format::FrameConstantsCsv
        )
    }

    /// Identifier used for the `type` key of procedure files.
    pub fn key(self) -> &'static str {
        match self {
            Format::Xyz => "xyz",
            Format::GaussianOut => "gaussian_out",
            Format::GlobalConstantsCsv => "global_constants_csv",
            Format::PerFileConstantsCsv => "per_file_constants_csv",
            Format::FrameConstantsCsv => "frame_constants_csv",
            Format::Csv => "csv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
            Format::GaussianOut => write!(f, "Gaussian output"),
            Format::GlobalConstantsCsv => write!(f, "global constants CSV"),
            Format::PerFileConstantsCsv => write!(f, "per-file constants CSV"),
            Format::FrameConstantsCsv => write!(f, "frame constants CSV"),
            Format::Csv => write!(f, "CSV"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file type '{0}'")]
pub struct ParseFormatError(pub String);

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        [
            Format::Xyz,
            Format::GaussianOut,
            Format::GlobalConstantsCsv,
            Format::PerFileConstantsCsv,
            Format::FrameConstantsCsv,
            Format::Csv,
        ]
        .into_iter()
        .find(|f| f.key() == key)
        .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_type_keys_round_trip() {
        assert_eq!("XYZ".parse::<Format>().unwrap(), Format::Xyz);
        assert_eq!("gaussian_out".parse::<Format>().unwrap(), Format::GaussianOut);
        assert_eq!(
            "frame_constants_csv".parse::<Format>().unwrap().key(),
            "frame_constants_csv"
        );
        assert_eq!(
            "xlsx".parse::<Format>(),
            Err(ParseFormatError("xlsx".into()))
        );
    }

    #[test]
    fn format_groups() {
        assert!(Format::Xyz.is_geometry());
        assert!(!Format::Xyz.is_constants());
        assert!(Format::PerFileConstantsCsv.is_constants());
        assert!(!Format::Csv.is_geometry());
    }
}
