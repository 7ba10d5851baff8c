use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("failed to process {format} data: {source}")]
    Csv {
        format: Format,
        #[source]
        source: csv::Error,
    },

    #[error("{format} file has no '{column}' column")]
    MissingColumn {
        format: Format,
        column: &'static str,
    },
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn csv(format: Format, source: csv::Error) -> Self {
        Self::Csv { format, source }
    }
}
