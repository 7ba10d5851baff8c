//! CSV export of the frame table.

use super::{Format, error::Error};
use crate::model::frame::columns;
use crate::store::FrameStore;
use csv::WriterBuilder;
use std::io::Write;

/// How frame keys are laid out in the exported table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvLayout {
    /// A single `label` column holding the key tuple, e.g.
    /// `('benz', 'data/benz.xyz', 'opt')`.
    #[default]
    Tuples,
    /// Three leading columns `file_name`, `file_path` and `timestep_name`.
    MultiIndex,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub layout: CsvLayout,
    /// Keep the `raw_data` column, which holds full file contents.
    pub include_raw_data: bool,
}

/// Writes every frame as one CSV row. Missing cells are written empty.
pub fn write<W: Write>(writer: W, frames: &FrameStore, options: &ExportOptions) -> Result<(), Error> {
    let mut out = WriterBuilder::new().has_headers(false).from_writer(writer);

    let keep: Vec<bool> = frames
        .column_names()
        .map(|name| options.include_raw_data || name != columns::RAW_DATA)
        .collect();

    let mut header: Vec<&str> = match options.layout {
        CsvLayout::Tuples => vec!["label"],
        CsvLayout::MultiIndex => vec!["file_name", "file_path", "timestep_name"],
    };
    header.extend(
        frames
            .column_names()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| name),
    );
    out.write_record(&header)
        .map_err(|e| Error::csv(Format::Csv, e))?;

    for (key, cells) in frames.rows() {
        let mut record: Vec<String> = match options.layout {
            CsvLayout::Tuples => vec![key.to_string()],
            CsvLayout::MultiIndex => vec![
                key.file_name.clone(),
                key.file_path.clone(),
                key.timestep_name.clone(),
            ],
        };
        record.extend(
            cells
                .into_iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|(cell, _)| cell.to_string()),
        );
        out.write_record(&record)
            .map_err(|e| Error::csv(Format::Csv, e))?;
    }

    out.flush()?;
    Ok(())
}
