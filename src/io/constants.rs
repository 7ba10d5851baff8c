//! Constant tables that add columns to already ingested frames.
//!
//! Three layouts are supported:
//!
//! - **global**: two columns `name,value`; every pair becomes a column
//!   holding the same value on every frame.
//! - **per-file**: a `file_name` column plus any number of value columns,
//!   joined to frames on `file_name`. A value column whose name already
//!   exists in the frame table is stored as `<name>_perfile`.
//! - **frame**: one or more label columns (`file_name`, `file_path`,
//!   `timestep_name`) plus value columns. Labels may be glob patterns; a row
//!   writes its values into every matching frame, later rows winning.

use super::{Format, error::Error};
use crate::model::value::Value;
use crate::pattern::{KeyFilter, Pattern};
use crate::store::{self, FrameStore};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::HashMap;
use std::io::Read;

const FILE_NAME: &str = "file_name";
const FILE_PATH: &str = "file_path";
const TIMESTEP_NAME: &str = "timestep_name";

const PERFILE_SUFFIX: &str = "_perfile";

fn records<R: Read>(
    reader: R,
    format: Format,
) -> Result<(StringRecord, Vec<StringRecord>), Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| Error::csv(format, e))?
        .clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::csv(format, e))?;
    Ok((headers, rows))
}

fn column_position(
    headers: &StringRecord,
    format: Format,
    column: &'static str,
) -> Result<usize, Error> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or(Error::MissingColumn { format, column })
}

fn cell(row: &StringRecord, idx: usize) -> Value {
    row.get(idx).map_or(Value::Missing, Value::from_field)
}

/// Constants shared by every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConstants {
    pub values: Vec<(String, Value)>,
}

impl GlobalConstants {
    pub fn read<R: Read>(reader: R) -> Result<Self, Error> {
        let format = Format::GlobalConstantsCsv;
        let (headers, rows) = records(reader, format)?;
        let name = column_position(&headers, format, "name")?;
        let value = column_position(&headers, format, "value")?;

        let values = rows
            .iter()
            .filter_map(|row| {
                let column = row.get(name).filter(|n| !n.is_empty())?;
                Some((column.to_string(), cell(row, value)))
            })
            .collect();
        Ok(Self { values })
    }

    /// Broadcasts every constant to all frames and returns the number of
    /// columns written.
    pub fn apply(&self, frames: &mut FrameStore) -> Result<usize, store::Error> {
        for (name, value) in &self.values {
            debug!("global constant '{}' = {}", name, value);
            frames.write_column(name, vec![value.clone(); frames.len()])?;
        }
        Ok(self.values.len())
    }
}

/// Constants keyed by the frame's `file_name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerFileConstants {
    pub columns: Vec<String>,
    pub rows: Vec<(String, Vec<Value>)>,
}

impl PerFileConstants {
    pub fn read<R: Read>(reader: R) -> Result<Self, Error> {
        let format = Format::PerFileConstantsCsv;
        let (headers, records) = records(reader, format)?;
        let key = column_position(&headers, format, FILE_NAME)?;

        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|&(idx, name)| idx != key && !name.is_empty())
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let rows = records
            .iter()
            .filter_map(|row| {
                let file_name = row.get(key).filter(|n| !n.is_empty())?;
                let cells = value_columns.iter().map(|&(idx, _)| cell(row, idx)).collect();
                Some((file_name.to_string(), cells))
            })
            .collect();

        Ok(Self {
            columns: value_columns.into_iter().map(|(_, name)| name).collect(),
            rows,
        })
    }

    /// Joins the table onto the frames and returns the number of frames
    /// that found a matching row.
    pub fn apply(&self, frames: &mut FrameStore) -> Result<usize, store::Error> {
        let by_file: HashMap<&str, &[Value]> = self
            .rows
            .iter()
            .map(|(file, cells)| (file.as_str(), cells.as_slice()))
            .collect();

        let matched: Vec<Option<&[Value]>> = frames
            .keys()
            .iter()
            .map(|key| by_file.get(key.file_name.as_str()).copied())
            .collect();

        for (i, column) in self.columns.iter().enumerate() {
            let target = if frames.has_column(column) {
                let renamed = format!("{column}{PERFILE_SUFFIX}");
                info!(
                    "per-file constant '{}' collides with an existing column; storing it as '{}'",
                    column, renamed
                );
                renamed
            } else {
                column.clone()
            };
            let cells = matched
                .iter()
                .map(|row| row.map_or(Value::Missing, |cells| cells[i].clone()))
                .collect();
            frames.write_column(&target, cells)?;
        }

        Ok(matched.iter().filter(|m| m.is_some()).count())
    }
}

/// Constants addressed to frames by (possibly wildcarded) key labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameConstants {
    pub columns: Vec<String>,
    pub rows: Vec<(KeyFilter, Vec<Value>)>,
}

impl FrameConstants {
    pub fn read<R: Read>(reader: R) -> Result<Self, Error> {
        let format = Format::FrameConstantsCsv;
        let (headers, records) = records(reader, format)?;

        let labels: Vec<(&str, usize)> = [FILE_NAME, FILE_PATH, TIMESTEP_NAME]
            .into_iter()
            .filter_map(|label| headers.iter().position(|h| h == label).map(|i| (label, i)))
            .collect();
        if labels.is_empty() {
            return Err(Error::MissingColumn {
                format,
                column: FILE_NAME,
            });
        }

        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|&(idx, name)| !name.is_empty() && labels.iter().all(|&(_, l)| l != idx))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let rows = records
            .iter()
            .map(|row| {
                let filter = labels.iter().fold(KeyFilter::all(), |filter, &(label, idx)| {
                    let Some(raw) = row.get(idx) else {
                        return filter;
                    };
                    if Value::from_field(raw).is_missing() {
                        return filter;
                    }
                    let pattern = Pattern::compile(raw);
                    match label {
                        FILE_NAME => filter.file_name(pattern),
                        FILE_PATH => filter.file_path(pattern),
                        _ => filter.timestep_name(pattern),
                    }
                });
                let cells = value_columns.iter().map(|&(idx, _)| cell(row, idx)).collect();
                (filter, cells)
            })
            .collect();

        Ok(Self {
            columns: value_columns.into_iter().map(|(_, name)| name).collect(),
            rows,
        })
    }

    /// Writes every row into the frames it matches and returns the number
    /// of distinct frames touched.
    pub fn apply(&self, frames: &mut FrameStore) -> Result<usize, store::Error> {
        for column in &self.columns {
            frames.ensure_column(column);
        }

        let mut touched = vec![false; frames.len()];
        for (filter, cells) in &self.rows {
            let selected = frames.select(filter);
            if selected.is_empty() {
                debug!("frame constants row {:?} matches no frame", filter);
            }
            for row in selected {
                let key = frames.keys()[row].clone();
                for (column, value) in self.columns.iter().zip(cells) {
                    frames.set(&key, column, value.clone())?;
                }
                touched[row] = true;
            }
        }
        Ok(touched.iter().filter(|&&t| t).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::FrameAttrs;
    use crate::model::key::FrameKey;
    use std::io::Cursor;

    fn frames() -> FrameStore {
        let mut store = FrameStore::new();
        for (name, path, ts) in [
            ("mol_a", "scan/mol_a.xyz", "opt"),
            ("mol_a", "scan/mol_a.xyz", "freq"),
            ("mol_b", "scan/mol_b.xyz", "opt"),
            ("ref", "ref.log", ""),
        ] {
            store
                .append(FrameKey::new(name, path, ts), FrameAttrs::new())
                .unwrap();
        }
        store
    }

    #[test]
    fn global_constants_broadcast_to_every_frame() {
        let csv = "name,value\ntemperature,298.15\nmethod,B3LYP\n";
        let constants = GlobalConstants::read(Cursor::new(csv)).unwrap();
        let mut store = frames();
        assert_eq!(constants.apply(&mut store).unwrap(), 2);

        let temps = store.column("temperature").unwrap();
        assert!(temps.iter().all(|v| *v == Value::Number(298.15)));
        let methods = store.column("method").unwrap();
        assert!(methods.iter().all(|v| *v == Value::Text("B3LYP".into())));
    }

    #[test]
    fn global_constants_need_name_and_value() {
        let err = GlobalConstants::read(Cursor::new("key,value\nx,1\n")).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                column: "name",
                ..
            }
        ));
    }

    #[test]
    fn per_file_constants_join_on_file_name() {
        let csv = "file_name,reference,energy\nmol_a,1.5,-10\nmol_b,2.5,-20\nunused,9,9\n";
        let constants = PerFileConstants::read(Cursor::new(csv)).unwrap();
        let mut store = frames();
        assert_eq!(constants.apply(&mut store).unwrap(), 3);

        assert_eq!(
            store.column("reference").unwrap(),
            &[
                Value::Number(1.5),
                Value::Number(1.5),
                Value::Number(2.5),
                Value::Missing
            ]
        );
        // "energy" is a built-in column, so the joined values get a suffix.
        assert!(store.column("energy").unwrap().iter().all(Value::is_missing));
        assert_eq!(
            store.column("energy_perfile").unwrap()[2],
            Value::Number(-20.0)
        );
    }

    #[test]
    fn frame_constants_match_globs_and_later_rows_win() {
        let csv = "file_name,timestep_name,weight\nmol_*,,1\nmol_a,freq,2\n";
        let constants = FrameConstants::read(Cursor::new(csv)).unwrap();
        let mut store = frames();
        assert_eq!(constants.apply(&mut store).unwrap(), 3);

        assert_eq!(
            store.column("weight").unwrap(),
            &[
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(1.0),
                Value::Missing
            ]
        );
    }

    #[test]
    fn frame_constants_accept_any_label_column() {
        let csv = "file_path,note\nscan/*,scan\n";
        let constants = FrameConstants::read(Cursor::new(csv)).unwrap();
        let mut store = frames();
        assert_eq!(constants.apply(&mut store).unwrap(), 3);
        let key = FrameKey::new("ref", "ref.log", "");
        assert!(store.get(&key, "note").unwrap().is_missing());

        let err = FrameConstants::read(Cursor::new("name,value\n")).unwrap_err();
        assert!(err.to_string().contains("file_name"));
    }

    #[test]
    fn unmatched_frame_rows_still_create_columns() {
        let csv = "file_name,flag\nnothing,1\n";
        let constants = FrameConstants::read(Cursor::new(csv)).unwrap();
        let mut store = frames();
        assert_eq!(constants.apply(&mut store).unwrap(), 0);
        assert!(store.column("flag").unwrap().iter().all(Value::is_missing));
    }
}
