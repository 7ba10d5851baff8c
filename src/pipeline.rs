//! Execution of a [`Procedure`] against files on disk.
//!
//! [`Pipeline`] exposes the phases separately so callers can report
//! progress between them; [`run`] executes all of them in order:
//! ingest, substitute, constants, measure, calc, export.

use crate::calc::{self, CalcSummary};
use crate::config::{InputFile, OutputFile, Procedure};
use crate::io::{self, Format, constants, export, gaussian, xyz};
use crate::measure::{self, MeasurementSummary};
use crate::model::key::FrameKey;
use crate::pattern::Pattern;
use crate::store::{self, Dataset};
use crate::substitute;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to expand '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    #[error("failed to write '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("while loading '{path}': {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: store::Error,
    },

    #[error(transparent)]
    Integrity(#[from] store::Error),
}

/// Joins `path` onto `root` unless it is absolute.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One concrete file produced by expanding an [`InputFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedInput {
    pub path: PathBuf,
    /// Frame `file_name` for geometry inputs.
    pub name: String,
}

/// Glob pattern for `path` under `root`, with `root` itself escaped so
/// that only the configured path contributes wildcards.
fn glob_pattern(root: &Path, path: &Path) -> String {
    if path.is_absolute() {
        return path.to_string_lossy().into_owned();
    }
    let root = glob::Pattern::escape(&root.to_string_lossy());
    Path::new(&root).join(path).to_string_lossy().into_owned()
}

/// Resolves `input` against `root` and expands globs.
///
/// Wildcards may appear in any path component. Only regular files are
/// kept and matches are sorted by path. A single match is named like a
/// plain input (the configured name, else the file name); several matches
/// are named `name + stem` so each gets its own frame key.
pub fn expand_input(root: &Path, input: &InputFile) -> Result<Vec<ExpandedInput>, Error> {
    if !input.glob {
        let path = resolve_path(root, &input.path);
        let name = input.name.clone().unwrap_or_else(|| file_name(&path));
        return Ok(vec![ExpandedInput { path, name }]);
    }

    let pattern = glob_pattern(root, &input.path);
    let paths = glob::glob(&pattern).map_err(|e| Error::Pattern {
        pattern: pattern.clone(),
        source: e,
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| Error::Glob {
            pattern: pattern.clone(),
            source: e,
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }
    matches.sort();

    if matches.is_empty() {
        warn!("'{}' matches no files", pattern);
    }

    let single = matches.len() == 1;
    Ok(matches
        .into_iter()
        .map(|path| {
            let name = match (&input.name, single) {
                (Some(name), true) => name.clone(),
                (Some(name), false) => format!("{name}{}", file_stem(&path)),
                (None, _) => file_name(&path),
            };
            ExpandedInput { path, name }
        })
        .collect())
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::Input {
            path: path.to_path_buf(),
            source: e.into(),
        })
}

/// Counts gathered while running a procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub frames: usize,
    pub atoms: usize,
    pub constant_files: usize,
    pub measurements: Vec<MeasurementSummary>,
    pub calculations: Vec<CalcSummary>,
    pub outputs: Vec<PathBuf>,
}

/// A procedure bound to a root directory and the dataset it fills.
#[derive(Debug)]
pub struct Pipeline<'p> {
    procedure: &'p Procedure,
    root: PathBuf,
    data: Dataset,
    report: RunReport,
}

impl<'p> Pipeline<'p> {
    pub fn new(procedure: &'p Procedure, root: impl Into<PathBuf>) -> Self {
        Self {
            procedure,
            root: root.into(),
            data: Dataset::new(),
            report: RunReport::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_parts(self) -> (Dataset, RunReport) {
        (self.data, self.report)
    }

    /// Reads every geometry input into the dataset.
    pub fn ingest(&mut self) -> Result<(), Error> {
        let procedure = self.procedure;
        for input in procedure.geometry_inputs() {
            for file in expand_input(&self.root, input)? {
                let key = FrameKey::new(
                    file.name,
                    file.path.display().to_string(),
                    input.timestep.clone(),
                );
                let atoms = ingest_geometry(&mut self.data, &file.path, input.format, key)?;
                self.report.frames += 1;
                self.report.atoms += atoms;
            }
        }
        info!(
            "ingested {} frame(s) with {} atom(s)",
            self.report.frames, self.report.atoms
        );
        Ok(())
    }

    pub fn substitute(&mut self) {
        substitute::apply_substitutions(&mut self.data.atoms, &self.procedure.substitutions);
    }

    /// Applies the constant tables in declaration order.
    pub fn constants(&mut self) -> Result<(), Error> {
        let procedure = self.procedure;
        for input in procedure.constant_inputs() {
            for file in expand_input(&self.root, input)? {
                apply_constants(&mut self.data, &file.path, input.format)?;
                self.report.constant_files += 1;
            }
        }
        Ok(())
    }

    pub fn measure(&mut self) -> Result<(), Error> {
        self.report.measurements = measure::run_measurements(
            &mut self.data,
            &self.procedure.measurements,
            self.procedure.ambiguity,
        )?;
        Ok(())
    }

    pub fn calculate(&mut self) -> Result<(), Error> {
        self.report.calculations =
            calc::run_calculations(&mut self.data.frames, &self.procedure.calculations)?;
        Ok(())
    }

    pub fn export(&mut self) -> Result<(), Error> {
        for output in &self.procedure.outputs {
            let path = export_frames(&self.data, &self.root, output)?;
            self.report.outputs.push(path);
        }
        Ok(())
    }
}

/// Parses one geometry file and ingests it under `key`. Returns the number
/// of atoms read.
pub fn ingest_geometry(
    data: &mut Dataset,
    path: &Path,
    format: Format,
    key: FrameKey,
) -> Result<usize, Error> {
    let reader = open(path)?;
    let parsed = match format {
        Format::Xyz => xyz::read(reader),
        Format::GaussianOut => gaussian::read(reader),
        other => Err(io::Error::parse(other, 0, "not a geometry format")),
    }
    .map_err(|e| Error::Input {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("{}: {} atom(s) as {}", path.display(), parsed.atom_count(), key);
    data.ingest(key, parsed).map_err(|e| Error::Store {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads one constants table and joins it onto the frames.
pub fn apply_constants(data: &mut Dataset, path: &Path, format: Format) -> Result<(), Error> {
    let reader = open(path)?;
    let input_error = |e: io::Error| Error::Input {
        path: path.to_path_buf(),
        source: e,
    };
    let frames = &mut data.frames;
    let touched = match format {
        Format::GlobalConstantsCsv => constants::GlobalConstants::read(reader)
            .map_err(input_error)?
            .apply(frames)?,
        Format::PerFileConstantsCsv => constants::PerFileConstants::read(reader)
            .map_err(input_error)?
            .apply(frames)?,
        Format::FrameConstantsCsv => constants::FrameConstants::read(reader)
            .map_err(input_error)?
            .apply(frames)?,
        other => {
            return Err(input_error(io::Error::parse(
                other,
                0,
                "not a constants format",
            )));
        }
    };
    debug!("{}: applied ({})", path.display(), touched);
    Ok(())
}

/// Writes the frame table to `output.path` resolved against `root`.
pub fn export_frames(data: &Dataset, root: &Path, output: &OutputFile) -> Result<PathBuf, Error> {
    let path = resolve_path(root, &output.path);
    let output_error = |e: io::Error| Error::Output {
        path: path.clone(),
        source: e,
    };
    let file = File::create(&path).map_err(|e| output_error(e.into()))?;
    export::write(BufWriter::new(file), &data.frames, &output.options).map_err(output_error)?;
    info!("wrote {} frame(s) to {}", data.frames.len(), path.display());
    Ok(path)
}

/// Runs every phase of `procedure` with relative paths resolved against
/// `root`.
pub fn run(procedure: &Procedure, root: &Path) -> Result<(Dataset, RunReport), Error> {
    let mut pipeline = Pipeline::new(procedure, root);
    pipeline.ingest()?;
    pipeline.substitute();
    pipeline.constants()?;
    pipeline.measure()?;
    pipeline.calculate()?;
    pipeline.export()?;
    Ok(pipeline.into_parts())
}
