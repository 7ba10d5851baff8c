use std::io::{self, Write};

use anyhow::Error;
use qm_analysis::StoreError;
use qm_analysis::config::Error as ConfigError;
use qm_analysis::io::{Error as IoError, Format};
use qm_analysis::pipeline::Error as PipelineError;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
}

impl HintCollector {
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();

        if let Some(e) = err.downcast_ref::<ConfigError>() {
            collector.config_hints(e);
        } else if let Some(e) = err.downcast_ref::<PipelineError>() {
            collector.pipeline_hints(e);
        } else {
            collector.fallback_hints(err);
        }

        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn config_hints(&mut self, err: &ConfigError) {
        match err {
            ConfigError::Read { source, .. } => self.std_io_hints(source),

            ConfigError::Parse(_) => {
                self.add("The procedure file is not valid TOML or has an unexpected key");
                self.add("Top-level keys: name, comment, version, strict_resolution, files, substitutions, measurements, calc, output");
                self.add("Run `qmana check <PROCEDURE>` to validate without reading any data");
            }

            ConfigError::UnknownFileType { .. } | ConfigError::UnsupportedInput { .. } => {
                self.add("Supported input types: xyz, gaussian_out, global_constants_csv, per_file_constants_csv, frame_constants_csv");
            }

            ConfigError::UnsupportedOutput { .. } => {
                self.add("Only `type = \"csv\"` is supported for [[output.files]]");
            }

            ConfigError::DuplicateColumn(name) => {
                self.add(format!("Rename one of the directives producing '{}'", name));
                self.add("Built-in columns: raw_data, energy, zero_point_energy, comment");
                self.add("Gaussian columns: charge, multiplicity, zpe, thermal, rmsd, rmsf, dipole, nimag");
            }

            ConfigError::Measurement(_)
            | ConfigError::MissingAtom { .. }
            | ConfigError::UnexpectedAtom { .. } => {
                self.add("distance takes a, b; angle takes a, b, c; dihedral and signed_dihedral take a, b, c, d");
            }

            ConfigError::Expression(_) => {
                self.add("Expressions support + - * / ^, parentheses, functions such as sqrt() or deg()");
                self.add("Reference columns with non-identifier names in braces, e.g. {O-H}");
            }

            ConfigError::EmptyName { .. } => {
                self.add("Every substitution, measurement and calc entry needs a non-empty `name`");
            }
        }
    }

    fn pipeline_hints(&mut self, err: &PipelineError) {
        match err {
            PipelineError::Input { source, .. } => self.reader_hints(source),

            PipelineError::Pattern { .. } => {
                self.add("Wildcards are *, ? and [...]; close every '[' or set `glob = false`");
            }

            PipelineError::Glob { source, .. } => {
                self.std_io_hints(source.error());
            }

            PipelineError::Output { source, .. } => {
                self.add("Check that the output directory exists and is writable");
                if let IoError::Io { source } = source {
                    self.std_io_hints(source);
                }
            }

            PipelineError::Store { source, .. } | PipelineError::Integrity(source) => {
                self.store_hints(source);
            }
        }
    }

    fn reader_hints(&mut self, err: &IoError) {
        match err {
            IoError::Io { source } => {
                self.std_io_hints(source);
                self.add("Relative paths resolve against the procedure's directory or --root-path");
            }

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} format",
                    line, format
                ));
                match format {
                    Format::Xyz => {
                        self.add("XYZ files start with an atom count, then a comment line, then one `El x y z` line per atom");
                    }
                    Format::GaussianOut => {
                        self.add("Gaussian outputs need at least one orientation table; check the job ran far enough");
                    }
                    _ => {}
                }
                self.add("Check the `type` given for this file in the procedure");
            }

            IoError::Csv { .. } => {
                self.add("The constants file is not valid CSV (unbalanced quotes or bad encoding?)");
            }

            IoError::MissingColumn { format, column } => {
                self.add(format!("A {} file needs a '{}' header column", format, column));
            }
        }
    }

    fn store_hints(&mut self, err: &StoreError) {
        match err {
            StoreError::DuplicateFrame(_) => {
                self.add("Two inputs produce the same (file_name, file_path, timestep) key");
                self.add("Give each input a distinct `name` or `timestep`");
            }
            _ => {
                self.add("The dataset is inconsistent; please report this with the procedure file");
            }
        }
    }

    fn std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }
            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }
            ErrorKind::InvalidData => {
                self.add("File is not valid UTF-8 text");
            }
            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
        } else if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
