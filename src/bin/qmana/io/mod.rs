use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use qm_analysis::Procedure;

use crate::cli::ProcedureOptions;

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Directory relative procedure paths resolve against: the explicit root,
/// else the directory holding the procedure file.
pub fn root_path(options: &ProcedureOptions) -> PathBuf {
    if let Some(root) = &options.root_path {
        return root.clone();
    }
    options
        .procedure
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

pub fn load_procedure(options: &ProcedureOptions) -> Result<(Procedure, PathBuf)> {
    let procedure = Procedure::load(&options.procedure).with_context(|| {
        format!(
            "Failed to load procedure: {}",
            options.procedure.display()
        )
    })?;
    Ok((procedure, root_path(options)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(procedure: &str, root: Option<&str>) -> ProcedureOptions {
        ProcedureOptions {
            procedure: PathBuf::from(procedure),
            root_path: root.map(PathBuf::from),
        }
    }

    #[test]
    fn root_defaults_to_procedure_directory() {
        assert_eq!(
            root_path(&options("runs/scan/proc.toml", None)),
            PathBuf::from("runs/scan")
        );
        assert_eq!(root_path(&options("proc.toml", None)), PathBuf::from("."));
        assert_eq!(
            root_path(&options("runs/proc.toml", Some("/data"))),
            PathBuf::from("/data")
        );
    }
}
