use anyhow::Result;
use log::warn;

use qm_analysis::pipeline::expand_input;

use crate::cli::CheckArgs;
use crate::display::{Context as DisplayContext, Progress, print_input_files, print_procedure};
use crate::io::load_procedure;
use crate::util::text::count;

const TOTAL_STEPS: u8 = 2;

/// Validates the procedure and expands its inputs without reading them.
pub fn run_check(args: CheckArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS, "Procedure OK");

    progress.step("Validating procedure");
    let (procedure, root) = load_procedure(&args.procedure)?;
    progress.complete_step(
        "Validating procedure",
        &[
            count(procedure.measurements.len(), "measurement"),
            count(procedure.calculations.len(), "calculation"),
        ],
    );

    progress.step("Locating input files");
    let mut listing = Vec::with_capacity(procedure.inputs.len());
    let mut missing = 0;
    for input in &procedure.inputs {
        let files = expand_input(&root, input)?;
        let absent: Vec<_> = files.iter().filter(|f| !f.path.is_file()).collect();
        for file in &absent {
            warn!("input file {} does not exist", file.path.display());
        }
        missing += absent.len();
        if files.is_empty() {
            missing += 1;
        }
        listing.push((
            format!("{} [{}]", input.path.display(), input.format.key()),
            files,
        ));
    }
    let found: usize = listing.iter().map(|(_, files)| files.len()).sum();
    let mut substeps = vec![count(found, "file")];
    if missing > 0 {
        substeps.push(format!("{} missing", count(missing, "input")));
    }
    progress.complete_step("Locating input files", &substeps);

    if ctx.interactive {
        print_procedure(&procedure, &root);
        print_input_files(&listing);
    }

    progress.finish();

    if missing > 0 {
        anyhow::bail!("{} of the procedure could not be found", count(missing, "input"));
    }
    Ok(())
}
