use anyhow::{Context, Result};
use log::warn;

use qm_analysis::pipeline::Pipeline;
use qm_analysis::{Ambiguity, MeasurementKind};

use crate::cli::RunArgs;
use crate::display::{
    Context as DisplayContext, Progress, print_dataset_summary, print_measurements,
    print_procedure,
};
use crate::io::load_procedure;
use crate::util::text::count;

const TOTAL_STEPS: u8 = 6;

pub fn run_procedure(args: RunArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS, "Analysis complete");

    progress.step("Loading procedure");
    let (mut procedure, root) = load_procedure(&args.procedure)?;
    if args.strict {
        procedure.ambiguity = Ambiguity::Reject;
    }
    if procedure.outputs.is_empty() {
        warn!("procedure has no [[output.files]]; results will not be written");
    }
    progress.complete_step(
        "Loading procedure",
        &[format!("{}", args.procedure.procedure.display())],
    );

    if ctx.interactive {
        print_procedure(&procedure, &root);
    }

    let mut pipeline = Pipeline::new(&procedure, &root);

    progress.step("Reading input files");
    pipeline.ingest().context("Failed to read input files")?;
    let report = pipeline.report();
    progress.complete_step(
        "Reading input files",
        &[
            count(report.frames, "frame"),
            count(report.atoms, "atom"),
        ],
    );

    progress.step("Applying substitutions and constants");
    pipeline.substitute();
    pipeline.constants().context("Failed to apply constants")?;
    progress.complete_step(
        "Applying substitutions and constants",
        &[
            count(procedure.substitutions.len(), "substitution rule"),
            count(pipeline.report().constant_files, "constants file"),
        ],
    );

    progress.step("Measuring geometry");
    pipeline.measure().context("Measurement failed")?;
    let substeps = measurement_substeps(pipeline.report().measurements.as_slice());
    progress.complete_step("Measuring geometry", &substeps);

    progress.step("Evaluating derived columns");
    pipeline.calculate().context("Calculation failed")?;
    let incomplete = pipeline
        .report()
        .calculations
        .iter()
        .filter(|c| !c.unknown_columns.is_empty())
        .count();
    let mut calc_substeps = vec![count(procedure.calculations.len(), "expression")];
    if incomplete > 0 {
        calc_substeps.push(format!("{} with unknown columns", incomplete));
    }
    progress.complete_step("Evaluating derived columns", &calc_substeps);

    progress.step("Writing output");
    pipeline.export().context("Failed to write output")?;
    let written: Vec<String> = pipeline
        .report()
        .outputs
        .iter()
        .map(|p| format!("Write {}", p.display()))
        .collect();
    progress.complete_step("Writing output", &written);

    if ctx.interactive {
        print_measurements(&pipeline.report().measurements);
        print_dataset_summary(pipeline.report());
    }

    progress.finish();

    Ok(())
}

fn measurement_substeps(summaries: &[qm_analysis::MeasurementSummary]) -> Vec<String> {
    MeasurementKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let of_kind: Vec<_> = summaries.iter().filter(|s| s.kind == kind).collect();
            if of_kind.is_empty() {
                return None;
            }
            let failed: usize = of_kind.iter().map(|s| s.failed).sum();
            let mut line = count(of_kind.len(), kind.name());
            if failed > 0 {
                line.push_str(&format!(" ({} missing cells)", failed));
            }
            Some(line)
        })
        .collect()
}
