use std::io::{self, Write};
use std::path::Path;

use qm_analysis::pipeline::{ExpandedInput, RunReport};
use qm_analysis::{Ambiguity, MeasurementSummary, Procedure};

use crate::util::text::{count, truncate};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_procedure(procedure: &Procedure, root: &Path) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = Vec::new();
    if !procedure.name.is_empty() {
        rows.push(("Name", procedure.name.clone()));
    }
    if let Some(comment) = &procedure.comment {
        rows.push(("Comment", comment.clone()));
    }
    rows.push(("Root Path", root.display().to_string()));
    rows.push((
        "Inputs",
        format!(
            "{} geometry, {} constants",
            procedure.geometry_inputs().count(),
            procedure.constant_inputs().count()
        ),
    ));
    rows.push(("Substitutions", procedure.substitutions.len().to_string()));
    rows.push(("Measurements", procedure.measurements.len().to_string()));
    rows.push(("Calculations", procedure.calculations.len().to_string()));
    rows.push(("Outputs", procedure.outputs.len().to_string()));
    rows.push((
        "Resolution",
        match procedure.ambiguity {
            Ambiguity::FirstMatch => "first match".to_string(),
            Ambiguity::Reject => "unique only".to_string(),
        },
    ));

    print_kv_table(&mut out, "Procedure", &rows);
}

pub fn print_dataset_summary(report: &RunReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Frames", report.frames.to_string()),
        ("Atoms", report.atoms.to_string()),
        ("Constant Files", report.constant_files.to_string()),
    ];
    for path in &report.outputs {
        rows.push(("Output", path.display().to_string()));
    }

    print_kv_table(&mut out, "Dataset", &rows);
}

pub fn print_measurements(summaries: &[MeasurementSummary]) {
    if summaries.is_empty() {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let kind_w = 15usize;
    let num_w = 5usize;
    let sep_overhead = 16;
    let name_w = SAFE_TABLE_WIDTH.saturating_sub(kind_w + 3 * num_w + sep_overhead);

    let line = |l: &str, m: &str, r: &str| {
        format!(
            "{INDENT}{l}{}{m}{}{m}{}{m}{}{m}{}{r}",
            "─".repeat(name_w + 2),
            "─".repeat(kind_w + 2),
            "─".repeat(num_w + 2),
            "─".repeat(num_w + 2),
            "─".repeat(num_w + 2),
        )
    };

    let _ = writeln!(out, "{}┌─ Measurements ─┐", INDENT);
    let _ = writeln!(out, "{}", line("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{INDENT}│ {:<name_w$} │ {:<kind_w$} │ {:>num_w$} │ {:>num_w$} │ {:>num_w$} │",
        "Name", "Kind", "OK", "Fail", "Skip",
    );
    let _ = writeln!(out, "{}", line("├", "┼", "┤"));

    for s in summaries {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<name_w$} │ {:<kind_w$} │ {:>num_w$} │ {:>num_w$} │ {:>num_w$} │",
            truncate(&s.name, name_w),
            s.kind.name(),
            s.computed,
            s.failed,
            s.skipped,
        );
    }

    let _ = writeln!(out, "{}", line("└", "┴", "┘"));
}

pub fn print_input_files(files: &[(String, Vec<ExpandedInput>)]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let name_w = 16usize;
    let sep_overhead = 7;
    let path_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + sep_overhead);

    for (title, expanded) in files {
        let _ = writeln!(
            out,
            "{}┌─ {} ({}) ─┐",
            INDENT,
            truncate(title, SAFE_TABLE_WIDTH - 12),
            count(expanded.len(), "file")
        );
        if expanded.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "{INDENT}┌{}┬{}┐",
            "─".repeat(name_w + 2),
            "─".repeat(path_w + 2)
        );
        for file in expanded {
            let path = file.path.display().to_string();
            let _ = writeln!(
                out,
                "{INDENT}│ {:<name_w$} │ {:<path_w$} │",
                truncate(&file.name, name_w),
                truncate_left(&path, path_w),
            );
        }
        let _ = writeln!(
            out,
            "{INDENT}└{}┴{}┘",
            "─".repeat(name_w + 2),
            "─".repeat(path_w + 2)
        );
    }
}

/// Keeps the end of a path, which is the informative part.
fn truncate_left(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len || max_len == 0 {
        return s.to_string();
    }
    let tail: String = s.chars().skip(len - (max_len - 1)).collect();
    format!("…{tail}")
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 7;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{INDENT}┌{}┬{}┐",
        "─".repeat(key_w + 2),
        "─".repeat(val_w + 2)
    );
    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<key_w$} │ {:>val_w$} │",
            truncate(key, key_w),
            truncate_left(val, val_w),
        );
    }
    let _ = writeln!(
        out,
        "{INDENT}└{}┴{}┘",
        "─".repeat(key_w + 2),
        "─".repeat(val_w + 2)
    );
}
