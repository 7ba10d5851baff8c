//! User-defined derived columns.
//!
//! Each [`CalcSpec`] pairs a column name with an [`Expression`] over other
//! frame columns. Expressions are evaluated row by row; a row where any
//! referenced cell is missing or non-numeric, or where the result is not
//! finite, gets [`Value::Missing`].

pub mod expr;

use crate::model::value::Value;
use crate::store::{self, FrameStore};
use expr::{Expression, ParseError};
use log::{debug, warn};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid expression for '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalcSpec {
    pub name: String,
    pub expression: Expression,
}

impl CalcSpec {
    pub fn new(name: impl Into<String>, source: &str) -> Result<Self, Error> {
        let name = name.into();
        match Expression::parse(source) {
            Ok(expression) => Ok(Self { name, expression }),
            Err(source) => Err(Error::Parse { name, source }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcSummary {
    pub name: String,
    pub computed: usize,
    pub missing: usize,
    /// Referenced columns absent from the table.
    pub unknown_columns: Vec<String>,
    /// The column existed before and was overwritten.
    pub replaced: bool,
}

/// Evaluates `specs` in order; later specs may use columns produced by
/// earlier ones.
pub fn run_calculations(
    frames: &mut FrameStore,
    specs: &[CalcSpec],
) -> Result<Vec<CalcSummary>, store::Error> {
    let mut summaries = Vec::with_capacity(specs.len());
    for spec in specs {
        let (cells, mut summary) = evaluate(frames, spec);
        if frames.has_column(&spec.name) {
            warn!("calc '{}' replaces existing column", spec.name);
            summary.replaced = true;
        }
        debug!(
            "calc '{}': {} computed, {} missing",
            summary.name, summary.computed, summary.missing
        );
        frames.write_column(&spec.name, cells)?;
        summaries.push(summary);
    }
    Ok(summaries)
}

fn evaluate(frames: &FrameStore, spec: &CalcSpec) -> (Vec<Value>, CalcSummary) {
    let referenced = spec.expression.columns();
    let unknown: Vec<String> = referenced
        .iter()
        .filter(|name| !frames.has_column(name))
        .map(|name| name.to_string())
        .collect();

    if !unknown.is_empty() {
        warn!(
            "calc '{}' references unknown column(s) {}; leaving it empty",
            spec.name,
            unknown.join(", ")
        );
        let summary = CalcSummary {
            name: spec.name.clone(),
            computed: 0,
            missing: frames.len(),
            unknown_columns: unknown,
            replaced: false,
        };
        return (vec![Value::Missing; frames.len()], summary);
    }

    let columns: HashMap<&str, &[Value]> = referenced
        .iter()
        .filter_map(|&name| frames.column(name).map(|cells| (name, cells)))
        .collect();

    let cells: Vec<Value> = (0..frames.len())
        .map(|row| {
            let value = spec
                .expression
                .eval(|name| columns.get(name).and_then(|cells| cells[row].as_number()));
            match value {
                Some(v) if v.is_finite() => Value::Number(v),
                _ => Value::Missing,
            }
        })
        .collect();

    let missing = cells.iter().filter(|c| c.is_missing()).count();
    let summary = CalcSummary {
        name: spec.name.clone(),
        computed: cells.len() - missing,
        missing,
        unknown_columns: Vec::new(),
        replaced: false,
    };
    (cells, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::FrameAttrs;
    use crate::model::key::FrameKey;

    fn frames(energies: &[Option<f64>]) -> FrameStore {
        let mut store = FrameStore::new();
        for (i, energy) in energies.iter().enumerate() {
            let attrs = FrameAttrs {
                energy: *energy,
                ..FrameAttrs::new()
            };
            store
                .append(FrameKey::new(format!("f{i}"), format!("f{i}.log"), ""), attrs)
                .unwrap();
        }
        store
    }

    #[test]
    fn derived_column_per_row() {
        let mut store = frames(&[Some(-1.0), Some(-1.5), None]);
        let spec = CalcSpec::new("kcal", "energy * 627.5").unwrap();
        let summary = run_calculations(&mut store, &[spec]).unwrap();

        assert_eq!(summary[0].computed, 2);
        assert_eq!(summary[0].missing, 1);
        let column = store.column("kcal").unwrap();
        assert_eq!(column[0], Value::Number(-627.5));
        assert_eq!(column[1], Value::Number(-941.25));
        assert!(column[2].is_missing());
    }

    #[test]
    fn chained_calculations_see_earlier_results() {
        let mut store = frames(&[Some(2.0)]);
        let specs = vec![
            CalcSpec::new("double", "2 * energy").unwrap(),
            CalcSpec::new("plus one", "{double} + 1").unwrap(),
        ];
        run_calculations(&mut store, &specs).unwrap();
        assert_eq!(store.column("plus one").unwrap()[0], Value::Number(5.0));
    }

    #[test]
    fn unknown_column_yields_missing_column() {
        let mut store = frames(&[Some(1.0), Some(2.0)]);
        let spec = CalcSpec::new("bad", "energy + nope").unwrap();
        let summary = run_calculations(&mut store, &[spec]).unwrap();

        assert_eq!(summary[0].unknown_columns, vec!["nope".to_string()]);
        assert!(store.column("bad").unwrap().iter().all(Value::is_missing));
    }

    #[test]
    fn non_finite_results_are_missing() {
        let mut store = frames(&[Some(0.0), Some(-4.0)]);
        let specs = vec![
            CalcSpec::new("inv", "1 / energy").unwrap(),
            CalcSpec::new("root", "sqrt(energy)").unwrap(),
        ];
        run_calculations(&mut store, &specs).unwrap();
        assert!(store.column("inv").unwrap()[0].is_missing());
        assert_eq!(store.column("inv").unwrap()[1], Value::Number(-0.25));
        assert_eq!(store.column("root").unwrap()[0], Value::Number(0.0));
        assert!(store.column("root").unwrap()[1].is_missing());
    }

    #[test]
    fn text_cells_are_not_numbers() {
        let mut store = frames(&[Some(1.0)]);
        let key = FrameKey::new("f0", "f0.log", "");
        store.set(&key, "method", "B3LYP").unwrap();
        let spec = CalcSpec::new("x", "method + 1").unwrap();
        run_calculations(&mut store, &[spec]).unwrap();
        assert!(store.column("x").unwrap()[0].is_missing());
    }

    #[test]
    fn overwriting_a_column_is_reported() {
        let mut store = frames(&[Some(1.0)]);
        let key = FrameKey::new("f0", "f0.log", "");
        store.set(&key, "scale", 3.0).unwrap();

        let spec = CalcSpec::new("scale", "energy * 2").unwrap();
        let summary = run_calculations(&mut store, &[spec]).unwrap();
        assert!(summary[0].replaced);
        assert_eq!(store.column("scale").unwrap()[0], Value::Number(2.0));
    }

    #[test]
    fn parse_errors_name_the_column() {
        let err = CalcSpec::new("broken", "1 +").unwrap_err();
        assert!(err.to_string().starts_with("invalid expression for 'broken'"));
    }
}
