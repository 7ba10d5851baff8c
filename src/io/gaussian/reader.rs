use crate::io::{Format, error::Error};
use crate::model::{
    atom::AtomAttrs,
    elements,
    frame::{FrameAttrs, ParsedFrame, columns},
    value::Value,
};
use std::io::BufRead;

const ORIENTATION_MARKERS: [&str; 3] = [
    "Standard orientation:",
    "Input orientation:",
    "Z-Matrix orientation:",
];

/// Lines between an orientation marker and the first atom row.
const TABLE_HEADER_LINES: usize = 5;

const ARCHIVE_START: &str = "1\\1\\";

const PLAUSIBLE_LIMIT: f64 = 1e10;

pub fn read<R: BufRead>(reader: R) -> Result<ParsedFrame, Error> {
    let lines = reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Io { source: e })?;

    let Some(orientation) = lines
        .iter()
        .rposition(|l| ORIENTATION_MARKERS.iter().any(|m| l.contains(m)))
    else {
        return Err(Error::parse(
            Format::GaussianOut,
            lines.len().max(1),
            "no orientation block found",
        ));
    };

    let atoms = parse_orientation(&lines[orientation + 1..]);
    if atoms.is_empty() {
        return Err(Error::parse(
            Format::GaussianOut,
            orientation + 1,
            "orientation block contains no atoms",
        ));
    }

    let mut attrs = FrameAttrs {
        raw_data: Some(lines.join("\n")),
        ..FrameAttrs::new()
    };
    let archive = archive_fields(&lines);
    apply_archive(&archive, &mut attrs);

    Ok(ParsedFrame { attrs, atoms })
}

fn parse_orientation(lines: &[String]) -> Vec<AtomAttrs> {
    lines
        .iter()
        .skip(TABLE_HEADER_LINES - 1)
        .take_while(|l| !l.trim_start().starts_with("-----"))
        .filter_map(|l| parse_atom_row(l))
        .collect()
}

/// `Center  Atomic  Atomic  X  Y  Z`; rows that do not fit are skipped.
fn parse_atom_row(line: &str) -> Option<AtomAttrs> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }
    let atomic_number = tokens[1].parse::<i64>().ok()?;
    let x = tokens[3].parse::<f64>().ok()?;
    let y = tokens[4].parse::<f64>().ok()?;
    let z = tokens[5].parse::<f64>().ok()?;
    Some(AtomAttrs::new(
        elements::symbol_or_placeholder(atomic_number),
        [x, y, z],
    ))
}

/// Splits the archive entry into its backslash-separated fields.
///
/// Archive lines wrap at a fixed width regardless of field boundaries, so
/// the trimmed lines are concatenated before splitting.
fn archive_fields(lines: &[String]) -> Vec<String> {
    let Some(start) = lines
        .iter()
        .position(|l| l.trim_start().starts_with(ARCHIVE_START))
    else {
        return Vec::new();
    };

    let mut block = String::new();
    for line in &lines[start..] {
        let trimmed = line.trim();
        block.push_str(trimmed);
        if trimmed.ends_with('@') {
            break;
        }
    }

    block
        .split('\\')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn apply_archive(fields: &[String], attrs: &mut FrameAttrs) {
    if fields.is_empty() {
        return;
    }

    // The molecule specification opens with an "Element,x,y,z" field; the
    // two fields before it are the title and the charge/multiplicity pair.
    let geometry_start = fields.iter().position(|f| {
        f.split_once(',')
            .is_some_and(|(head, _)| elements::is_symbol(head.trim()))
    });

    let mut charge = Value::Missing;
    let mut multiplicity = Value::Missing;
    if let Some(start) = geometry_start {
        if start >= 1 {
            attrs.comment = Some(fields[start - 1].clone());
        }
        if start >= 2
            && let Some((c, m)) = fields[start - 2].split_once(',')
        {
            charge = plausible(c).map_or(Value::Missing, Value::Number);
            multiplicity = m
                .trim()
                .parse::<i64>()
                .map_or(Value::Missing, |v| Value::Number(v as f64));
        }
    }

    attrs.energy = lookup(fields, "HF").and_then(plausible);
    attrs.zero_point_energy = lookup(fields, "ZeroPoint").and_then(plausible);

    let number = |key: &str| Value::from(lookup(fields, key).and_then(plausible));
    attrs.extra = vec![
        (columns::CHARGE.to_string(), charge),
        (columns::MULTIPLICITY.to_string(), multiplicity),
        (columns::ZPE.to_string(), number("ZPE")),
        (columns::THERMAL.to_string(), number("Thermal")),
        (columns::RMSD.to_string(), number("RMSD")),
        (columns::RMSF.to_string(), number("RMSF")),
        (columns::DIPOLE.to_string(), dipole(lookup(fields, "Dipole"))),
        (columns::NIMAG.to_string(), number("NIMag")),
    ];
}

/// Value of the first `key=value` field whose key matches case-insensitively.
fn lookup<'a>(fields: &'a [String], key: &str) -> Option<&'a str> {
    fields.iter().find_map(|f| {
        let (k, v) = f.split_once('=')?;
        k.trim().eq_ignore_ascii_case(key).then_some(v)
    })
}

fn plausible(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let value = compact.parse::<f64>().ok()?;
    (value.is_finite() && value.abs() < PLAUSIBLE_LIMIT).then_some(value)
}

fn dipole(raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Missing;
    };
    let parts: Vec<_> = raw.split(',').map(plausible).collect();
    match parts.as_slice() {
        [Some(x), Some(y), Some(z), ..] => Value::Vector([*x, *y, *z]),
        _ => Value::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = r#" Entering Gaussian System
                         Input orientation:
 ---------------------------------------------------------------------
 Center     Atomic      Atomic             Coordinates (Angstroms)
 Number     Number       Type             X           Y           Z
 ---------------------------------------------------------------------
      1          8           0        9.000000    9.000000    9.000000
 ---------------------------------------------------------------------
                         Standard orientation:
 ---------------------------------------------------------------------
 Center     Atomic      Atomic             Coordinates (Angstroms)
 Number     Number       Type             X           Y           Z
 ---------------------------------------------------------------------
      1          8           0        0.000000    0.000000    0.117300
      2          1           0        0.000000    0.757200   -0.469200
      3          1           0        0.000000   -0.757200   -0.469200
 ---------------------------------------------------------------------
 Rotational constants (GHZ):    825.5    437.5    285.9
 1\1\GINC-NODE\FOpt\RB3LYP\6-31G(d)\H2O1\USER\01-Jan-2024\0\\#p opt freq
 \\water optimization\\0,1\O,0.,0.,0.1173\H,0.,0.7572,-0.4692\H,0.,-0.75
 72,-0.4692\\Version=ES64L-G16RevC.01\State=1-A1\HF=-76.4089533\RMSD=3.
 456e-09\RMSF=1.234e-05\ZeroPoint=0.0210433\Thermal=0.\Dipole=0.,0.,0.8
 17\NIMag=0\PG=C02V [C2(O1),SGV(H2)]\\@
 Normal termination of Gaussian 16
"#;

    #[test]
    fn takes_geometry_from_last_orientation_block() {
        let frame = read(Cursor::new(LOG)).unwrap();
        assert_eq!(frame.atom_count(), 3);
        assert_eq!(frame.atoms[0].element, "O");
        assert_eq!(frame.atoms[0].position, [0.0, 0.0, 0.1173]);
        assert_eq!(frame.atoms[2].element, "H");
        assert_eq!(frame.atoms[2].position, [0.0, -0.7572, -0.4692]);
    }

    #[test]
    fn extracts_archive_properties() {
        let frame = read(Cursor::new(LOG)).unwrap();
        let attrs = &frame.attrs;
        assert_eq!(attrs.energy, Some(-76.4089533));
        assert_eq!(attrs.zero_point_energy, Some(0.0210433));
        assert_eq!(attrs.comment.as_deref(), Some("water optimization"));

        let extra: std::collections::HashMap<_, _> = attrs.extra.iter().cloned().collect();
        assert_eq!(extra["charge"], Value::Number(0.0));
        assert_eq!(extra["multiplicity"], Value::Number(1.0));
        assert_eq!(extra["rmsd"], Value::Number(3.456e-9));
        assert_eq!(extra["rmsf"], Value::Number(1.234e-5));
        assert_eq!(extra["thermal"], Value::Number(0.0));
        assert_eq!(extra["dipole"], Value::Vector([0.0, 0.0, 0.817]));
        assert_eq!(extra["nimag"], Value::Number(0.0));
        assert!(extra["zpe"].is_missing());
    }

    #[test]
    fn file_without_archive_keeps_geometry() {
        let truncated: String = LOG.lines().take(17).collect::<Vec<_>>().join("\n");
        let frame = read(Cursor::new(truncated)).unwrap();
        assert_eq!(frame.atom_count(), 3);
        assert_eq!(frame.attrs.energy, None);
        assert_eq!(frame.attrs.comment, None);
    }

    #[test]
    fn missing_orientation_is_an_error() {
        let err = read(Cursor::new(" SCF Done:  E(RB3LYP) =  -76.40\n")).unwrap_err();
        assert!(err.to_string().contains("no orientation block"));
    }

    #[test]
    fn unknown_atomic_numbers_get_placeholders() {
        let row = parse_atom_row("      1          0           0        1.0    2.0    3.0").unwrap();
        assert_eq!(row.element, "El0");
        assert!(parse_atom_row(" Center  Atomic  Atomic  X Y Z").is_none());
    }

    #[test]
    fn implausible_values_are_dropped() {
        assert_eq!(plausible(" -76.5 "), Some(-76.5));
        assert_eq!(plausible("1e12"), None);
        assert_eq!(plausible("nan"), None);
        assert_eq!(plausible("1.2e-"), None);
        assert_eq!(dipole(Some("0.1,0.2")), Value::Missing);
    }
}
