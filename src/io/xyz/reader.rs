use crate::io::{Format, error::Error};
use crate::model::{
    atom::AtomAttrs,
    frame::{FrameAttrs, ParsedFrame},
};
use std::io::BufRead;

pub fn read<R: BufRead>(reader: R) -> Result<ParsedFrame, Error> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let content = line.map_err(|e| Error::Io { source: e })?;
        lines.push((i + 1, content));
    }

    let Some(count_pos) = lines.iter().position(|(_, l)| !l.trim().is_empty()) else {
        return Err(Error::parse(Format::Xyz, 1, "file is empty"));
    };
    let (count_line_no, count_line) = &lines[count_pos];
    let atom_count = count_line
        .trim()
        .parse::<usize>()
        .map_err(|_| {
            Error::parse(
                Format::Xyz,
                *count_line_no,
                format!("first line must be the atom count, got '{}'", count_line.trim()),
            )
        })?;

    let Some((_, comment_line)) = lines.get(count_pos + 1) else {
        return Err(Error::parse(
            Format::Xyz,
            *count_line_no,
            "missing comment line after the atom count",
        ));
    };
    let comment = Some(comment_line.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let atom_lines: Vec<_> = lines[count_pos + 2..]
        .iter()
        .filter(|(_, l)| !l.trim().is_empty())
        .take(atom_count)
        .collect();
    if atom_lines.len() < atom_count {
        let last = lines.last().map_or(*count_line_no, |(ln, _)| *ln);
        return Err(Error::parse(
            Format::Xyz,
            last,
            format!(
                "expected {} atom lines, found {}",
                atom_count,
                atom_lines.len()
            ),
        ));
    }

    let atoms = atom_lines
        .into_iter()
        .map(|(ln, raw)| parse_atom(raw, *ln))
        .collect::<Result<Vec<_>, _>>()?;

    let raw_data = lines
        .iter()
        .map(|(_, l)| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ParsedFrame {
        attrs: FrameAttrs {
            raw_data: Some(raw_data),
            comment,
            ..FrameAttrs::new()
        },
        atoms,
    })
}

fn parse_atom(line: &str, line_no: usize) -> Result<AtomAttrs, Error> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            "atom line needs an element and three coordinates",
        ));
    }

    let coord = |idx: usize, axis: &str| {
        tokens[idx].parse::<f64>().map_err(|_| {
            Error::parse(
                Format::Xyz,
                line_no,
                format!("invalid {} coordinate '{}'", axis, tokens[idx]),
            )
        })
    };
    let position = [coord(1, "x")?, coord(2, "y")?, coord(3, "z")?];

    let mut atom = AtomAttrs::new(tokens[0], position);
    if let Some(alias) = tokens.get(4) {
        atom = atom.with_alias(*alias);
    }
    if let Some(charge) = tokens.get(5) {
        let charge = charge.parse::<f64>().map_err(|_| {
            Error::parse(Format::Xyz, line_no, format!("invalid charge '{}'", charge))
        })?;
        atom = atom.with_charge(charge);
    }
    Ok(atom)
}
