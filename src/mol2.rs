//! KLIFS atom lines carry 9 columns, or 10 with a trailing backbone flag.

use std::io::BufRead;

use serde::Serialize;

use crate::error::KiraError;
use crate::schema::{MOL2_COLUMNS_9, MOL2_COLUMNS_10};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mol2Atom {
    pub atom_id: u32,
    pub atom_name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub atom_type: String,
    pub subst_id: i64,
    pub subst_name: String,
    pub charge: f64,
    pub backbone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Atom,
    Done,
}

pub fn read_atoms<R: BufRead>(reader: R) -> Result<Vec<Mol2Atom>, KiraError> {
    let mut section = Section::None;
    let mut molecules_seen = 0usize;
    let mut saw_atom_section = false;
    let mut atoms = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let line_number = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix("@<TRIPOS>") {
            section = match (header, section) {
                (_, Section::Done) => Section::Done,
                ("MOLECULE", _) => {
                    molecules_seen += 1;
                    if molecules_seen > 1 {
                        Section::Done
                    } else {
                        Section::None
                    }
                }
                ("ATOM", _) => {
                    saw_atom_section = true;
                    Section::Atom
                }
                _ => Section::None,
            };
            continue;
        }

        if section == Section::Atom {
            atoms.push(parse_atom_line(trimmed, line_number)?);
        }
    }

    if !saw_atom_section {
        return Err(KiraError::Mol2Parse {
            line: 0,
            message: "no @<TRIPOS>ATOM section".to_string(),
        });
    }
    Ok(atoms)
}

pub fn read_atoms_str(text: &str) -> Result<Vec<Mol2Atom>, KiraError> {
    read_atoms(text.as_bytes())
}

fn parse_atom_line(line: &str, line_number: usize) -> Result<Mol2Atom, KiraError> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    if tokens.len() != MOL2_COLUMNS_9.len() && tokens.len() != MOL2_COLUMNS_10.len() {
        return Err(KiraError::Mol2Parse {
            line: line_number,
            message: format!("expected 9 or 10 columns, found {}", tokens.len()),
        });
    }

    let field = |index: usize| -> Result<f64, KiraError> {
        tokens[index].parse::<f64>().map_err(|_| KiraError::Mol2Parse {
            line: line_number,
            message: format!("invalid {} `{}`", MOL2_COLUMNS_10[index], tokens[index]),
        })
    };

    let atom_id = tokens[0].parse::<u32>().map_err(|_| KiraError::Mol2Parse {
        line: line_number,
        message: format!("invalid atom_id `{}`", tokens[0]),
    })?;
    let subst_id = tokens[6].parse::<i64>().map_err(|_| KiraError::Mol2Parse {
        line: line_number,
        message: format!("invalid subst_id `{}`", tokens[6]),
    })?;

    Ok(Mol2Atom {
        atom_id,
        atom_name: tokens[1].to_string(),
        x: field(2)?,
        y: field(3)?,
        z: field(4)?,
        atom_type: tokens[5].to_string(),
        subst_id,
        subst_name: tokens[7].to_string(),
        charge: field(8)?,
        backbone: tokens.get(9).map(|value| value.to_string()),
    })
}
