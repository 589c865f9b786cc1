use std::fs::File;
use std::io::BufReader;
use std::ops::{Add, Sub};
use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;
use serde::Serialize;

use crate::error::KiraError;
use crate::mol2::{self, Mol2Atom};

static RESIDUE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9]{0,3}?)_?(-?\d+)$").expect("valid residue pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(self, factor: f64) -> Point3 {
        Point3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance_squared(self, other: Point3) -> f64 {
        let diff = self - other;
        diff.dot(diff)
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, other: Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::default();
    }
    let sum = points.iter().fold(Point3::default(), |acc, point| acc + *point);
    sum.scale(1.0 / points.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    pub name: String,
    pub atom_type: String,
    pub position: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Residue {
    pub name: String,
    pub number: i64,
    pub atoms: Vec<Atom>,
}

impl Residue {
    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.name == name)
    }

    pub fn one_letter(&self) -> char {
        one_letter_code(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Structure {
    pub name: String,
    pub residues: Vec<Residue>,
}

impl Structure {
    pub fn new(name: impl Into<String>, residues: Vec<Residue>) -> Self {
        Self {
            name: name.into(),
            residues,
        }
    }

    pub fn from_mol2_atoms(name: impl Into<String>, atoms: &[Mol2Atom]) -> Self {
        let mut residues: Vec<Residue> = Vec::new();
        let mut current: Option<(i64, &str)> = None;

        for atom in atoms {
            let key = (atom.subst_id, atom.subst_name.as_str());
            if current != Some(key) {
                let (residue_name, number) = split_subst_name(&atom.subst_name, atom.subst_id);
                residues.push(Residue {
                    name: residue_name,
                    number,
                    atoms: Vec::new(),
                });
                current = Some(key);
            }
            if let Some(residue) = residues.last_mut() {
                residue.atoms.push(Atom {
                    name: atom.atom_name.clone(),
                    atom_type: atom.atom_type.clone(),
                    position: Point3::new(atom.x, atom.y, atom.z),
                });
            }
        }

        Self::new(name, residues)
    }

    pub fn from_mol2_str(name: impl Into<String>, text: &str) -> Result<Self, KiraError> {
        let atoms = mol2::read_atoms_str(text)?;
        Ok(Self::from_mol2_atoms(name, &atoms))
    }

    pub fn from_mol2_path(path: &Utf8Path) -> Result<Self, KiraError> {
        let file = File::open(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(format!("open {path}: {err}")))?;
        let atoms = mol2::read_atoms(BufReader::new(file))?;
        let name = path.file_stem().unwrap_or(path.as_str());
        Ok(Self::from_mol2_atoms(name, &atoms))
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn n_atoms(&self) -> usize {
        self.residues.iter().map(|residue| residue.atoms.len()).sum()
    }

    pub fn sequence(&self) -> String {
        self.residues.iter().map(Residue::one_letter).collect()
    }

    /// C-alpha of a standard amino acid; ions and ligands named `CA` are skipped.
    pub fn ca_position(&self, residue_index: usize) -> Option<Point3> {
        self.residues
            .get(residue_index)
            .filter(|residue| residue.one_letter() != 'X')
            .and_then(|residue| residue.atom("CA"))
            .map(|atom| atom.position)
    }

    pub fn transformed(
        &self,
        rotation: &[[f64; 3]; 3],
        mobile_center: Point3,
        fixed_center: Point3,
    ) -> Structure {
        let residues = self
            .residues
            .iter()
            .map(|residue| Residue {
                name: residue.name.clone(),
                number: residue.number,
                atoms: residue
                    .atoms
                    .iter()
                    .map(|atom| Atom {
                        name: atom.name.clone(),
                        atom_type: atom.atom_type.clone(),
                        position: rotate(rotation, atom.position - mobile_center) + fixed_center,
                    })
                    .collect(),
            })
            .collect();
        Structure::new(self.name.clone(), residues)
    }
}

pub fn rotate(rotation: &[[f64; 3]; 3], point: Point3) -> Point3 {
    let p = point.to_array();
    let row = |r: &[f64; 3]| r[0] * p[0] + r[1] * p[1] + r[2] * p[2];
    Point3::new(row(&rotation[0]), row(&rotation[1]), row(&rotation[2]))
}

fn split_subst_name(subst_name: &str, subst_id: i64) -> (String, i64) {
    RESIDUE_NAME
        .captures(subst_name)
        .and_then(|caps| {
            let name = caps.get(1)?.as_str();
            let number = caps.get(2)?.as_str().parse::<i64>().ok()?;
            let name = if name.is_empty() { "UNK" } else { name };
            Some((name.to_uppercase(), number))
        })
        .unwrap_or_else(|| (subst_name.to_string(), subst_id))
}

pub fn one_letter_code(residue_name: &str) -> char {
    match residue_name.to_uppercase().as_str() {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLY" => 'G',
        "HIS" | "HID" | "HIE" | "HIP" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" | "MSE" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "SER" | "SEP" => 'S',
        "THR" | "TPO" => 'T',
        "TRP" => 'W',
        "TYR" | "PTR" => 'Y',
        "VAL" => 'V',
        _ => 'X',
    }
}
