use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    KlifsExport,
    KlifsOverview,
    Kinases,
    Structures,
    Ligands,
    Interactions,
    Bioactivities,
}

impl SourceTable {
    pub const ALL: [SourceTable; 7] = [
        SourceTable::KlifsExport,
        SourceTable::KlifsOverview,
        SourceTable::Kinases,
        SourceTable::Structures,
        SourceTable::Ligands,
        SourceTable::Interactions,
        SourceTable::Bioactivities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTable::KlifsExport => "klifs_export",
            SourceTable::KlifsOverview => "klifs_overview",
            SourceTable::Kinases => "kinases",
            SourceTable::Structures => "structures",
            SourceTable::Ligands => "ligands",
            SourceTable::Interactions => "interactions",
            SourceTable::Bioactivities => "bioactivities",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SourceTable::KlifsExport | SourceTable::KlifsOverview)
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceTable {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        SourceTable::ALL
            .into_iter()
            .find(|table| table.as_str() == normalized)
            .ok_or_else(|| KiraError::InvalidSourceTable(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Complex,
    Ligand,
    Pocket,
    Protein,
    Water,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Complex => write!(f, "complex"),
            Entity::Ligand => write!(f, "ligand"),
            Entity::Pocket => write!(f, "pocket"),
            Entity::Protein => write!(f, "protein"),
            Entity::Water => write!(f, "water"),
        }
    }
}

impl FromStr for Entity {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "complex" => Ok(Entity::Complex),
            "ligand" => Ok(Entity::Ligand),
            "pocket" => Ok(Entity::Pocket),
            "protein" => Ok(Entity::Protein),
            "water" => Ok(Entity::Water),
            _ => Err(KiraError::InvalidEntity(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Mol2,
    Pdb,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Mol2 => write!(f, "mol2"),
            FileFormat::Pdb => write!(f, "pdb"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mol2" => Ok(FileFormat::Mol2),
            "pdb" => Ok(FileFormat::Pdb),
            _ => Err(KiraError::InvalidFormat(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Flat,
    Nested,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureLocator {
    pub species: String,
    pub kinase_name: String,
    pub pdb: String,
    pub alternate_model: String,
    pub chain: String,
}

impl StructureLocator {
    pub fn new(
        species: impl Into<String>,
        kinase_name: impl Into<String>,
        pdb: impl Into<String>,
        alternate_model: impl Into<String>,
        chain: impl Into<String>,
    ) -> Self {
        Self {
            species: species.into(),
            kinase_name: kinase_name.into(),
            pdb: pdb.into(),
            alternate_model: alternate_model.into(),
            chain: chain.into(),
        }
    }

    /// `{pdb}[_alt{alt}][_chain{chain}]` with `-` removed from alt and chain.
    pub fn label(&self) -> String {
        let alternate_model = strip_separator(&self.alternate_model);
        let chain = strip_separator(&self.chain);
        let mut label = self.pdb.clone();
        if !alternate_model.is_empty() {
            label.push_str("_alt");
            label.push_str(&alternate_model);
        }
        if !chain.is_empty() {
            label.push_str("_chain");
            label.push_str(&chain);
        }
        label
    }

    pub fn species_upper(&self) -> String {
        self.species.to_uppercase()
    }
}

pub(crate) fn strip_separator(value: &str) -> String {
    value.replace('-', "")
}
