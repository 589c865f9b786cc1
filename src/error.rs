use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::SourceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentStage {
    SequenceAlignment,
    StructuralOverlap,
    Scoring,
}

impl fmt::Display for AlignmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentStage::SequenceAlignment => write!(f, "sequence-alignment"),
            AlignmentStage::StructuralOverlap => write!(f, "structural-overlap"),
            AlignmentStage::Scoring => write!(f, "scoring"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("unknown field `{field}` for source table {source_table}")]
    UnknownField {
        source_table: SourceTable,
        field: String,
    },

    #[error("cannot build a table from zero records")]
    EmptyInput,

    #[error("record {record} is missing field `{field}`")]
    SchemaMismatch { record: usize, field: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("alignment failed during {stage}: {message}")]
    AlignmentFailure {
        stage: AlignmentStage,
        message: String,
    },

    #[error("invalid source table: {0}")]
    InvalidSourceTable(String),

    #[error("invalid structural entity: {0}")]
    InvalidEntity(String),

    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    #[error("KLIFS request failed: {0}")]
    KlifsHttp(String),

    #[error("KLIFS returned status {status}: {message}")]
    KlifsStatus { status: u16, message: String },

    #[error("malformed MOL2 at line {line}: {message}")]
    Mol2Parse { line: usize, message: String },

    #[error("failed to read CSV table: {0}")]
    CsvParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl AlignmentStage {
    pub fn fail(self, err: impl fmt::Display) -> KiraError {
        KiraError::AlignmentFailure {
            stage: self,
            message: err.to_string(),
        }
    }
}
