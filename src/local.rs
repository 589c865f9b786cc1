use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::debug;

use crate::domain::{Entity, FileFormat, Layout, SourceTable, StructureLocator, strip_separator};
use crate::error::KiraError;
use crate::paths::{KLIFS_DOWNLOAD_DIR, build_path, locator_from_row};
use crate::structure::Structure;
use crate::table::{Column, Table};

pub const EXPORT_FILE: &str = "KLIFS_export.csv";
pub const OVERVIEW_FILE: &str = "overview.csv";

const MERGE_KEYS: [&str; 5] = [
    "species.klifs",
    "kinase.name",
    "structure.pdb",
    "structure.alternate_model",
    "structure.chain",
];

#[derive(Debug, Clone)]
pub struct LocalSession {
    root: Utf8PathBuf,
    structures: Table,
}

impl LocalSession {
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self, KiraError> {
        let root = root.into();
        let download = root.join(KLIFS_DOWNLOAD_DIR);

        let mut export =
            read_csv(&download.join(EXPORT_FILE))?.rename_columns(SourceTable::KlifsExport)?;
        let mut overview =
            read_csv(&download.join(OVERVIEW_FILE))?.rename_columns(SourceTable::KlifsOverview)?;

        export.map_column("kinase.name", first_token);
        for table in [&mut export, &mut overview] {
            table.map_column("structure.alternate_model", normalize_separator);
            table.map_column("structure.chain", normalize_separator);
        }

        let structures = export.merge_left(&overview, &MERGE_KEYS)?;
        debug!(
            %root,
            structures = structures.n_rows(),
            columns = structures.n_columns(),
            "opened KLIFS download"
        );

        Ok(Self { root, structures })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn structures(&self) -> &Table {
        &self.structures
    }

    pub fn locators(&self) -> Result<Vec<StructureLocator>, KiraError> {
        (0..self.structures.n_rows())
            .map(|row| locator_from_row(&self.structures, row))
            .collect()
    }

    pub fn file_path(
        &self,
        row: usize,
        entity: Entity,
        format: FileFormat,
    ) -> Result<Utf8PathBuf, KiraError> {
        let locator = locator_from_row(&self.structures, row)?;
        Ok(build_path(&self.root, &locator, entity, format, Layout::Nested))
    }

    pub fn structure(&self, row: usize, entity: Entity) -> Result<Structure, KiraError> {
        let path = self.file_path(row, entity, FileFormat::Mol2)?;
        Structure::from_mol2_path(&path)
    }
}

pub fn read_csv(path: &Utf8Path) -> Result<Table, KiraError> {
    let file = File::open(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("open {path}: {err}")))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| KiraError::CsvParse(format!("{path}: {err}")))?
        .clone();
    let mut columns = headers
        .iter()
        .map(|name| Column {
            name: name.trim().to_string(),
            values: Vec::new(),
        })
        .collect::<Vec<_>>();

    for record in reader.records() {
        let record = record.map_err(|err| KiraError::CsvParse(format!("{path}: {err}")))?;
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.values.push(Value::String(cell.to_string()));
        }
    }

    Table::from_columns(columns)
}

fn normalize_separator(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(strip_separator(text)),
        Value::Null => Value::String(String::new()),
        other => other.clone(),
    }
}

// "ABL1 (Abl)" -> "ABL1"
fn first_token(value: &Value) -> Value {
    match value {
        Value::String(text) => {
            Value::String(text.split_whitespace().next().unwrap_or_default().to_string())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn separator_and_alias_normalization() {
        assert_eq!(normalize_separator(&json!("-")), json!(""));
        assert_eq!(normalize_separator(&json!("B")), json!("B"));
        assert_eq!(normalize_separator(&Value::Null), json!(""));
        assert_eq!(first_token(&json!("ABL1 (Abl)")), json!("ABL1"));
        assert_eq!(first_token(&json!("EGFR")), json!("EGFR"));
    }

    #[test]
    fn missing_download_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        assert_matches!(LocalSession::open(root), Err(KiraError::Filesystem(_)));
    }
}
