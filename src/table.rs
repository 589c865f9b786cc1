use std::collections::HashMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::domain::SourceTable;
use crate::error::KiraError;
use crate::schema::canonical_name;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

/// Columns and their order come from the first record; later records must carry them all, extras are ignored.
pub fn flatten(records: &[Record]) -> Result<Table, KiraError> {
    let first = records.first().ok_or(KiraError::EmptyInput)?;
    let mut columns = first
        .keys()
        .map(|name| Column {
            name: name.clone(),
            values: Vec::with_capacity(records.len()),
        })
        .collect::<Vec<_>>();

    for (index, record) in records.iter().enumerate() {
        for column in &mut columns {
            let value = record
                .get(&column.name)
                .ok_or_else(|| KiraError::SchemaMismatch {
                    record: index,
                    field: column.name.clone(),
                })?;
            column.values.push(value.clone());
        }
    }

    Ok(Table { columns })
}

impl Table {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, KiraError> {
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(ragged) = columns.iter().find(|column| column.values.len() != rows) {
                return Err(KiraError::InvalidInput(format!(
                    "column `{}` has {} rows, expected {rows}",
                    ragged.name,
                    ragged.values.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|column| column.values.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|values| values.get(row))
    }

    pub fn cell_str(&self, row: usize, name: &str) -> Option<String> {
        match self.cell(row, name)? {
            Value::Null => None,
            Value::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn row(&self, index: usize) -> Option<Record> {
        if index >= self.n_rows() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| (column.name.clone(), column.values[index].clone()))
                .collect(),
        )
    }

    pub fn to_records(&self) -> Vec<Record> {
        (0..self.n_rows()).filter_map(|index| self.row(index)).collect()
    }

    pub fn rename_columns(mut self, source: SourceTable) -> Result<Self, KiraError> {
        for column in &mut self.columns {
            column.name = canonical_name(source, &column.name)?.to_string();
        }
        Ok(self)
    }

    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        if let Some(column) = self.columns.iter_mut().find(|column| column.name == name) {
            for value in &mut column.values {
                *value = f(value);
            }
        }
    }

    /// Every row of `self` is kept; new columns of `other` are filled from its first matching row, or null.
    pub fn merge_left(&self, other: &Table, keys: &[&str]) -> Result<Table, KiraError> {
        for key in keys {
            if self.column(key).is_none() || other.column(key).is_none() {
                return Err(KiraError::InvalidInput(format!(
                    "merge key `{key}` missing from one of the tables"
                )));
            }
        }

        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        for row in 0..other.n_rows() {
            index.entry(other.key_at(row, keys)).or_insert(row);
        }

        let appended = other
            .columns
            .iter()
            .filter(|column| {
                !keys.contains(&column.name.as_str()) && self.column(&column.name).is_none()
            })
            .collect::<Vec<_>>();

        let mut columns = self.columns.clone();
        for column in appended {
            let values = (0..self.n_rows())
                .map(|row| {
                    index
                        .get(&self.key_at(row, keys))
                        .map(|matched| column.values[*matched].clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            columns.push(Column {
                name: column.name.clone(),
                values,
            });
        }

        Ok(Table { columns })
    }

    fn key_at(&self, row: usize, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .map(|name| self.cell(row, name).map(Value::to_string).unwrap_or_default())
            .collect()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.n_rows()))?;
        for record in self.to_records() {
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn column_order_follows_first_record() {
        let table = flatten(&[
            record(json!({"pdb": "4u3y", "alt": "A", "chain": "B"})),
            record(json!({"chain": "A", "pdb": "4u40", "alt": ""})),
        ])
        .unwrap();
        assert_eq!(table.column_names(), vec!["pdb", "alt", "chain"]);
        assert_eq!(table.cell_str(1, "pdb").as_deref(), Some("4u40"));
    }

    #[test]
    fn ragged_columns_rejected() {
        let err = Table::from_columns(vec![
            Column {
                name: "a".into(),
                values: vec![json!(1)],
            },
            Column {
                name: "b".into(),
                values: vec![],
            },
        ])
        .unwrap_err();
        assert_matches!(err, KiraError::InvalidInput(_));
    }

    #[test]
    fn merge_left_fills_missing_with_null() {
        let left = flatten(&[
            record(json!({"pdb": "4u3y", "dfg": "in"})),
            record(json!({"pdb": "1abc", "dfg": "out"})),
        ])
        .unwrap();
        let right = flatten(&[record(json!({"pdb": "4u3y", "rmsd1": 0.8, "dfg": "x"}))]).unwrap();

        let merged = left.merge_left(&right, &["pdb"]).unwrap();
        assert_eq!(merged.column_names(), vec!["pdb", "dfg", "rmsd1"]);
        assert_eq!(merged.column("rmsd1").unwrap(), &[json!(0.8), Value::Null]);
        assert_eq!(merged.column("dfg").unwrap(), &[json!("in"), json!("out")]);
    }

    #[test]
    fn serializes_as_rows() {
        let table = flatten(&[record(json!({"a": 1, "b": "x"}))]).unwrap();
        let text = serde_json::to_string(&table).unwrap();
        assert_eq!(text, r#"[{"a":1,"b":"x"}]"#);
    }
}
