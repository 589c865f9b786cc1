use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::{Entity, FileFormat, Layout, StructureLocator};
use crate::error::KiraError;
use crate::table::Table;

pub const KLIFS_DOWNLOAD_DIR: &str = "KLIFS_download";

pub fn build_path(
    root: &Utf8Path,
    locator: &StructureLocator,
    entity: Entity,
    format: FileFormat,
    layout: Layout,
) -> Utf8PathBuf {
    let species = locator.species_upper();
    let label = locator.label();
    match layout {
        Layout::Nested => root
            .join(KLIFS_DOWNLOAD_DIR)
            .join(species)
            .join(&locator.kinase_name)
            .join(label)
            .join(format!("{entity}.{format}")),
        Layout::Flat => root.join(format!(
            "{species}_{}_{label}_{entity}.{format}",
            locator.kinase_name
        )),
    }
}

pub fn complex_mol2_path(root: &Utf8Path, locator: &StructureLocator) -> Utf8PathBuf {
    build_path(root, locator, Entity::Complex, FileFormat::Mol2, Layout::Flat)
}

/// Null alternate model or chain cells read as empty.
pub fn locator_from_row(table: &Table, row: usize) -> Result<StructureLocator, KiraError> {
    if row >= table.n_rows() {
        return Err(KiraError::InvalidInput(format!(
            "row {row} out of range for a table of {} rows",
            table.n_rows()
        )));
    }
    let required = |field: &str| {
        table
            .cell_str(row, field)
            .ok_or_else(|| KiraError::SchemaMismatch {
                record: row,
                field: field.to_string(),
            })
    };
    let optional = |field: &str| -> Result<String, KiraError> {
        if table.column(field).is_none() {
            return Err(KiraError::SchemaMismatch {
                record: row,
                field: field.to_string(),
            });
        }
        Ok(table.cell_str(row, field).unwrap_or_default())
    };

    Ok(StructureLocator::new(
        required("species.klifs")?,
        required("kinase.name")?,
        required("structure.pdb")?,
        optional("structure.alternate_model")?,
        optional("structure.chain")?,
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::table::flatten;

    #[test]
    fn flat_defaults() {
        let locator = StructureLocator::new("hsa", "ABL1", "4u3y", "", "");
        let path = complex_mol2_path(Utf8Path::new("/x"), &locator);
        assert_eq!(path, Utf8PathBuf::from("/x/HSA_ABL1_4u3y_complex.mol2"));
    }

    #[test]
    fn flat_with_chain_only() {
        let locator = StructureLocator::new("Mouse", "Akt1", "3cqw", "-", "A");
        let path = build_path(
            Utf8Path::new("out"),
            &locator,
            Entity::Pocket,
            FileFormat::Mol2,
            Layout::Flat,
        );
        assert_eq!(path, Utf8PathBuf::from("out/MOUSE_Akt1_3cqw_chainA_pocket.mol2"));
    }

    #[test]
    fn locator_from_canonical_row() {
        let record = json!({
            "species.klifs": "Human",
            "kinase.name": "ABL1",
            "structure.pdb": "2g2i",
            "structure.alternate_model": null,
            "structure.chain": "A",
        });
        let table = flatten(&[record.as_object().cloned().unwrap()]).unwrap();
        let locator = locator_from_row(&table, 0).unwrap();
        assert_eq!(locator.label(), "2g2i_chainA");
        assert_matches!(locator_from_row(&table, 1), Err(KiraError::InvalidInput(_)));
    }

    #[test]
    fn locator_requires_pdb_column() {
        let record = json!({"species.klifs": "Human", "kinase.name": "ABL1"});
        let table = flatten(&[record.as_object().cloned().unwrap()]).unwrap();
        assert_matches!(
            locator_from_row(&table, 0),
            Err(KiraError::SchemaMismatch { record: 0, .. })
        );
    }
}
