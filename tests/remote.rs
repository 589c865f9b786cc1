use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use serde_json::{Value, json};

use kira_klifs::domain::{Entity, FileFormat, Layout, SourceTable};
use kira_klifs::error::KiraError;
use kira_klifs::remote::{KlifsClient, Query, Remote};

const POCKET_MOL2: &str = "\
@<TRIPOS>MOLECULE
2g2i_pocket
@<TRIPOS>ATOM
      1 CA   1.0 2.0 3.0 C.3 248 LEU248 0.0 BACKBONE
      2 CA   4.0 2.0 3.0 C.3 249 GLY249 0.0 BACKBONE
";

#[derive(Default)]
struct MockKlifs {
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockKlifs {
    fn record(&self, endpoint: &str, query: &Query<'_>) {
        let query = query
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.calls.lock().unwrap().push((endpoint.to_string(), query));
    }
}

impl KlifsClient for MockKlifs {
    fn get_json(&self, endpoint: &str, query: &Query<'_>) -> Result<Value, KiraError> {
        self.record(endpoint, query);
        match endpoint {
            "kinase_groups" => Ok(json!(["AGC", "CAMK", "TK"])),
            "structure_list" => Ok(json!([{
                "structure_ID": 1048,
                "kinase": "ABL1",
                "species": "Human",
                "kinase_ID": 392,
                "pdb": "2g2i",
                "alt": "",
                "chain": "A",
            }])),
            "bioactivity_list_id" => Ok(json!([{
                "pref_name": "ABL1",
                "accession": "P00519",
                "organism": "Homo sapiens",
                "standard_type": "IC50",
                "standard_relation": "=",
                "standard_value": query[0].1.clone(),
                "standard_units": "nM",
                "pchembl_value": null,
            }])),
            "ligands_list" => Ok(json!([{"ligand_ID": 1, "PDB-code": "STI", "Unexpected": 0}])),
            other => Err(KiraError::KlifsStatus {
                status: 404,
                message: format!("no mock for {other}"),
            }),
        }
    }

    fn get_text(&self, endpoint: &str, query: &Query<'_>) -> Result<String, KiraError> {
        self.record(endpoint, query);
        match endpoint {
            "structure_get_pocket" => Ok(POCKET_MOL2.to_string()),
            other => Err(KiraError::KlifsStatus {
                status: 404,
                message: format!("no mock for {other}"),
            }),
        }
    }
}

#[test]
fn kinase_groups_are_plain_strings() {
    let remote = Remote::new(MockKlifs::default());
    assert_eq!(remote.kinase_groups().unwrap(), vec!["AGC", "CAMK", "TK"]);
}

#[test]
fn structures_come_back_with_canonical_columns() {
    let remote = Remote::new(MockKlifs::default());
    let table = remote.structures_by_ids(&[1048, 1049]).unwrap();
    assert_eq!(
        table.column_names(),
        vec![
            "structure.id",
            "kinase.name",
            "species.klifs",
            "kinase.id",
            "structure.pdb",
            "structure.alternate_model",
            "structure.chain",
        ]
    );

    let calls = remote.client().calls.lock().unwrap();
    assert_eq!(calls[0].0, "structure_list");
    assert_eq!(calls[0].1, vec![("structure_ID".to_string(), "1048,1049".to_string())]);
}

#[test]
fn unmapped_response_field_is_rejected() {
    let remote = Remote::new(MockKlifs::default());
    assert_matches!(
        remote.ligands_by_kinase_ids(&[392]),
        Err(KiraError::UnknownField { source_table: SourceTable::Ligands, .. })
    );
}

#[test]
fn bioactivities_are_fetched_per_ligand() {
    let remote = Remote::new(MockKlifs::default());
    let table = remote.bioactivities_by_ligand_ids(&[10, 20]).unwrap();
    assert_eq!(table.n_rows(), 2);
    assert_eq!(
        table.cell_str(1, "ligand.bioactivity_standard_value").as_deref(),
        Some("20")
    );
    assert_eq!(remote.client().calls.lock().unwrap().len(), 2);
}

#[test]
fn empty_id_lists_never_reach_the_client() {
    let remote = Remote::new(MockKlifs::default());
    assert_matches!(remote.structures_by_ids(&[]), Err(KiraError::InvalidInput(_)));
    assert_matches!(remote.kinases_by_names(&[], None), Err(KiraError::InvalidInput(_)));
    assert_matches!(
        remote.coordinates_text(1048, Entity::Water, FileFormat::Mol2),
        Err(KiraError::InvalidInput(_))
    );
    assert!(remote.client().calls.lock().unwrap().is_empty());
}

#[test]
fn status_errors_propagate() {
    let remote = Remote::new(MockKlifs::default());
    assert_matches!(
        remote.interaction_types(),
        Err(KiraError::KlifsStatus { status: 404, .. })
    );
}

#[test]
fn coordinates_parse_into_structure() {
    let remote = Remote::new(MockKlifs::default());
    let structure = remote.coordinates(1048, Entity::Pocket).unwrap();
    assert_eq!(structure.name, "1048_pocket");
    assert_eq!(structure.sequence(), "LG");
}

#[test]
fn download_lands_on_built_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let remote = Remote::new(MockKlifs::default());

    let record = remote
        .download_coordinates(1048, Entity::Pocket, FileFormat::Mol2, &root, Layout::Nested)
        .unwrap();

    let expected = root.join("KLIFS_download/HUMAN/ABL1/2g2i_chainA/pocket.mol2");
    assert_eq!(record.path, expected.to_string());
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), POCKET_MOL2);
}
