use std::thread;
use std::time::Duration;

use camino::Utf8Path;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RemoteSettings;
use crate::domain::{Entity, FileFormat, Layout, SourceTable};
use crate::error::KiraError;
use crate::fs_util::write_atomic;
use crate::paths::{build_path, locator_from_row};
use crate::structure::Structure;
use crate::table::{Record, Table, flatten};

pub type Query<'a> = [(&'a str, String)];

pub trait KlifsClient: Send + Sync {
    fn get_json(&self, endpoint: &str, query: &Query<'_>) -> Result<Value, KiraError>;
    fn get_text(&self, endpoint: &str, query: &Query<'_>) -> Result<String, KiraError>;
}

#[derive(Clone)]
pub struct KlifsHttpClient {
    client: Client,
    base_url: String,
    max_retries: usize,
}

impl KlifsHttpClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-klifs/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KiraError::KlifsHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| KiraError::KlifsHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, KiraError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "KLIFS request failed".to_string());
        Err(KiraError::KlifsStatus { status, message })
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, KiraError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(status, attempt, delay_ms = delay, "retrying KLIFS request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(error = %err, attempt, delay_ms = delay, "retrying KLIFS request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    warn!(error = %err, attempts = attempt + 1, "KLIFS request gave up");
                    return Err(KiraError::KlifsHttp(err.to_string()));
                }
            }
        }
    }

    fn get(
        &self,
        endpoint: &str,
        query: &Query<'_>,
    ) -> Result<reqwest::blocking::Response, KiraError> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, ?query, "KLIFS request");
        let response = self.send_with_retries(|| self.client.get(&url).query(query))?;
        Self::handle_status(response)
    }
}

impl KlifsClient for KlifsHttpClient {
    fn get_json(&self, endpoint: &str, query: &Query<'_>) -> Result<Value, KiraError> {
        self.get(endpoint, query)?
            .json()
            .map_err(|err| KiraError::KlifsHttp(err.to_string()))
    }

    fn get_text(&self, endpoint: &str, query: &Query<'_>) -> Result<String, KiraError> {
        self.get(endpoint, query)?
            .text()
            .map_err(|err| KiraError::KlifsHttp(err.to_string()))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadRecord {
    pub structure_id: u64,
    pub entity: Entity,
    pub format: FileFormat,
    pub path: String,
    pub downloaded_at: String,
}

pub struct Remote<C: KlifsClient> {
    client: C,
}

impl<C: KlifsClient> Remote<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn kinase_groups(&self) -> Result<Vec<String>, KiraError> {
        let value = self.client.get_json("kinase_groups", &[])?;
        strings(value)
    }

    pub fn kinase_families(&self, group: Option<&str>) -> Result<Vec<String>, KiraError> {
        let query = optional_query(&[("kinase_group", group)]);
        let value = self.client.get_json("kinase_families", &query)?;
        strings(value)
    }

    pub fn kinase_names(
        &self,
        group: Option<&str>,
        family: Option<&str>,
        species: Option<&str>,
    ) -> Result<Table, KiraError> {
        let query = optional_query(&[
            ("kinase_group", group),
            ("kinase_family", family),
            ("species", species),
        ]);
        self.table("kinase_names", &query, SourceTable::Kinases)
    }

    pub fn kinases_by_ids(&self, kinase_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "kinase_information",
            &[("kinase_ID", join_ids(kinase_ids)?)],
            SourceTable::Kinases,
        )
    }

    pub fn kinases_by_names(
        &self,
        names: &[&str],
        species: Option<&str>,
    ) -> Result<Table, KiraError> {
        if names.is_empty() {
            return Err(KiraError::InvalidInput("no kinase names given".to_string()));
        }
        let mut query = vec![("kinase_name", names.join(","))];
        if let Some(species) = species {
            query.push(("species", species.to_string()));
        }
        self.table("kinase_ID", &query, SourceTable::Kinases)
    }

    pub fn structures_by_ids(&self, structure_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "structure_list",
            &[("structure_ID", join_ids(structure_ids)?)],
            SourceTable::Structures,
        )
    }

    pub fn structures_by_kinase_ids(&self, kinase_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "structures_list",
            &[("kinase_ID", join_ids(kinase_ids)?)],
            SourceTable::Structures,
        )
    }

    pub fn structures_by_pdbs(&self, pdbs: &[&str]) -> Result<Table, KiraError> {
        if pdbs.is_empty() {
            return Err(KiraError::InvalidInput("no PDB codes given".to_string()));
        }
        self.table(
            "structures_pdb_list",
            &[("pdb-codes", pdbs.join(","))],
            SourceTable::Structures,
        )
    }

    pub fn ligands_by_kinase_ids(&self, kinase_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "ligands_list",
            &[("kinase_ID", join_ids(kinase_ids)?)],
            SourceTable::Ligands,
        )
    }

    pub fn structures_by_ligand_ids(&self, ligand_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "ligands_list_structures",
            &[("ligand_ID", join_ids(ligand_ids)?)],
            SourceTable::Structures,
        )
    }

    pub fn interaction_types(&self) -> Result<Table, KiraError> {
        self.table("interactions_get_types", &[], SourceTable::Interactions)
    }

    pub fn interaction_fingerprints(&self, structure_ids: &[u64]) -> Result<Table, KiraError> {
        self.table(
            "interactions_get_IFP",
            &[("structure_ID", join_ids(structure_ids)?)],
            SourceTable::Interactions,
        )
    }

    pub fn pocket_residues(&self, structure_id: u64) -> Result<Table, KiraError> {
        self.table(
            "interactions_match_residues",
            &[("structure_ID", structure_id.to_string())],
            SourceTable::Structures,
        )
    }

    pub fn bioactivities_by_ligand_ids(&self, ligand_ids: &[u64]) -> Result<Table, KiraError> {
        if ligand_ids.is_empty() {
            return Err(KiraError::InvalidInput("no ligand IDs given".to_string()));
        }
        let mut records = Vec::new();
        for ligand_id in ligand_ids {
            let value = self
                .client
                .get_json("bioactivity_list_id", &[("ligand_ID", ligand_id.to_string())])?;
            records.extend(into_records(value)?);
        }
        flatten(&records)?.rename_columns(SourceTable::Bioactivities)
    }

    pub fn coordinates_text(
        &self,
        structure_id: u64,
        entity: Entity,
        format: FileFormat,
    ) -> Result<String, KiraError> {
        let endpoint = coordinates_endpoint(entity, format)?;
        self.client
            .get_text(&endpoint, &[("structure_ID", structure_id.to_string())])
    }

    pub fn coordinates(&self, structure_id: u64, entity: Entity) -> Result<Structure, KiraError> {
        let text = self.coordinates_text(structure_id, entity, FileFormat::Mol2)?;
        Structure::from_mol2_str(format!("{structure_id}_{entity}"), &text)
    }

    pub fn download_coordinates(
        &self,
        structure_id: u64,
        entity: Entity,
        format: FileFormat,
        root: &Utf8Path,
        layout: Layout,
    ) -> Result<DownloadRecord, KiraError> {
        let structures = self.structures_by_ids(&[structure_id])?;
        let locator = locator_from_row(&structures, 0)?;
        let text = self.coordinates_text(structure_id, entity, format)?;
        let path = build_path(root, &locator, entity, format, layout);
        write_atomic(&path, text.as_bytes())?;
        debug!(structure_id, %path, "stored KLIFS coordinates");

        Ok(DownloadRecord {
            structure_id,
            entity,
            format,
            path: path.to_string(),
            downloaded_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn table(
        &self,
        endpoint: &str,
        query: &Query<'_>,
        source: SourceTable,
    ) -> Result<Table, KiraError> {
        let value = self.client.get_json(endpoint, query)?;
        let records = into_records(value)?;
        flatten(&records)?.rename_columns(source)
    }
}

/// Endpoint serving one entity in one format; water is local-only and pdb exists for complexes only.
pub fn coordinates_endpoint(entity: Entity, format: FileFormat) -> Result<String, KiraError> {
    match (entity, format) {
        (Entity::Water, _) => Err(KiraError::InvalidInput(
            "water coordinates are only available locally".to_string(),
        )),
        (Entity::Complex, FileFormat::Pdb) => Ok("structure_get_pdb_complex".to_string()),
        (_, FileFormat::Pdb) => Err(KiraError::InvalidInput(format!(
            "pdb format is only available for complexes, not {entity}"
        ))),
        (_, FileFormat::Mol2) => Ok(format!("structure_get_{entity}")),
    }
}

pub fn into_records(value: Value) -> Result<Vec<Record>, KiraError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(KiraError::KlifsHttp(format!(
                "expected a JSON array of records, got {other}"
            )));
        }
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(KiraError::KlifsHttp(format!(
                "expected a JSON object record, got {other}"
            ))),
        })
        .collect()
}

fn strings(value: Value) -> Result<Vec<String>, KiraError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(KiraError::KlifsHttp(format!(
                "expected a JSON array of strings, got {other}"
            )));
        }
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(value) => Ok(value),
            other => Err(KiraError::KlifsHttp(format!(
                "expected a JSON string, got {other}"
            ))),
        })
        .collect()
}

fn join_ids(ids: &[u64]) -> Result<String, KiraError> {
    if ids.is_empty() {
        return Err(KiraError::InvalidInput("no IDs given".to_string()));
    }
    Ok(ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(","))
}

fn optional_query<'a>(pairs: &[(&'a str, Option<&str>)]) -> Vec<(&'a str, String)> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.map(|value| (*key, value.to_string())))
        .collect()
}
