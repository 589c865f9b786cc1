use std::fs;

use assert_matches::assert_matches;

use kira_klifs::config::{ConfigLoader, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES};
use kira_klifs::error::KiraError;

#[test]
fn partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kira-klifs.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "remote": { "timeout_secs": 5 },
            "local": { "root": "/data/klifs" },
            "aligner": { "gap_open": -10 }
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.remote.base_url, DEFAULT_BASE_URL);
    assert_eq!(resolved.remote.timeout_secs, 5);
    assert_eq!(resolved.remote.max_retries, DEFAULT_MAX_RETRIES);
    assert_eq!(resolved.local_root.as_str(), "/data/klifs");
    assert_eq!(resolved.scoring.gap_open, -10);
    assert_eq!(resolved.scoring.match_score, 2);
}

#[test]
fn explicit_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigRead(_))
    );
}

#[test]
fn malformed_json_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kira-klifs.json");
    fs::write(&path, r#"{ "remote": "klifs" }"#).unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigParse(_))
    );
}

#[test]
fn positive_gap_penalty_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kira-klifs.json");
    fs::write(&path, r#"{ "aligner": { "gap_extend": 1 }, "local": { "root": "/tmp" } }"#).unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(KiraError::ConfigParse(_))
    );
}
