use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::align::SequenceScoring;
use crate::error::KiraError;

pub const CONFIG_FILE: &str = "kira-klifs.json";
pub const DEFAULT_BASE_URL: &str = "https://klifs.net/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: usize = 2;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub remote: Option<RemoteEntry>,
    #[serde(default)]
    pub local: Option<LocalEntry>,
    #[serde(default)]
    pub aligner: Option<SequenceScoring>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RemoteEntry {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocalEntry {
    #[serde(default)]
    pub root: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub remote: RemoteSettings,
    pub local_root: Utf8PathBuf,
    pub scoring: SequenceScoring,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KiraError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let remote_entry = config.remote.unwrap_or_default();
        let defaults = RemoteSettings::default();
        let base_url = remote_entry.base_url.unwrap_or(defaults.base_url);
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(KiraError::ConfigParse(format!(
                "remote.base_url must be an http(s) URL, got `{base_url}`"
            )));
        }
        let remote = RemoteSettings {
            base_url,
            timeout_secs: remote_entry.timeout_secs.unwrap_or(defaults.timeout_secs),
            max_retries: remote_entry.max_retries.unwrap_or(defaults.max_retries),
        };

        let local_root = match config.local.and_then(|local| local.root) {
            Some(root) => root,
            None => default_local_root()?,
        };

        let scoring = config.aligner.unwrap_or_default();
        if scoring.gap_open > 0 || scoring.gap_extend > 0 {
            return Err(KiraError::ConfigParse(
                "aligner gap penalties must not be positive".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version,
            remote,
            local_root,
            scoring,
        })
    }
}

pub fn default_local_root() -> Result<Utf8PathBuf, KiraError> {
    let base = BaseDirs::new()
        .ok_or_else(|| KiraError::Filesystem("cannot determine home directory".to_string()))?;
    let cache = Utf8PathBuf::from_path_buf(base.cache_dir().to_path_buf())
        .map_err(|path| KiraError::Filesystem(format!("non UTF-8 cache dir {}", path.display())))?;
    Ok(cache.join("kira-klifs"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let config = Config {
            local: Some(LocalEntry {
                root: Some(Utf8PathBuf::from("/data/klifs")),
            }),
            ..Config::default()
        };

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.remote, RemoteSettings::default());
        assert_eq!(resolved.local_root, Utf8PathBuf::from("/data/klifs"));
        assert_eq!(resolved.scoring, SequenceScoring::default());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = Config {
            remote: Some(RemoteEntry {
                base_url: Some("ftp://klifs.net".to_string()),
                ..RemoteEntry::default()
            }),
            ..Config::default()
        };
        assert_matches!(
            ConfigLoader::resolve_config(config),
            Err(KiraError::ConfigParse(_))
        );
    }
}
