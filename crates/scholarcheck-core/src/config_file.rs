use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub sources: Option<SourcesConfig>,
    pub verification: Option<VerificationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub openalex_key: Option<String>,
    pub scholar_api_key: Option<String>,
    pub crossref_mailto: Option<String>,
}

/// Per-source matching knobs. Thresholds are deployment parameters, not
/// contract: tune them against the index actually deployed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub disabled: Option<Vec<String>>,
    pub openalex_threshold: Option<f64>,
    pub crossref_threshold: Option<f64>,
    pub europepmc_threshold: Option<f64>,
    pub scholar_threshold: Option<f64>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub query_timeout_secs: Option<u64>,
    pub chunk_size: Option<usize>,
    pub chunk_delay_ms: Option<u64>,
}

/// Platform config directory path: `<config_dir>/scholarcheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholarcheck").join("config.toml"))
}

/// Load config by cascading CWD `.scholarcheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".scholarcheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn pick<T: Clone>(overlay: &Option<T>, base: &Option<T>) -> Option<T> {
    overlay.clone().or_else(|| base.clone())
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_keys = base.api_keys.unwrap_or_default();
    let over_keys = overlay.api_keys.unwrap_or_default();
    let base_sources = base.sources.unwrap_or_default();
    let over_sources = overlay.sources.unwrap_or_default();
    let base_verification = base.verification.unwrap_or_default();
    let over_verification = overlay.verification.unwrap_or_default();

    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            openalex_key: pick(&over_keys.openalex_key, &base_keys.openalex_key),
            scholar_api_key: pick(&over_keys.scholar_api_key, &base_keys.scholar_api_key),
            crossref_mailto: pick(&over_keys.crossref_mailto, &base_keys.crossref_mailto),
        }),
        sources: Some(SourcesConfig {
            disabled: pick(&over_sources.disabled, &base_sources.disabled),
            openalex_threshold: pick(&over_sources.openalex_threshold, &base_sources.openalex_threshold),
            crossref_threshold: pick(&over_sources.crossref_threshold, &base_sources.crossref_threshold),
            europepmc_threshold: pick(&over_sources.europepmc_threshold, &base_sources.europepmc_threshold),
            scholar_threshold: pick(&over_sources.scholar_threshold, &base_sources.scholar_threshold),
            max_results: pick(&over_sources.max_results, &base_sources.max_results),
        }),
        verification: Some(VerificationConfig {
            query_timeout_secs: pick(
                &over_verification.query_timeout_secs,
                &base_verification.query_timeout_secs,
            ),
            chunk_size: pick(&over_verification.chunk_size, &base_verification.chunk_size),
            chunk_delay_ms: pick(&over_verification.chunk_delay_ms, &base_verification.chunk_delay_ms),
        }),
    }
}
