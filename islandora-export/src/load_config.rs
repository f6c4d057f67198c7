/// `load_config` module: loads the optional YAML settings file and turns it
/// into the core crate's configuration structs.
///
/// The file holds no secrets. Repository credentials come from the
/// environment (see [`Credentials::from_env`]) and command-line flags
/// override anything set here.
///
/// ```yaml
/// fetch:
///   cache_dir: /var/cache/islandora
///   max_age_hours: 12
/// crossref:
///   registrant: Lehigh University
///   depositor_name: Library Technology
///   depositor_email: lib@example.edu
/// ```
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use islandora_export_core::config::{Credentials, FetchConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CliConfig {
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub crossref: CrossrefSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FetchSection {
    pub cache_dir: Option<PathBuf>,
    pub max_age_hours: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CrossrefSection {
    pub registrant: Option<String>,
    pub depositor_name: Option<String>,
    pub depositor_email: Option<String>,
    pub journal_doi: Option<String>,
    pub journal_url: Option<String>,
}

impl CliConfig {
    /// Fetch settings with defaults filled in and credentials read from
    /// the environment.
    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            cache_dir: self.fetch.cache_dir.clone().unwrap_or(defaults.cache_dir),
            max_age: self
                .fetch
                .max_age_hours
                .map(|h| Duration::from_secs(h * 60 * 60))
                .unwrap_or(defaults.max_age),
            credentials: Credentials::from_env(),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid, empty config.
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
