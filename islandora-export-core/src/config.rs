use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const USERNAME_ENV: &str = "ISLANDORA_WORKBENCH_USERNAME";
pub const PASSWORD_ENV: &str = "ISLANDORA_WORKBENCH_PASSWORD";

/// Cache entries older than this are refetched.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// HTTP Basic credentials for the repository.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read both environment variables. If either is unset or empty the
    /// requests go out unauthenticated.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var(USERNAME_ENV).ok().filter(|v| !v.is_empty());
        let password = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Some(Self { username, password }),
            _ => {
                debug!("No repository credentials in environment, fetching unauthenticated");
                None
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub cache_dir: PathBuf,
    pub max_age: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir().join("islandora"),
            max_age: DEFAULT_MAX_AGE,
            credentials: None,
        }
    }
}

impl FetchConfig {
    pub fn trace_loaded(&self) {
        info!(
            cache_dir = %self.cache_dir.display(),
            max_age_secs = self.max_age.as_secs(),
            authenticated = self.credentials.is_some(),
            "Loaded FetchConfig"
        );
        debug!(?self, "FetchConfig loaded (full debug)");
    }
}

/// Which Crossref deposit shape to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepositKind {
    #[default]
    JournalVolume,
    JournalIssue,
}

/// Journal- and depositor-level values the repository does not hold.
/// `journal_doi` / `journal_url` fall back to the root node when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrossrefSettings {
    #[serde(default)]
    pub registrant: String,
    #[serde(default)]
    pub depositor_name: String,
    #[serde(default)]
    pub depositor_email: String,
    #[serde(default)]
    pub journal_doi: Option<String>,
    #[serde(default)]
    pub journal_url: Option<String>,
}

impl CrossrefSettings {
    pub fn trace_loaded(&self) {
        info!(
            registrant = %self.registrant,
            depositor = %self.depositor_name,
            journal_doi_configured = self.journal_doi.is_some(),
            journal_url_configured = self.journal_url.is_some(),
            "Loaded CrossrefSettings"
        );
        debug!(?self, "CrossrefSettings loaded (full debug)");
    }
}
