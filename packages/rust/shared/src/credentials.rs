//! Credential storage for the scraper and language-model API keys.
//!
//! Keys are stored in plain text at `~/.sitebrief/credentials.toml`. They are
//! never encrypted and never expire; saving overwrites the previous pair.
//! Environment variables (see [`CredentialsConfig`]) take precedence over
//! stored values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{AppConfig, CredentialsConfig, config_dir};
use crate::error::{Result, SiteBriefError};

/// Credential file name inside the config directory.
const CREDENTIALS_FILE_NAME: &str = "credentials.toml";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The two provider secrets, passed explicitly to whatever needs them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scraper_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    llm_api_key: Option<String>,
}

// Keep secrets out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (scraper, llm) = self.masked();
        f.debug_struct("Credentials")
            .field("scraper_api_key", &scraper)
            .field("llm_api_key", &llm)
            .finish()
    }
}

impl Credentials {
    pub fn new(scraper_api_key: impl Into<String>, llm_api_key: impl Into<String>) -> Self {
        Self {
            scraper_api_key: Some(scraper_api_key.into()),
            llm_api_key: Some(llm_api_key.into()),
        }
    }

    /// The scraping provider key, if present.
    pub fn scraper_api_key(&self) -> Result<&str> {
        present(self.scraper_api_key.as_deref())
            .ok_or_else(|| SiteBriefError::MissingCredential("Scraper".into()))
    }

    /// The language-model provider key, if present.
    pub fn llm_api_key(&self) -> Result<&str> {
        present(self.llm_api_key.as_deref())
            .ok_or_else(|| SiteBriefError::MissingCredential("LLM".into()))
    }

    /// `true` iff both keys are present and non-blank.
    pub fn is_complete(&self) -> bool {
        present(self.scraper_api_key.as_deref()).is_some()
            && present(self.llm_api_key.as_deref()).is_some()
    }

    /// Check that every key the configured providers need is present.
    pub fn validate_for(&self, config: &AppConfig) -> Result<()> {
        if config.scraper.provider.requires_key()
            && present(self.scraper_api_key.as_deref()).is_none()
        {
            return Err(SiteBriefError::MissingCredential("Firecrawl".into()));
        }
        if present(self.llm_api_key.as_deref()).is_none() {
            return Err(SiteBriefError::MissingCredential(
                config.llm.provider.display_name().into(),
            ));
        }
        Ok(())
    }

    /// Apply overrides from the environment variables named in `config`.
    pub fn with_env_overrides(self, config: &CredentialsConfig) -> Self {
        self.with_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Blank values are ignored.
    pub fn with_overrides(
        mut self,
        config: &CredentialsConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(key) = lookup(&config.scraper_key_env).filter(|v| !v.trim().is_empty()) {
            debug!(var = %config.scraper_key_env, "scraper key taken from environment");
            self.scraper_api_key = Some(key);
        }
        if let Some(key) = lookup(&config.llm_key_env).filter(|v| !v.trim().is_empty()) {
            debug!(var = %config.llm_key_env, "LLM key taken from environment");
            self.llm_api_key = Some(key);
        }
        self
    }

    /// Display-safe renderings of both keys (`None` when missing).
    pub fn masked(&self) -> (Option<String>, Option<String>) {
        (
            present(self.scraper_api_key.as_deref()).map(mask),
            present(self.llm_api_key.as_deref()).map(mask),
        )
    }
}

fn present(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}…{tail}")
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// File-backed store for [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at `~/.sitebrief/credentials.toml`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(config_dir()?.join(CREDENTIALS_FILE_NAME)))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored credentials. A missing file yields empty credentials.
    pub fn load(&self) -> Result<Credentials> {
        if !self.path.exists() {
            debug!(path = ?self.path, "no stored credentials");
            return Ok(Credentials::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| SiteBriefError::io(&self.path, e))?;
        toml::from_str(&content).map_err(|e| {
            SiteBriefError::config(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    /// Overwrite the stored pair. Both keys must be non-blank.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if !credentials.is_complete() {
            return Err(SiteBriefError::validation("Please enter both API keys"));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SiteBriefError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(credentials)
            .map_err(|e| SiteBriefError::config(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| SiteBriefError::io(&self.path, e))?;
        restrict_permissions(&self.path)?;

        info!(path = ?self.path, "API keys saved");
        Ok(())
    }

    /// Delete the stored pair. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = ?self.path, "API keys cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SiteBriefError::io(&self.path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| SiteBriefError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmProvider, ScraperProvider};

    fn creds(scraper: Option<&str>, llm: Option<&str>) -> Credentials {
        Credentials {
            scraper_api_key: scraper.map(String::from),
            llm_api_key: llm.map(String::from),
        }
    }

    #[test]
    fn completeness_over_all_combinations() {
        let values = [None, Some(""), Some("   "), Some("key")];
        for scraper in values {
            for llm in values {
                let expected = scraper == Some("key") && llm == Some("key");
                assert_eq!(
                    creds(scraper, llm).is_complete(),
                    expected,
                    "scraper={scraper:?} llm={llm:?}"
                );
            }
        }
    }

    #[test]
    fn accessors_report_missing_keys() {
        let c = creds(Some("fc-123"), None);
        assert_eq!(c.scraper_api_key().unwrap(), "fc-123");
        let err = c.llm_api_key().unwrap_err();
        assert_eq!(err.to_string(), "LLM API key not found");
    }

    #[test]
    fn validate_for_names_the_provider() {
        let mut config = AppConfig::default();
        let err = creds(None, Some("g")).validate_for(&config).unwrap_err();
        assert_eq!(err.to_string(), "Firecrawl API key not found");

        config.llm.provider = LlmProvider::OpenAi;
        let err = creds(Some("f"), None).validate_for(&config).unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API key not found");
    }

    #[test]
    fn direct_scraper_needs_no_scraper_key() {
        let mut config = AppConfig::default();
        config.scraper.provider = ScraperProvider::Direct;
        assert!(creds(None, Some("g")).validate_for(&config).is_ok());
    }

    #[test]
    fn overrides_replace_stored_values() {
        let config = CredentialsConfig::default();
        let c = creds(Some("stored"), Some("stored")).with_overrides(&config, |name| {
            (name == "SITEBRIEF_LLM_API_KEY").then(|| "from-env".to_string())
        });
        assert_eq!(c.scraper_api_key().unwrap(), "stored");
        assert_eq!(c.llm_api_key().unwrap(), "from-env");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = CredentialsConfig::default();
        let c = creds(Some("stored"), None).with_overrides(&config, |_| Some(" ".to_string()));
        assert_eq!(c.scraper_api_key().unwrap(), "stored");
        assert!(c.llm_api_key().is_err());
    }

    #[test]
    fn masked_hides_secret_body() {
        let c = creds(Some("fc-1234567890abcd"), Some("short"));
        let (scraper, llm) = c.masked();
        assert_eq!(scraper.as_deref(), Some("fc-1…abcd"));
        assert_eq!(llm.as_deref(), Some("*****"));
        assert!(!format!("{c:?}").contains("567890"));
    }

    #[test]
    fn store_save_load_and_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::at(dir.path().join("nested").join("credentials.toml"));

        assert_eq!(store.load().unwrap(), Credentials::default());

        store.save(&Credentials::new("fc-1", "g-1")).expect("save");
        assert_eq!(store.load().unwrap(), Credentials::new("fc-1", "g-1"));

        store.save(&Credentials::new("fc-2", "g-2")).expect("overwrite");
        let loaded = store.load().unwrap();
        assert_eq!(loaded.scraper_api_key().unwrap(), "fc-2");
        assert_eq!(loaded.llm_api_key().unwrap(), "g-2");
    }

    #[test]
    fn store_rejects_incomplete_pair() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::at(dir.path().join("credentials.toml"));
        let err = store.save(&creds(Some("fc"), Some(" "))).unwrap_err();
        assert!(err.to_string().contains("both API keys"));
        assert!(!store.path().exists());
    }

    #[test]
    fn store_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::at(dir.path().join("credentials.toml"));
        store.save(&Credentials::new("a", "b")).expect("save");
        store.clear().expect("clear");
        assert!(!store.path().exists());
        store.clear().expect("clear again");
    }

    #[cfg(unix)]
    #[test]
    fn store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::at(dir.path().join("credentials.toml"));
        store.save(&Credentials::new("a", "b")).expect("save");
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
