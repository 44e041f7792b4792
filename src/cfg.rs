//! Credential and settings loading.
//!
//! Credentials come from two places, merged with environment variables
//! taking priority over the credentials file:
//! 1. Environment: `AKITA_API_KEY_ID`, `AKITA_API_KEY_SECRET`,
//!    `POSTMAN_API_KEY`, `POSTMAN_ENV`
//! 2. File: `~/.akita/credentials.toml`
//!
//! The `AKITA_TEST_ONLY_DISABLE_GITHUB_TEAMS_CHECK` variable disables the
//! CI enablement check; it exists solely to keep automated tests hermetic.

use crate::error::ApiResult;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ID_VAR: &str = "AKITA_API_KEY_ID";
pub const API_KEY_SECRET_VAR: &str = "AKITA_API_KEY_SECRET";
pub const POSTMAN_API_KEY_VAR: &str = "POSTMAN_API_KEY";
pub const POSTMAN_ENV_VAR: &str = "POSTMAN_ENV";
pub const TEST_ONLY_DISABLE_TEAMS_CHECK_VAR: &str = "AKITA_TEST_ONLY_DISABLE_GITHUB_TEAMS_CHECK";

/// Stored API credentials. All fields optional; empty strings are
/// normalized to absent so "unset" and "set to nothing" behave identically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub api_key_id: Option<String>,
    pub api_key_secret: Option<String>,
    pub postman_api_key: Option<String>,
    pub postman_env: Option<String>,
}

impl Credentials {
    /// Load credentials from the file (if present) and overlay environment
    /// variables. A missing or unreadable file is not an error.
    pub fn load(env: &BTreeMap<String, String>) -> Self {
        let mut creds = credentials_path()
            .and_then(|p| Self::load_file(&p).ok())
            .unwrap_or_default();
        creds.apply_env(env);
        creds.normalize();
        creds
    }

    /// Parse a credentials TOML file.
    pub fn load_file(path: &Path) -> ApiResult<Self> {
        let content = fs::read_to_string(path)?;
        let creds: Credentials = toml::from_str(&content)?;
        Ok(creds)
    }

    fn apply_env(&mut self, env: &BTreeMap<String, String>) {
        let overlay = |slot: &mut Option<String>, var: &str| {
            if let Some(v) = env.get(var) {
                if !v.is_empty() {
                    *slot = Some(v.clone());
                }
            }
        };
        overlay(&mut self.api_key_id, API_KEY_ID_VAR);
        overlay(&mut self.api_key_secret, API_KEY_SECRET_VAR);
        overlay(&mut self.postman_api_key, POSTMAN_API_KEY_VAR);
        overlay(&mut self.postman_env, POSTMAN_ENV_VAR);
    }

    fn normalize(&mut self) {
        for slot in [
            &mut self.api_key_id,
            &mut self.api_key_secret,
            &mut self.postman_api_key,
            &mut self.postman_env,
        ] {
            if slot.as_deref() == Some("") {
                *slot = None;
            }
        }
    }

    /// Akita API key pair, if both halves are configured.
    pub fn api_key_pair(&self) -> Option<(&str, &str)> {
        match (&self.api_key_id, &self.api_key_secret) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

/// Process-wide settings derived from the environment and stored state.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: Credentials,
    /// Skip the CI enablement check entirely. Test-only.
    pub test_only_disable_github_teams_check: bool,
}

impl Config {
    pub fn load(env: &BTreeMap<String, String>) -> Self {
        Self {
            credentials: Credentials::load(env),
            test_only_disable_github_teams_check: env
                .get(TEST_ONLY_DISABLE_TEAMS_CHECK_VAR)
                .is_some_and(|v| is_truthy(v)),
        }
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Path of the credentials file (`~/.akita/credentials.toml`).
pub fn credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".akita/credentials.toml"))
}

/// Stable per-install client identity, created on first use.
///
/// Best-effort: if the id file cannot be read or written, a fresh id is
/// returned for this invocation only.
pub fn client_id() -> String {
    let path = dirs::home_dir().map(|home| home.join(".akita/client-id"));

    if let Some(ref path) = path {
        if let Ok(existing) = fs::read_to_string(path) {
            let existing = existing.trim();
            if !existing.is_empty() {
                return existing.to_string();
            }
        }
    }

    let fresh = uuid::Uuid::new_v4().to_string();
    if let Some(ref path) = path {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(path, &fresh);
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(
            &path,
            "api_key_id = \"apk_123\"\napi_key_secret = \"sec_456\"\n",
        )
        .unwrap();

        let creds = Credentials::load_file(&path).unwrap();
        assert_eq!(creds.api_key_id.as_deref(), Some("apk_123"));
        assert_eq!(creds.api_key_secret.as_deref(), Some("sec_456"));
        assert_eq!(creds.postman_api_key, None);
    }

    #[test]
    fn test_load_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Credentials::load_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut creds = Credentials {
            api_key_id: Some("from-file".to_string()),
            ..Credentials::default()
        };
        creds.apply_env(&env(&[(API_KEY_ID_VAR, "from-env")]));
        assert_eq!(creds.api_key_id.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_env_value_does_not_clobber() {
        let mut creds = Credentials {
            api_key_id: Some("from-file".to_string()),
            ..Credentials::default()
        };
        creds.apply_env(&env(&[(API_KEY_ID_VAR, "")]));
        assert_eq!(creds.api_key_id.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_empty_strings_normalize_to_absent() {
        let mut creds = Credentials {
            postman_api_key: Some(String::new()),
            ..Credentials::default()
        };
        creds.normalize();
        assert_eq!(creds.postman_api_key, None);
    }

    #[test]
    fn test_api_key_pair_requires_both_halves() {
        let mut creds = Credentials {
            api_key_id: Some("id".to_string()),
            ..Credentials::default()
        };
        assert!(creds.api_key_pair().is_none());
        creds.api_key_secret = Some("secret".to_string());
        assert_eq!(creds.api_key_pair(), Some(("id", "secret")));
    }

    #[test]
    fn test_test_only_flag_parsing() {
        let cfg = Config::load(&env(&[(TEST_ONLY_DISABLE_TEAMS_CHECK_VAR, "true")]));
        assert!(cfg.test_only_disable_github_teams_check);

        let cfg = Config::load(&env(&[(TEST_ONLY_DISABLE_TEAMS_CHECK_VAR, "0")]));
        assert!(!cfg.test_only_disable_github_teams_check);

        let cfg = Config::load(&env(&[]));
        assert!(!cfg.test_only_disable_github_teams_check);
    }
}
