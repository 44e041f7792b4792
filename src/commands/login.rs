//! `akita login`: store API credentials in `~/.akita/credentials.toml`.

use crate::cfg;
use crate::printer;
use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// API key id to store
    #[arg(long, env = "AKITA_API_KEY_ID")]
    pub api_key_id: String,

    /// API key secret to store
    #[arg(long, env = "AKITA_API_KEY_SECRET")]
    pub api_key_secret: String,
}

#[derive(Serialize)]
struct StoredCredentials<'a> {
    api_key_id: &'a str,
    api_key_secret: &'a str,
}

pub fn run(args: &LoginArgs) -> Result<()> {
    let path = cfg::credentials_path()
        .ok_or_else(|| anyhow!("could not determine home directory for credentials file"))?;
    write_credentials(&path, &args.api_key_id, &args.api_key_secret)?;
    printer::info(&format!("Credentials written to {}", path.display()));
    Ok(())
}

/// Write the credentials file, creating parent directories and restricting
/// permissions to the owner.
pub fn write_credentials(path: &Path, key_id: &str, key_secret: &str) -> Result<()> {
    let stored = StoredCredentials {
        api_key_id: key_id,
        api_key_secret: key_secret,
    };
    let content = toml::to_string(&stored).context("failed to serialize credentials")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }
    Ok(())
}
