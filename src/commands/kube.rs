//! `akita kube secret`: render a Kubernetes Secret manifest holding the
//! stored API credentials.
//!
//! The manifest variant follows whichever credential kind is configured:
//! an Akita API key pair, or a Postman API key.

use crate::cfg::Credentials;
use crate::guard::CommandContext;
use crate::printer;
use anyhow::{Context as _, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SecretArgs {
    /// Namespace to create the Secret in
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Write the manifest to this path instead of stdout
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub fn run(ctx: &CommandContext, args: &SecretArgs) -> Result<()> {
    let manifest = manifest_for(&ctx.config.credentials, &args.namespace)?;

    let Some(ref path) = args.file else {
        printer::raw_output(&manifest);
        return Ok(());
    };

    fs::write(path, &manifest)
        .with_context(|| format!("Failed to write generated secret to {}", path.display()))?;
    printer::info(&format!(
        "Successfully generated a Kubernetes Secret file at {}",
        path.display()
    ));
    printer::info(&format!("To apply, run: kubectl apply -f {}", path.display()));
    Ok(())
}

/// Pick the manifest variant for the configured credentials. An Akita key
/// pair takes precedence over a Postman key when both are present.
fn manifest_for(credentials: &Credentials, namespace: &str) -> Result<String> {
    if let Some((key_id, key_secret)) = credentials.api_key_pair() {
        return Ok(render_akita_secret(namespace, key_id, key_secret));
    }
    if let Some(ref api_key) = credentials.postman_api_key {
        return Ok(render_postman_secret(namespace, api_key));
    }
    Err(anyhow!(
        "API credentials are required for Kubernetes Secret generation"
    ))
}

/// Render the Secret manifest for an Akita API key pair. Credential values
/// are base64-encoded as Kubernetes requires for `data` fields.
fn render_akita_secret(namespace: &str, key_id: &str, key_secret: &str) -> String {
    format!(
        "apiVersion: v1\n\
         kind: Secret\n\
         metadata:\n\
         \x20 name: akita-secrets\n\
         \x20 namespace: {namespace}\n\
         type: Opaque\n\
         data:\n\
         \x20 akita-api-key-id: {id}\n\
         \x20 akita-api-key-secret: {secret}\n",
        id = BASE64.encode(key_id),
        secret = BASE64.encode(key_secret),
    )
}

/// Render the Secret manifest for a Postman API key.
fn render_postman_secret(namespace: &str, api_key: &str) -> String {
    format!(
        "apiVersion: v1\n\
         kind: Secret\n\
         metadata:\n\
         \x20 name: postman-secrets\n\
         \x20 namespace: {namespace}\n\
         type: Opaque\n\
         data:\n\
         \x20 postman-api-key: {key}\n",
        key = BASE64.encode(api_key),
    )
}
