use deploytrace_types::{Error, Result};
use serde::Deserialize;
use std::fmt;
use tokio::process::Command;
use tracing::debug;

/// Where the bearer token for Resource Manager comes from
#[derive(Clone)]
pub enum Credential {
    /// Token supplied verbatim (e.g. from `--access-token`)
    Static(String),
    /// Token issued by an already logged-in Azure CLI
    AzureCli { tenant_id: Option<String> },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Static(_) => f.write_str("Static(<redacted>)"),
            Credential::AzureCli { tenant_id } => f
                .debug_struct("AzureCli")
                .field("tenant_id", tenant_id)
                .finish(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
}

impl Credential {
    /// Obtain a bearer token valid for `resource` (the endpoint URL with a
    /// trailing slash)
    pub async fn acquire(&self, resource: &str) -> Result<String> {
        match self {
            Credential::Static(token) => Ok(token.clone()),
            Credential::AzureCli { tenant_id } => {
                azure_cli_token(resource, tenant_id.as_deref()).await
            }
        }
    }
}

async fn azure_cli_token(resource: &str, tenant_id: Option<&str>) -> Result<String> {
    let program = if cfg!(windows) { "az.cmd" } else { "az" };
    let mut command = Command::new(program);
    command.args([
        "account",
        "get-access-token",
        "--output",
        "json",
        "--resource",
        resource,
    ]);
    if let Some(tenant) = tenant_id {
        command.args(["--tenant", tenant]);
    }

    debug!(resource, tenant = tenant_id, "requesting token from Azure CLI");
    let output = command
        .output()
        .await
        .map_err(|e| Error::Credential(format!("failed to run `{}`: {}", program, e)))?;

    if !output.status.success() {
        return Err(Error::Credential(format!(
            "`az account get-access-token` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_cli_token(&output.stdout)
}

fn parse_cli_token(stdout: &[u8]) -> Result<String> {
    let token: CliToken = serde_json::from_slice(stdout)
        .map_err(|e| Error::Credential(format!("unexpected Azure CLI output: {}", e)))?;
    if token.access_token.is_empty() {
        return Err(Error::Credential("Azure CLI returned an empty token".to_string()));
    }
    Ok(token.access_token)
}
