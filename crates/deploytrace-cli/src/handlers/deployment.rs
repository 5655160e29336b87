use crate::config::TraceRequest;
use crate::presentation::tree::draw_tree;
use crate::types::OutputMode;
use anyhow::{Context, Result};
use deploytrace_engine::{build_tree, export_trace};
use deploytrace_providers::ArmClient;
use deploytrace_types::{DeploymentNode, Error};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub async fn handle(request: TraceRequest) -> Result<()> {
    let client = ArmClient::new(
        &request.subscription_id,
        request.credential.clone(),
        request.client.clone(),
    )?;

    info!(deployment = %request.root, endpoint = %request.client.endpoint, "building deployment tree");

    // A failed signal registration disables the branch instead of cancelling
    let tree = tokio::select! {
        tree = build_tree(&client, &request.root) => tree,
        Ok(()) = tokio::signal::ctrl_c() => Err(Error::Cancelled),
    };
    let root = tree.with_context(|| format!("failed to trace deployment {}", request.root))?;

    match request.output {
        OutputMode::Cli => write_stdout(&draw_tree(&root)),
        OutputMode::Trace => write_trace(&root, request.output_file.as_deref()),
    }
}

fn write_trace(root: &DeploymentNode, output_file: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_trace(root))?;

    match output_file {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("failed to write trace to {}", path.display()))?;
            println!("Trace written to {}", path.display());
            Ok(())
        }
        None => write_stdout(&format!("{}\n", json)),
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
