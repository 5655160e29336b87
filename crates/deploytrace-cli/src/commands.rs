use super::args::Cli;
use super::handlers;
use crate::config::TraceRequest;
use crate::logging::init_logging;
use anyhow::{Context, Result};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level)?;

    let request = TraceRequest::from_cli(&cli);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(handlers::deployment::handle(request))
}
