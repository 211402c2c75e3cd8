use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vm_profiler::{
    cloud::{azure::AzureClient, credential::credential_from_environment},
    config::{Config, read_config_file},
    orchestrator::Orchestrator,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (defaults apply when omitted)
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("vm_profiler", LevelFilter::DEBUG),
        ("profiler", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    };

    let credential = credential_from_environment(&AzureClient::scope_for(&config.azure))
        .context("no Azure credentials available")?;
    let client = AzureClient::new(&config.azure, credential)
        .context("failed to build Resource Manager client")?;

    let orchestrator = Orchestrator::new(Arc::new(client), config.directories, config.profile);
    let summary = orchestrator.run().await?;

    info!("done: {summary:?}");
    Ok(())
}
