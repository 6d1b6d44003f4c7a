mod billing;
mod config;
mod domain;
mod engine;
mod ingestion;
mod report;
mod repository;
mod shared;
mod telemetry;
mod warnings;

use std::{fs::File, io};

use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::engine::Reconciler;
use crate::repository::InMemoryLedger;
use crate::warnings::StdErrSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();
    let config = Config::parse();

    let file = File::open(&config.input)?;
    let ingestion = ingestion::CsvReader::new(file);

    let mut reconciler = Reconciler::new(ingestion, InMemoryLedger::new(), StdErrSink::default());
    reconciler.process().await;
    info!(net_worth = %reconciler.net_worth(), "ledger reconciled");

    reconciler.flush(&config, io::stdout().lock())?;

    Ok(())
}
