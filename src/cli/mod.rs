//! CLI module for the query cache
//!
//! Operational subcommands over the configured shared caches:
//! - `check`: build every named cache and report entry counts
//! - `flush`: clear one named cache

pub mod check;
pub mod flush;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// PMP Query Cache - transactional second-level cache for mapped statements
#[derive(Parser)]
#[command(name = "pmp-query-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to every configured cache and report its size
    Check,

    /// Clear a shared named cache
    Flush(flush::FlushArgs),
}

/// Loads `.env` and the layered configuration, then installs logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
