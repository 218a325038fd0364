use clap::Parser;
use pmp_query_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check => cli::check::run().await,
        Command::Flush(args) => cli::flush::run(args).await,
    }
}
