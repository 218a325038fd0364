//! Flush command - clears one shared named cache

use clap::Args;
use tracing::info;

use crate::domain::DomainError;
use crate::infrastructure::cache::CacheRegistry;

/// Arguments for the flush command
#[derive(Args, Clone, Debug)]
pub struct FlushArgs {
    /// Namespace of the cache to clear
    #[arg(long, short = 'n')]
    pub namespace: String,
}

/// Run the flush command
pub async fn run(args: FlushArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let registry = CacheRegistry::from_config(&config).await?;

    let removed = flush(&registry, &args.namespace).await?;
    println!("{}\t{} entries removed", args.namespace, removed);

    Ok(())
}

/// Clears the namespace and returns how many entries it held
async fn flush(registry: &CacheRegistry, namespace: &str) -> Result<usize, DomainError> {
    let cache = registry.require(namespace)?;

    let entries = cache.store().size().await?;
    cache.store().clear().await?;

    info!(cache = namespace, entries, "Cache flushed");
    Ok(entries)
}
