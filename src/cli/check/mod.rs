//! Check command - builds every named cache and reports its size

use tracing::{info, warn};

use crate::domain::DomainError;
use crate::infrastructure::cache::CacheRegistry;

/// Run the check command
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    info!(
        environment = config.environment_id.as_deref().unwrap_or("-"),
        backend = %config.cache.backend,
        "Checking caches"
    );

    let registry = CacheRegistry::from_config(&config).await?;
    if registry.is_empty() {
        warn!("No cache namespaces configured");
    }

    for (namespace, entries) in sizes(&registry).await? {
        println!("{namespace}\t{entries}");
    }

    Ok(())
}

/// Entry count of every registered cache, in namespace order
async fn sizes(registry: &CacheRegistry) -> Result<Vec<(String, usize)>, DomainError> {
    let mut report = Vec::with_capacity(registry.len());

    for cache in registry.iter() {
        let entries = cache.store().size().await?;
        report.push((cache.id().to_string(), entries));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::cache::{MockCache, NamedCache};

    #[tokio::test]
    async fn test_sizes_in_namespace_order() {
        let registry = CacheRegistry::from_caches([
            NamedCache::new(
                "users",
                Arc::new(MockCache::new().with_entry("a", &1).with_entry("b", &2)),
            ),
            NamedCache::new("orders", Arc::new(MockCache::new())),
        ]);

        let report = sizes(&registry).await.unwrap();

        assert_eq!(
            report,
            vec![("orders".to_string(), 0), ("users".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_sizes_propagates_store_errors() {
        let registry = CacheRegistry::from_caches([NamedCache::new(
            "users",
            Arc::new(MockCache::new().with_error("unreachable")),
        )]);

        let result = sizes(&registry).await;

        assert!(matches!(result, Err(DomainError::Cache { .. })));
    }
}
