//! Registry of the named caches configured for this process

use std::collections::BTreeMap;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::NamedCache;
use crate::domain::DomainError;

use super::factory::{CacheConfig, CacheFactory};

/// Named caches keyed by namespace
#[derive(Debug, Default, Clone)]
pub struct CacheRegistry {
    caches: BTreeMap<String, NamedCache>,
}

impl CacheRegistry {
    /// Builds every namespace listed in the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        validate_namespaces(&config.namespaces)?;

        let cache_config = CacheConfig::from_settings(&config.cache)?;
        let caches = CacheFactory::new()
            .create_named(&cache_config, &config.namespaces)
            .await?;

        info!(
            backend = %cache_config.cache_type,
            namespaces = caches.len(),
            "Cache registry initialized"
        );

        Ok(Self::from_caches(caches))
    }

    pub fn from_caches(caches: impl IntoIterator<Item = NamedCache>) -> Self {
        Self {
            caches: caches
                .into_iter()
                .map(|cache| (cache.id().to_string(), cache))
                .collect(),
        }
    }

    pub fn get(&self, namespace: &str) -> Option<&NamedCache> {
        self.caches.get(namespace)
    }

    /// Like [`get`](Self::get) but unknown namespaces are a configuration error
    pub fn require(&self, namespace: &str) -> Result<&NamedCache, DomainError> {
        self.get(namespace).ok_or_else(|| {
            DomainError::configuration(format!("Unknown cache namespace: {}", namespace))
        })
    }

    /// Iterates caches in namespace order
    pub fn iter(&self) -> impl Iterator<Item = &NamedCache> {
        self.caches.values()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

const GLOB_METACHARACTERS: &[char] = &['*', '?', '[', ']', '\\'];

fn validate_namespaces(namespaces: &[String]) -> Result<(), DomainError> {
    let mut seen = std::collections::HashSet::new();

    for namespace in namespaces {
        if namespace.trim().is_empty() {
            return Err(DomainError::validation("Cache namespace must not be empty"));
        }
        // Namespaces end up in SCAN MATCH patterns
        if namespace.contains(GLOB_METACHARACTERS) {
            return Err(DomainError::validation(format!(
                "Cache namespace must not contain glob characters: {}",
                namespace
            )));
        }
        if !seen.insert(namespace.as_str()) {
            return Err(DomainError::validation(format!(
                "Duplicate cache namespace: {}",
                namespace
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::cache::MockCache;

    fn config_with(namespaces: &[&str]) -> AppConfig {
        AppConfig {
            namespaces: namespaces.iter().map(|ns| ns.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_from_config_builds_each_namespace() {
        let registry = CacheRegistry::from_config(&config_with(&["users", "orders"]))
            .await
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("users").is_some());
        assert!(registry.get("missing").is_none());

        let ids: Vec<&str> = registry.iter().map(|cache| cache.id()).collect();
        assert_eq!(ids, vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_from_config_rejects_duplicates() {
        let result = CacheRegistry::from_config(&config_with(&["users", "users"])).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_from_config_rejects_blank_namespace() {
        let result = CacheRegistry::from_config(&config_with(&["  "])).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_from_config_rejects_glob_characters() {
        for namespace in ["users*", "user?", "users[12]", "a\\b"] {
            let result = CacheRegistry::from_config(&config_with(&[namespace])).await;

            assert!(
                matches!(result, Err(DomainError::Validation { .. })),
                "{namespace} should be rejected"
            );
        }
    }

    #[test]
    fn test_require_unknown_namespace() {
        let registry =
            CacheRegistry::from_caches([NamedCache::new("users", Arc::new(MockCache::new()))]);

        assert_eq!(registry.require("users").unwrap().id(), "users");
        assert!(matches!(
            registry.require("orders"),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = CacheRegistry::default();

        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
