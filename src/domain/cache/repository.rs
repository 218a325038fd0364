//! Cache trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Shared key-value store behind a named cache.
///
/// Values are JSON strings so the trait stays dyn-compatible; use [`CacheExt`]
/// for typed access. Implementations must tolerate concurrent use from many
/// transactions.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores a raw JSON value, replacing any previous one
    async fn put_raw(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Removes a value, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if a key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Clears all entries from the cache
    async fn clear(&self) -> Result<(), DomainError>;

    /// Returns approximate number of entries in the cache
    async fn size(&self) -> Result<usize, DomainError>;
}

/// Extension trait providing typed get/put operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => Ok(Some(decode(&data)?)),
                None => Ok(None),
            }
        }
    }

    /// Stores a typed value in the cache
    fn put<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = encode(value)?;
            self.put_raw(key, &data).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

/// Serializes a value for storage
pub fn encode<V: Serialize + ?Sized>(value: &V) -> Result<String, DomainError> {
    serde_json::to_string(value)
        .map_err(|e| DomainError::cache(format!("Failed to serialize cache value: {}", e)))
}

/// Deserializes a stored value
pub fn decode<V: DeserializeOwned>(data: &str) -> Result<V, DomainError> {
    serde_json::from_str(data)
        .map_err(|e| DomainError::cache(format!("Failed to deserialize cache value: {}", e)))
}
