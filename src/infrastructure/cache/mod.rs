//! Cache infrastructure - shared store implementations and the named cache registry

mod factory;
mod in_memory;
mod redis;
mod registry;

pub use factory::{CacheConfig, CacheFactory, CacheType};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};
pub use registry::CacheRegistry;
