//! PMP Query Cache
//!
//! A transactional second-level cache for mapped statement execution:
//! - Deterministic cache keys built from statement, bounds and parameters
//! - Per-transaction staging of reads, writes and clears over shared caches
//! - A caching executor decorator that flushes, stages and commits
//! - In-memory (moka) and Redis shared stores

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    Cache, CacheCoordinator, CacheKey, CachingExecutor, DomainError, Executor, NamedCache,
    ParameterObject, RowBounds, Statement,
};
pub use infrastructure::cache::CacheRegistry;
