//! Cache domain - keys, shared stores and transactional staging

mod coordinator;
mod key;
mod named;
mod repository;
mod staged;

pub use coordinator::CacheCoordinator;
pub use key::CacheKey;
pub use named::NamedCache;
pub use repository::{Cache, CacheExt};
pub use staged::StagedCacheView;

#[cfg(test)]
pub use repository::mock::MockCache;
