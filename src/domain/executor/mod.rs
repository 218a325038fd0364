//! Executor domain - statement execution and the caching decorator

mod caching;
#[allow(clippy::module_inception)]
mod executor;

#[cfg(test)]
pub mod mock;

pub use caching::CachingExecutor;
pub use executor::{BatchResult, Executor, ResultHandler, Row, RowStream};

#[cfg(test)]
pub use executor::MockResultHandler;
