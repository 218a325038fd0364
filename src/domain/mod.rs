//! Domain layer - cache keys, transactional staging and the caching executor

pub mod cache;
pub mod error;
pub mod executor;
pub mod statement;

pub use cache::{Cache, CacheCoordinator, CacheExt, CacheKey, NamedCache, StagedCacheView};
pub use error::DomainError;
pub use executor::{BatchResult, CachingExecutor, Executor, ResultHandler, Row, RowStream};
pub use statement::{
    BoundStatement, KeyGeneration, ParamValue, ParameterMapping, ParameterMode, ParameterObject,
    RowBounds, SqlCommandType, Statement, StatementType,
};
