use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

#[cfg(test)]
use mockall::automock;

use crate::domain::cache::CacheKey;
use crate::domain::statement::{ParameterObject, RowBounds, Statement};
use crate::domain::DomainError;

/// A result row keyed by column label
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Rows fetched lazily from an open cursor
pub type RowStream = Pin<Box<dyn Stream<Item = Result<Row, DomainError>> + Send>>;

/// Consumer for rows a query streams instead of returning
#[cfg_attr(test, automock)]
pub trait ResultHandler: Send {
    fn handle_row(&mut self, row: Row);
}

/// Outcome of one batched statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub statement_id: String,
    pub update_counts: Vec<u64>,
}

/// Statement-execution engine.
///
/// One executor serves one session; transaction boundaries are signaled through
/// `commit`, `rollback` and `close`.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Runs a query and returns its rows.
    ///
    /// When a handler is supplied the rows are pushed into it and the returned
    /// list is empty.
    async fn query(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>, DomainError>;

    /// Opens a cursor over the query results
    async fn query_cursor(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<RowStream, DomainError>;

    /// Runs an insert, update or delete and returns the affected row count
    async fn update(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
    ) -> Result<u64, DomainError>;

    /// Sends any batched statements to the database
    async fn flush_statements(&mut self) -> Result<Vec<BatchResult>, DomainError>;

    async fn commit(&mut self, required: bool) -> Result<(), DomainError>;

    async fn rollback(&mut self, required: bool) -> Result<(), DomainError>;

    async fn close(&mut self, force_rollback: bool) -> Result<(), DomainError>;

    fn is_closed(&self) -> bool;

    /// Identifier of the environment (database) this executor talks to
    fn environment_id(&self) -> Option<&str>;

    /// Builds the cache key for one statement invocation
    fn create_cache_key(
        &self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<CacheKey, DomainError> {
        if self.is_closed() {
            return Err(DomainError::Closed);
        }

        CacheKey::for_statement(statement, parameters, bounds, self.environment_id())
    }

    /// Whether the executor's session-local cache holds the key
    fn is_cached(&self, statement: &Statement, key: &CacheKey) -> bool;

    /// Drops the executor's session-local cache
    fn clear_local_cache(&mut self);
}
