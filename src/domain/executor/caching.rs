//! Second-level cache decorator over an executor

use async_trait::async_trait;
use tracing::debug;

use super::{BatchResult, Executor, ResultHandler, Row, RowStream};
use crate::domain::cache::{CacheCoordinator, CacheKey};
use crate::domain::statement::{ParameterObject, RowBounds, Statement, StatementType};
use crate::domain::DomainError;

/// Executor wrapper that serves queries from the statements' named caches.
///
/// Cache writes and flushes are staged in a [`CacheCoordinator`] and only
/// reach the shared caches when the transaction commits.
#[derive(Debug)]
pub struct CachingExecutor<E: Executor> {
    delegate: E,
    coordinator: CacheCoordinator,
}

impl<E: Executor> CachingExecutor<E> {
    pub fn new(delegate: E) -> Self {
        Self {
            delegate,
            coordinator: CacheCoordinator::new(),
        }
    }

    pub fn delegate(&self) -> &E {
        &self.delegate
    }

    pub fn coordinator(&self) -> &CacheCoordinator {
        &self.coordinator
    }

    fn flush_cache_if_required(&mut self, statement: &Statement) {
        if let Some(cache) = &statement.cache {
            if statement.flush_cache_required {
                self.coordinator.clear(cache);
            }
        }
    }

    fn ensure_no_out_params(statement: &Statement) -> Result<(), DomainError> {
        if statement.statement_type == StatementType::Callable && statement.has_output_parameters() {
            return Err(DomainError::configuration(format!(
                "Caching stored procedures with OUT params is not supported. Please configure use_cache = false in '{}'",
                statement.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Executor> Executor for CachingExecutor<E> {
    async fn query(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>, DomainError> {
        self.flush_cache_if_required(statement);

        let Some(cache) = &statement.cache else {
            return self.delegate.query(statement, parameters, bounds, handler).await;
        };

        if !statement.use_cache || handler.is_some() {
            debug!(statement = %statement.id, "Bypassing second-level cache");
            return self.delegate.query(statement, parameters, bounds, handler).await;
        }

        Self::ensure_no_out_params(statement)?;

        let key = self.delegate.create_cache_key(statement, parameters, bounds)?;

        if let Some(rows) = self.coordinator.get::<Vec<Row>>(cache, &key).await? {
            debug!(statement = %statement.id, cache = cache.id(), "Cache hit");
            return Ok(rows);
        }

        debug!(statement = %statement.id, cache = cache.id(), "Cache miss");
        let rows = self.delegate.query(statement, parameters, bounds, None).await?;
        self.coordinator.put(cache, key, &rows)?;

        Ok(rows)
    }

    async fn query_cursor(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<RowStream, DomainError> {
        self.flush_cache_if_required(statement);
        self.delegate.query_cursor(statement, parameters, bounds).await
    }

    async fn update(
        &mut self,
        statement: &Statement,
        parameters: &ParameterObject,
    ) -> Result<u64, DomainError> {
        self.flush_cache_if_required(statement);
        self.delegate.update(statement, parameters).await
    }

    async fn flush_statements(&mut self) -> Result<Vec<BatchResult>, DomainError> {
        self.delegate.flush_statements().await
    }

    async fn commit(&mut self, required: bool) -> Result<(), DomainError> {
        self.delegate.commit(required).await?;
        self.coordinator.commit_all().await
    }

    async fn rollback(&mut self, required: bool) -> Result<(), DomainError> {
        let result = self.delegate.rollback(required).await;
        if required {
            self.coordinator.rollback_all();
        }
        result
    }

    async fn close(&mut self, force_rollback: bool) -> Result<(), DomainError> {
        let cache_result = if force_rollback {
            self.coordinator.rollback_all();
            Ok(())
        } else {
            self.coordinator.commit_all().await
        };

        self.delegate.close(force_rollback).await?;
        cache_result
    }

    fn is_closed(&self) -> bool {
        self.delegate.is_closed()
    }

    fn environment_id(&self) -> Option<&str> {
        self.delegate.environment_id()
    }

    fn create_cache_key(
        &self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<CacheKey, DomainError> {
        self.delegate.create_cache_key(statement, parameters, bounds)
    }

    fn is_cached(&self, statement: &Statement, key: &CacheKey) -> bool {
        self.delegate.is_cached(statement, key)
    }

    fn clear_local_cache(&mut self) {
        self.delegate.clear_local_cache();
    }
}
