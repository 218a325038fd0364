use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{BatchResult, Executor, ResultHandler, Row, RowStream};
use crate::domain::cache::CacheKey;
use crate::domain::statement::{ParameterObject, RowBounds, Statement};
use crate::domain::DomainError;

/// Executor that serves canned rows and records every call
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    results: HashMap<String, Vec<Row>>,
    failures: HashSet<String>,
    environment_id: Option<String>,
    fail_close: bool,
    fail_commit: bool,
    fail_rollback: bool,
    key_requests: AtomicUsize,
    pub queries: Vec<String>,
    pub cursors: Vec<String>,
    pub updates: Vec<String>,
    pub commits: Vec<bool>,
    pub rollbacks: Vec<bool>,
    pub closed: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, statement_id: &str, rows: Vec<Row>) -> Self {
        self.results.insert(statement_id.to_string(), rows);
        self
    }

    pub fn with_failure(mut self, statement_id: &str) -> Self {
        self.failures.insert(statement_id.to_string());
        self
    }

    pub fn with_environment(mut self, environment_id: &str) -> Self {
        self.environment_id = Some(environment_id.to_string());
        self
    }

    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn with_failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn key_requests(&self) -> usize {
        self.key_requests.load(Ordering::SeqCst)
    }

    pub fn query_count(&self, statement_id: &str) -> usize {
        self.queries.iter().filter(|id| *id == statement_id).count()
    }

    fn rows_for(&self, statement: &Statement, bounds: RowBounds) -> Result<Vec<Row>, DomainError> {
        if self.closed {
            return Err(DomainError::Closed);
        }

        if self.failures.contains(&statement.id) {
            return Err(DomainError::execution(&statement.id, "simulated failure"));
        }

        Ok(self
            .results
            .get(&statement.id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .skip(bounds.offset)
            .take(bounds.limit)
            .collect())
    }
}

/// Builds a single-column row
pub fn row(column: &str, value: impl Into<serde_json::Value>) -> Row {
    let mut row = Row::new();
    row.insert(column.to_string(), value.into());
    row
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn query(
        &mut self,
        statement: &Statement,
        _parameters: &ParameterObject,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>, DomainError> {
        let rows = self.rows_for(statement, bounds)?;
        self.queries.push(statement.id.clone());

        match handler {
            Some(handler) => {
                for row in rows {
                    handler.handle_row(row);
                }
                Ok(Vec::new())
            }
            None => Ok(rows),
        }
    }

    async fn query_cursor(
        &mut self,
        statement: &Statement,
        _parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<RowStream, DomainError> {
        let rows = self.rows_for(statement, bounds)?;
        self.cursors.push(statement.id.clone());
        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
    }

    async fn update(
        &mut self,
        statement: &Statement,
        _parameters: &ParameterObject,
    ) -> Result<u64, DomainError> {
        if self.failures.contains(&statement.id) {
            return Err(DomainError::execution(&statement.id, "simulated failure"));
        }
        self.updates.push(statement.id.clone());
        Ok(1)
    }

    async fn flush_statements(&mut self) -> Result<Vec<BatchResult>, DomainError> {
        Ok(Vec::new())
    }

    async fn commit(&mut self, required: bool) -> Result<(), DomainError> {
        self.commits.push(required);
        if self.fail_commit {
            return Err(DomainError::internal("commit rejected"));
        }
        Ok(())
    }

    async fn rollback(&mut self, required: bool) -> Result<(), DomainError> {
        self.rollbacks.push(required);
        if self.fail_rollback {
            return Err(DomainError::internal("rollback rejected"));
        }
        Ok(())
    }

    async fn close(&mut self, _force_rollback: bool) -> Result<(), DomainError> {
        self.closed = true;
        if self.fail_close {
            return Err(DomainError::internal("connection already gone"));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn environment_id(&self) -> Option<&str> {
        self.environment_id.as_deref()
    }

    fn create_cache_key(
        &self,
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
    ) -> Result<CacheKey, DomainError> {
        self.key_requests.fetch_add(1, Ordering::SeqCst);
        if self.closed {
            return Err(DomainError::Closed);
        }
        CacheKey::for_statement(statement, parameters, bounds, self.environment_id())
    }

    fn is_cached(&self, _statement: &Statement, _key: &CacheKey) -> bool {
        false
    }

    fn clear_local_cache(&mut self) {}
}
