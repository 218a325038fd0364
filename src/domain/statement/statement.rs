//! Mapped statement metadata consumed by the caching executor

use super::{ParamValue, ParameterObject};
use crate::domain::cache::NamedCache;
use crate::domain::DomainError;

/// How the engine issues the statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    /// Plain statement, no bind parameters
    Simple,
    /// Prepared statement with bind parameters
    #[default]
    Prepared,
    /// Stored procedure call
    Callable,
}

/// What the statement does to the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlCommandType {
    Select,
    Insert,
    Update,
    Delete,
}

impl SqlCommandType {
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select)
    }
}

/// Direction of a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
}

/// Maps a statement placeholder to a property of the parameter object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMapping {
    pub property: String,
    pub mode: ParameterMode,
}

impl ParameterMapping {
    pub fn input(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::In,
        }
    }

    pub fn output(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::Out,
        }
    }

    pub fn in_out(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::InOut,
        }
    }
}

/// Primary-key generation hook attached to a statement.
///
/// Only the engine acts on it; `None` is the no-op default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyGeneration {
    #[default]
    None,
    /// Keys read back from the driver after execution
    Generated { key_properties: Vec<String> },
    /// Keys produced by a separate statement, before or after the main one
    SelectKey { statement_id: String, before: bool },
}

/// Pagination window applied to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub offset: usize,
    pub limit: usize,
}

impl RowBounds {
    pub const NO_ROW_OFFSET: usize = 0;
    pub const NO_ROW_LIMIT: usize = i32::MAX as usize;
    pub const DEFAULT: RowBounds = RowBounds {
        offset: Self::NO_ROW_OFFSET,
        limit: Self::NO_ROW_LIMIT,
    };

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for RowBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A configured statement
#[derive(Debug, Clone)]
pub struct Statement {
    pub id: String,
    pub sql: String,
    pub statement_type: StatementType,
    pub command_type: SqlCommandType,
    pub cache: Option<NamedCache>,
    pub use_cache: bool,
    pub flush_cache_required: bool,
    pub parameter_mappings: Vec<ParameterMapping>,
    pub key_generation: KeyGeneration,
}

impl Statement {
    /// Creates a statement with the defaults for its command type: selects use
    /// the cache and never flush it, everything else flushes and skips it.
    pub fn new(
        id: impl Into<String>,
        command_type: SqlCommandType,
        sql: impl Into<String>,
    ) -> Self {
        let is_select = command_type.is_select();

        Self {
            id: id.into(),
            sql: sql.into(),
            statement_type: StatementType::default(),
            command_type,
            cache: None,
            use_cache: is_select,
            flush_cache_required: !is_select,
            parameter_mappings: Vec::new(),
            key_generation: KeyGeneration::None,
        }
    }

    pub fn select(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(id, SqlCommandType::Select, sql)
    }

    pub fn insert(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(id, SqlCommandType::Insert, sql)
    }

    pub fn update(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(id, SqlCommandType::Update, sql)
    }

    pub fn delete(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(id, SqlCommandType::Delete, sql)
    }

    pub fn with_cache(mut self, cache: NamedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_flush_cache(mut self, flush: bool) -> Self {
        self.flush_cache_required = flush;
        self
    }

    pub fn with_statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = statement_type;
        self
    }

    pub fn with_parameter(mut self, mapping: ParameterMapping) -> Self {
        self.parameter_mappings.push(mapping);
        self
    }

    /// Whether any mapping writes back to the parameter object
    pub fn has_output_parameters(&self) -> bool {
        self.parameter_mappings
            .iter()
            .any(|mapping| mapping.mode != ParameterMode::In)
    }

    /// Resolves every mapping against the parameter object.
    ///
    /// Output-only mappings have nothing to read and bind as `Null`.
    pub fn bind(&self, parameters: &ParameterObject) -> Result<BoundStatement, DomainError> {
        let values = self
            .parameter_mappings
            .iter()
            .map(|mapping| match mapping.mode {
                ParameterMode::Out => Ok(ParamValue::Null),
                ParameterMode::In | ParameterMode::InOut => parameters.resolve(&mapping.property),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BoundStatement {
            sql: self.sql.clone(),
            parameter_mappings: self.parameter_mappings.clone(),
            values,
        })
    }
}

/// SQL text with its parameter values resolved, one value per mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStatement {
    pub sql: String,
    pub parameter_mappings: Vec<ParameterMapping>,
    pub values: Vec<ParamValue>,
}

impl BoundStatement {
    /// Values the statement reads, in placeholder order
    pub fn input_values(&self) -> impl Iterator<Item = &ParamValue> {
        self.parameter_mappings
            .iter()
            .zip(&self.values)
            .filter(|(mapping, _)| mapping.mode != ParameterMode::Out)
            .map(|(_, value)| value)
    }
}
