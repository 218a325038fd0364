//! Statement domain - statement metadata, parameters and pagination

mod param;
#[allow(clippy::module_inception)]
mod statement;

pub use param::{ParamValue, ParameterObject};
pub use statement::{
    BoundStatement, KeyGeneration, ParameterMapping, ParameterMode, RowBounds, SqlCommandType,
    Statement, StatementType,
};
