//! Query module for buncher
//! Handles request validation, statement building, and execution.

pub mod executor;
pub mod parser;
pub mod planner;
pub mod statement;

pub use executor::{ExecutionConfig, ExecutionError, QueryExecutor};
pub use parser::{QueryRequest, RequestBody, ValidationError};
pub use planner::build;
pub use statement::Statement;
