//! Turns a client request body into a typed, validated `QueryRequest`.

pub mod ast;
pub mod validator;

pub use ast::{DateRange, Filter, QueryRequest, Selection, Sort, SortDirection, CPI};
pub use validator::{OrderBy, RequestBody, ValidationError};
