//! Storage module for buncher
//! Describes the `dataset` table, the cells read back from it, and the connection pool.

pub mod data;
pub mod pool;
pub mod schema;

pub use data::{Record, Scalar};
pub use pool::connect;
pub use schema::{Column, Dimension, TABLE_NAME};
