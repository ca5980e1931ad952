//! buncher - A query service over an advertising performance dataset
//!
//! This crate exposes a single HTTP endpoint that selects, filters, groups and
//! sorts rows of the `dataset` table, including the derived cost-per-install metric.

pub mod config;
pub mod metrics;
pub mod query;
pub mod server;
pub mod storage;
