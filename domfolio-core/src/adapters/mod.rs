//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for DomainStore and PriceTable
//! - An in-memory store with the same semantics, for tests and embedding
//! - The built-in sample price list

pub mod duckdb;
pub mod memory;
pub mod sample;
