//! WrenDB
//!
//! A single-process, in-memory relational store driven by a small SQL
//! dialect: `CREATE TABLE`, `DROP TABLE`, `INSERT`, `SELECT`, and
//! conditional `UPDATE` / `DELETE`.
//!
//! ## Architecture
//! - SQL layer: Lexer (statement text to tokens), Parser (tokens to a
//!   statement), Executor (statement to a `QueryResult`)
//! - Storage layer: `StorageEngine` (table namespace), `Table` (rows and
//!   per-table locking), `Index` (hash and ordered variants)
//!
//! All state lives in process memory and vanishes with the engine. Every
//! statement is atomic: on failure it reports an error in the
//! `QueryResult` and leaves storage unchanged.

pub mod config;
pub mod sql;
pub mod storage;
pub mod types;

mod error;

pub use config::EngineConfig;
pub use error::{DbError, Result};

// Primary public API
pub use sql::{execute_sql, QueryExecutor, QueryResult};
pub use storage::{Index, IndexKind, StorageEngine, Table};
pub use types::{Column, DataType, Row, RowId, TableSchema, Value};
