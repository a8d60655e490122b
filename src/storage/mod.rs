//! Storage layer implementation
//!
//! In-memory tables, secondary indexes, and the engine that names them

pub mod engine;
pub mod index;
pub mod table;

pub use engine::StorageEngine;
pub use index::{Index, IndexKind};
pub use table::Table;
