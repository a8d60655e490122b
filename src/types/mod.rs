//! Core data vocabulary: typed values, column types, rows.

mod schema;

pub use schema::{Column, TableSchema};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single typed cell value.
///
/// Doubles order and compare by [`f64::total_cmp`], so every pair of values
/// of the same type has a defined ordering and equality is exact on the bit
/// pattern. Values of different types never compare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Double(f64),

    /// UTF-8 string
    Text(String),

    /// Boolean
    Boolean(bool),

    /// Absent value
    Null,
}

impl Value {
    /// Type of this value, or `None` for the null marker.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Integer(_) => Some(DataType::Integer),
            Value::Double(_) => Some(DataType::Double),
            Value::Text(_) => Some(DataType::Text),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Null => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.data_type() {
            Some(dt) => dt.name(),
            None => "Null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of `data_type`.
    ///
    /// The null marker matches no type; nullability is a separate check.
    pub fn matches_type(&self, data_type: DataType) -> bool {
        self.data_type() == Some(data_type)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Boolean(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl PartialOrd for Value {
    /// Same-type values always order; mixed types do not. Note that this
    /// makes null equal to null, consistent with `PartialEq`; condition
    /// evaluation rejects null operands before ever comparing.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => Some(a.total_cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Null => write!(f, "NULL"),
        }
    }
}

/// Column type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Double,
    Text,
    Boolean,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "Integer",
            DataType::Double => "Double",
            DataType::Text => "Text",
            DataType::Boolean => "Boolean",
        }
    }

    /// Maps a SQL type name to its tag. Accepts the usual aliases,
    /// case-insensitively: INT/INTEGER, DOUBLE/FLOAT, VARCHAR/STRING/TEXT,
    /// BOOLEAN/BOOL.
    pub fn from_name(name: &str) -> Option<DataType> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Some(DataType::Integer),
            "DOUBLE" | "FLOAT" => Some(DataType::Double),
            "VARCHAR" | "STRING" | "TEXT" => Some(DataType::Text),
            "BOOLEAN" | "BOOL" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored row: one value per schema column, in schema order.
pub type Row = Vec<Value>;

/// Row identifier, unique within a table for its whole lifetime.
pub type RowId = u64;
