//! Table metadata: column definitions and row validation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::types::{DataType, Value};

/// Column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    /// Whether the null marker may be stored here.
    pub nullable: bool,
    /// Primary key columns are non-nullable and unique.
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Ordered column list for one table, with a name lookup map.
///
/// The schema is fixed at table creation; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
    /// Column name -> position. Rebuilt after deserialization.
    #[serde(skip)]
    column_map: AHashMap<String, usize>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut schema = Self {
            name: name.into(),
            columns,
            column_map: AHashMap::new(),
        };
        schema.rebuild_column_map();
        schema
    }

    /// Rebuild the name lookup map (needed after deserialization, which
    /// skips it). On duplicate names the first occurrence wins.
    pub fn rebuild_column_map(&mut self) {
        self.column_map.clear();
        for (position, column) in self.columns.iter().enumerate() {
            self.column_map.entry(column.name.clone()).or_insert(position);
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.get_column_position(name).map(|pos| &self.columns[pos])
    }

    pub fn get_column_position(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Check a row against the schema: arity, null constraints, and exact
    /// type tags. No coercion; an integer is not accepted for a double
    /// column.
    pub fn validate_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DbError::ArityMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }

        for (column, value) in self.columns.iter().zip(row) {
            if value.is_null() {
                if !column.nullable {
                    return Err(DbError::NullViolation(column.name.clone()));
                }
                continue;
            }
            if !value.matches_type(column.data_type) {
                return Err(DbError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type.name(),
                    found: value.type_name(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(),
                Column::new("name", DataType::Text).not_null(),
                Column::new("score", DataType::Double),
            ],
        )
    }

    #[test]
    fn test_column_builder() {
        let col = Column::new("id", DataType::Integer).primary_key();
        assert!(col.primary_key);
        assert!(!col.nullable);

        let col = Column::new("name", DataType::Text);
        assert!(col.nullable);
        assert!(!col.primary_key);
    }

    #[test]
    fn test_lookup() {
        let schema = users_schema();
        assert_eq!(schema.column_count(), 3);
        assert_eq!(schema.get_column_position("name"), Some(1));
        assert_eq!(schema.get_column_position("missing"), None);
        assert_eq!(
            schema.get_column("score").map(|c| c.data_type),
            Some(DataType::Double)
        );
        assert_eq!(
            schema.primary_key_columns().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["id"]
        );
    }

    #[test]
    fn test_validate_row_ok() {
        let schema = users_schema();
        let row = vec![
            Value::Integer(1),
            Value::Text("ada".into()),
            Value::Null,
        ];
        assert!(schema.validate_row(&row).is_ok());
    }

    #[test]
    fn test_validate_row_arity() {
        let schema = users_schema();
        let err = schema.validate_row(&[Value::Integer(1)]).unwrap_err();
        assert_eq!(err, DbError::ArityMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn test_validate_row_null_constraint() {
        let schema = users_schema();
        let row = vec![Value::Integer(1), Value::Null, Value::Null];
        assert_eq!(
            schema.validate_row(&row).unwrap_err(),
            DbError::NullViolation("name".into())
        );
    }

    #[test]
    fn test_validate_row_no_coercion() {
        let schema = users_schema();
        // integer literal into a double column is a type error
        let row = vec![
            Value::Integer(1),
            Value::Text("ada".into()),
            Value::Integer(10),
        ];
        assert_eq!(
            schema.validate_row(&row).unwrap_err(),
            DbError::TypeMismatch {
                column: "score".into(),
                expected: "Double",
                found: "Integer",
            }
        );
    }

    #[test]
    fn test_duplicate_column_name_resolves_to_first() {
        let schema = TableSchema::new(
            "t",
            vec![
                Column::new("a", DataType::Integer),
                Column::new("a", DataType::Text),
            ],
        );
        assert_eq!(schema.get_column_position("a"), Some(0));
    }
}
