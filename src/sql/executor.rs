//! Query executor - runs parsed statements against the storage engine

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::sql::ast::{
    CreateTableStmt, DeleteStmt, DropTableStmt, InsertStmt, SelectStmt, Statement, UpdateStmt,
};
use crate::storage::{StorageEngine, Table};
use crate::types::{Column, Row, Value};

/// Outcome of a single statement.
///
/// `success == false` implies `columns` and `rows` are empty and `message`
/// carries the error text. Successful mutations carry no rows; their
/// `message` is a row-count confirmation or a DDL acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub success: bool,
    pub message: String,
}

impl QueryResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            success: true,
            message: message.into(),
        }
    }

    pub fn with_rows(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            success: true,
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            success: false,
            message: message.into(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

impl From<DbError> for QueryResult {
    fn from(err: DbError) -> Self {
        Self::error(err.to_string())
    }
}

/// Dispatches parsed statements to the matching engine or table operation.
pub struct QueryExecutor {
    engine: Arc<StorageEngine>,
}

impl QueryExecutor {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Run one statement to completion. Failures come back inside the
    /// result, never as a propagated fault; a failing statement leaves all
    /// storage state unchanged.
    pub fn execute(&self, stmt: Statement) -> QueryResult {
        let outcome = match stmt {
            Statement::CreateTable(c) => self.execute_create_table(c),
            Statement::DropTable(d) => self.execute_drop_table(d),
            Statement::Insert(i) => self.execute_insert(i),
            Statement::Select(s) => self.execute_select(s),
            Statement::Update(u) => self.execute_update(u),
            Statement::Delete(d) => self.execute_delete(d),
        };
        outcome.unwrap_or_else(QueryResult::from)
    }

    fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.engine
            .get_table(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    fn execute_create_table(&self, stmt: CreateTableStmt) -> Result<QueryResult> {
        self.engine.create_table(&stmt.table, stmt.columns)?;
        Ok(QueryResult::ok(format!("Table '{}' created", stmt.table)))
    }

    fn execute_drop_table(&self, stmt: DropTableStmt) -> Result<QueryResult> {
        self.engine.drop_table(&stmt.table)?;
        Ok(QueryResult::ok(format!("Table '{}' dropped", stmt.table)))
    }

    fn execute_insert(&self, stmt: InsertStmt) -> Result<QueryResult> {
        let table = self.table(&stmt.table)?;
        table.insert(stmt.values)?;
        Ok(QueryResult::ok("1 row inserted"))
    }

    fn execute_select(&self, stmt: SelectStmt) -> Result<QueryResult> {
        let table = self.table(&stmt.table)?;
        let (columns, rows) = table.select(&stmt.projection, stmt.where_clause.as_ref())?;
        Ok(QueryResult::with_rows(columns, rows))
    }

    fn execute_update(&self, stmt: UpdateStmt) -> Result<QueryResult> {
        let table = self.table(&stmt.table)?;
        let assignments: Vec<(String, Value)> = stmt
            .assignments
            .into_iter()
            .map(|a| (a.column, a.value))
            .collect();
        let updated = table.update_where(stmt.where_clause.as_ref(), &assignments)?;
        Ok(QueryResult::ok(format!("{} row(s) updated", updated)))
    }

    fn execute_delete(&self, stmt: DeleteStmt) -> Result<QueryResult> {
        let table = self.table(&stmt.table)?;
        let deleted = table.delete_where(stmt.where_clause.as_ref())?;
        Ok(QueryResult::ok(format!("{} row(s) deleted", deleted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::execute_sql;

    fn engine() -> Arc<StorageEngine> {
        Arc::new(StorageEngine::new())
    }

    fn run(engine: &Arc<StorageEngine>, sql: &str) -> QueryResult {
        execute_sql(engine.clone(), sql)
    }

    fn run_ok(engine: &Arc<StorageEngine>, sql: &str) -> QueryResult {
        let result = run(engine, sql);
        assert!(result.success, "{}: {}", sql, result.message);
        result
    }

    #[test]
    fn test_create_insert_select_round() {
        let engine = engine();

        let created = run_ok(&engine, "CREATE TABLE users (id INTEGER, name VARCHAR)");
        assert_eq!(created.message, "Table 'users' created");

        let inserted = run_ok(&engine, "INSERT INTO users VALUES (1, 'Alice')");
        assert_eq!(inserted.message, "1 row inserted");

        let selected = run_ok(&engine, "SELECT * FROM users");
        assert_eq!(selected.column_names(), vec!["id", "name"]);
        assert_eq!(
            selected.rows,
            vec![vec![Value::Integer(1), Value::Text("Alice".into())]]
        );
        assert_eq!(selected.row_count(), 1);
    }

    #[test]
    fn test_select_missing_table_reports_does_not_exist() {
        let result = run(&engine(), "SELECT * FROM ghost");
        assert!(!result.success);
        assert!(result.columns.is_empty() && result.rows.is_empty());
        assert!(result.message.contains("does not exist"));
    }

    #[test]
    fn test_duplicate_create_reports_already_exists() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT)");

        let second = run(&engine, "CREATE TABLE t (a INT)");
        assert!(!second.success);
        assert!(second.message.contains("already exists"));
        assert_eq!(engine.table_names(), vec!["t"]);
    }

    #[test]
    fn test_range_query_uses_table_order() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT)");
        engine
            .get_table("t")
            .unwrap()
            .create_index("a", crate::storage::IndexKind::Ordered)
            .unwrap();

        for sql in [
            "INSERT INTO t VALUES (1)",
            "INSERT INTO t VALUES (5)",
            "INSERT INTO t VALUES (9)",
        ] {
            run_ok(&engine, sql);
        }

        let result = run_ok(&engine, "SELECT * FROM t WHERE a >= 5");
        assert_eq!(
            result.rows,
            vec![vec![Value::Integer(5)], vec![Value::Integer(9)]]
        );
    }

    #[test]
    fn test_update_returns_row_count_confirmation() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT, b VARCHAR)");
        run_ok(&engine, "INSERT INTO t VALUES (1, 'x')");
        run_ok(&engine, "INSERT INTO t VALUES (2, 'y')");

        let updated = run_ok(&engine, "UPDATE t SET b = 'z' WHERE a = 1");
        assert_eq!(updated.message, "1 row(s) updated");
        assert!(updated.rows.is_empty());

        let all = run_ok(&engine, "UPDATE t SET b = 'w'");
        assert_eq!(all.message, "2 row(s) updated");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT)");
        run_ok(&engine, "INSERT INTO t VALUES (1)");
        run_ok(&engine, "INSERT INTO t VALUES (2)");

        let first = run_ok(&engine, "DELETE FROM t WHERE a = 1");
        assert_eq!(first.message, "1 row(s) deleted");

        let second = run_ok(&engine, "DELETE FROM t WHERE a = 1");
        assert_eq!(second.message, "0 row(s) deleted");
    }

    #[test]
    fn test_drop_table_discards_rows() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT)");
        run_ok(&engine, "INSERT INTO t VALUES (1)");

        let dropped = run_ok(&engine, "DROP TABLE t");
        assert_eq!(dropped.message, "Table 't' dropped");

        let gone = run(&engine, "SELECT * FROM t");
        assert!(!gone.success);
        assert!(gone.message.contains("does not exist"));
    }

    #[test]
    fn test_parse_error_is_reported_not_propagated() {
        let engine = engine();
        let result = run(&engine, "SELECT FROM");
        assert!(!result.success);
        assert!(result.message.contains("Syntax error"));

        let invalid = run(&engine, "FROBNICATE ALL THE THINGS");
        assert!(!invalid.success);
        assert!(invalid.message.contains("Unsupported SQL statement"));
    }

    #[test]
    fn test_insert_type_mismatch_leaves_table_unchanged() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT, b VARCHAR)");

        let bad = run(&engine, "INSERT INTO t VALUES ('oops', 'x')");
        assert!(!bad.success);
        assert!(bad.message.contains("Type mismatch"));

        let bad_arity = run(&engine, "INSERT INTO t VALUES (1)");
        assert!(!bad_arity.success);
        assert!(bad_arity.message.contains("Column count mismatch"));

        assert_eq!(run_ok(&engine, "SELECT * FROM t").row_count(), 0);
    }

    #[test]
    fn test_condition_type_mismatch_aborts_statement() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT)");
        run_ok(&engine, "INSERT INTO t VALUES (1)");

        let result = run(&engine, "SELECT * FROM t WHERE a = 'one'");
        assert!(!result.success);
        assert!(result.message.contains("Type mismatch"));
    }

    #[test]
    fn test_projection_and_condition_chain() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE people (id INT, name VARCHAR, age INT)");
        run_ok(&engine, "INSERT INTO people VALUES (1, 'Ann', 30)");
        run_ok(&engine, "INSERT INTO people VALUES (2, 'Ben', 41)");
        run_ok(&engine, "INSERT INTO people VALUES (3, 'Cal', 41)");

        let result = run_ok(
            &engine,
            "SELECT name, id FROM people WHERE age = 41 AND id <> 3",
        );
        assert_eq!(result.column_names(), vec!["name", "id"]);
        assert_eq!(
            result.rows,
            vec![vec![Value::Text("Ben".into()), Value::Integer(2)]]
        );

        let ghost = run(&engine, "SELECT nope FROM people");
        assert!(!ghost.success);
        assert!(ghost.message.contains("does not exist"));
    }

    #[test]
    fn test_primary_key_enforced_through_sql() {
        let engine = engine();
        run_ok(
            &engine,
            "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR)",
        );
        run_ok(&engine, "INSERT INTO users VALUES (1, 'Alice')");

        let dup = run(&engine, "INSERT INTO users VALUES (1, 'Bob')");
        assert!(!dup.success);
        assert!(dup.message.contains("Duplicate value"));

        let null_key = run(&engine, "INSERT INTO users VALUES (NULL, 'Carol')");
        assert!(!null_key.success);
        assert!(null_key.message.contains("cannot be null"));

        assert_eq!(run_ok(&engine, "SELECT * FROM users").row_count(), 1);
    }

    #[test]
    fn test_null_literal_and_null_comparisons() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT, b VARCHAR)");
        run_ok(&engine, "INSERT INTO t VALUES (1, NULL)");
        run_ok(&engine, "INSERT INTO t VALUES (2, 'x')");

        // null never matches, not even against an explicit NULL literal
        let eq_null = run_ok(&engine, "SELECT * FROM t WHERE b = NULL");
        assert_eq!(eq_null.row_count(), 0);
        let ne_null = run_ok(&engine, "SELECT * FROM t WHERE b <> NULL");
        assert_eq!(ne_null.row_count(), 0);

        let concrete = run_ok(&engine, "SELECT a FROM t WHERE b = 'x'");
        assert_eq!(concrete.rows, vec![vec![Value::Integer(2)]]);
    }

    #[test]
    fn test_or_chain_evaluates_left_to_right() {
        let engine = engine();
        run_ok(&engine, "CREATE TABLE t (a INT, b INT)");
        run_ok(&engine, "INSERT INTO t VALUES (1, 10)");
        run_ok(&engine, "INSERT INTO t VALUES (2, 20)");
        run_ok(&engine, "INSERT INTO t VALUES (3, 20)");

        // (a = 1 OR a = 2) AND b = 20, not a = 1 OR (a = 2 AND b = 20)
        let result = run_ok(&engine, "SELECT a FROM t WHERE a = 1 OR a = 2 AND b = 20");
        assert_eq!(result.rows, vec![vec![Value::Integer(2)]]);
    }
}
