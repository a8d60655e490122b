/// Lightweight SQL engine
///
/// Architecture:
/// - Lexer: Tokenizes SQL strings
/// - Parser: Builds statements from tokens
/// - Executor: Executes statements using the storage engine

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod executor;

pub use token::{Token, TokenKind};
pub use lexer::Lexer;
pub use ast::{
    Assignment, CompareOp, Comparison, Condition, Connector, CreateTableStmt, DeleteStmt,
    DropTableStmt, InsertStmt, Projection, SelectStmt, Statement, UpdateStmt,
};
pub use parser::Parser;
pub use executor::{QueryExecutor, QueryResult};

use std::sync::Arc;

use crate::storage::StorageEngine;

/// Parse and execute a SQL statement. Never fails outward: lexer, parser
/// and executor problems all come back as a result with `success == false`.
pub fn execute_sql(engine: Arc<StorageEngine>, sql: &str) -> QueryResult {
    let mut lexer = Lexer::new(sql);
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens);
    let statement = match parser.parse() {
        Ok(statement) => statement,
        Err(err) => return QueryResult::from(err),
    };
    let executor = QueryExecutor::new(engine);
    executor.execute(statement)
}
