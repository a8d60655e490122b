//! Statement forms produced by the parser.

use std::cmp::Ordering;

use crate::types::{Column, Value};

/// Top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStmt),
    DropTable(DropTableStmt),
    Insert(InsertStmt),
    Select(SelectStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub table: String,
    pub columns: Vec<Column>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    pub table: String,
}

/// INSERT statement; literals are folded to values during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub table: String,
    pub values: Vec<Value>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub table: String,
    pub projection: Projection,
    pub where_clause: Option<Condition>,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub table: String,
    pub where_clause: Option<Condition>,
}

/// Requested columns of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`: all columns in schema order
    All,
    /// Explicit column list, returned in the requested order
    Columns(Vec<String>),
}

/// `column = literal` in a SET list
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

/// WHERE predicate: comparisons joined left to right by AND/OR.
///
/// There is no precedence between the connectors and no grouping, so
/// `a OR b AND c` evaluates as `(a OR b) AND c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub first: Comparison,
    pub rest: Vec<(Connector, Comparison)>,
}

impl Condition {
    /// The single comparison of an unchained condition, if that is what
    /// this is. Compound conditions return `None`.
    pub fn single_comparison(&self) -> Option<&Comparison> {
        if self.rest.is_empty() {
            Some(&self.first)
        } else {
            None
        }
    }

    /// All comparisons in the chain, left to right.
    pub fn comparisons(&self) -> impl Iterator<Item = &Comparison> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, c)| c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// `column <op> literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    /// Whether an ordering between the row value and the literal satisfies
    /// this operator.
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}
