//! SQL parser: converts tokens into statements.
//!
//! Recursive descent over the token stream. Dispatch is on the first
//! token's kind; each grammar violation reports the construct that was
//! expected. Literals fold to [`Value`]s here, so malformed numerals are
//! parse errors rather than runtime surprises.

use super::ast::*;
use super::token::{Token, TokenKind};
use crate::error::{DbError, Result};
use crate::types::{Column, DataType, Value};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // the lexer always ends with Eof; guard hand-built token lists
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 0));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse one statement. A trailing semicolon is consumed if present;
    /// anything after it is ignored.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = match self.current().kind {
            TokenKind::Eof => return Err(DbError::Syntax("Empty query".into())),
            TokenKind::Create => Statement::CreateTable(self.parse_create_table()?),
            TokenKind::Drop => Statement::DropTable(self.parse_drop_table()?),
            TokenKind::Insert => Statement::Insert(self.parse_insert()?),
            TokenKind::Select => Statement::Select(self.parse_select()?),
            TokenKind::Update => Statement::Update(self.parse_update()?),
            TokenKind::Delete => Statement::Delete(self.parse_delete()?),
            _ => return Err(DbError::Syntax("Unsupported SQL statement".into())),
        };

        self.match_token(TokenKind::Semicolon);

        Ok(stmt)
    }

    /// `CREATE TABLE name ( col type [NOT NULL] [PRIMARY KEY], ... )`
    fn parse_create_table(&mut self) -> Result<CreateTableStmt> {
        self.expect(TokenKind::Create, "CREATE keyword")?;
        self.expect(TokenKind::Table, "TABLE keyword")?;
        let table = self.parse_identifier("table name")?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen, "')'")?;

        Ok(CreateTableStmt { table, columns })
    }

    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.parse_identifier("column name")?;

        if self.current().kind != TokenKind::Identifier {
            return Err(DbError::Syntax("Expected column type".into()));
        }
        let type_name = self.current().text.clone();
        self.advance();
        let data_type = DataType::from_name(&type_name)
            .ok_or(DbError::UnknownType(type_name))?;

        let mut column = Column::new(name, data_type);
        loop {
            if self.match_token(TokenKind::Not) {
                self.expect(TokenKind::Null, "NULL after NOT")?;
                column = column.not_null();
            } else if self.match_token(TokenKind::Primary) {
                self.expect(TokenKind::Key, "KEY after PRIMARY")?;
                column = column.primary_key();
            } else {
                break;
            }
        }

        Ok(column)
    }

    /// `DROP TABLE name`
    fn parse_drop_table(&mut self) -> Result<DropTableStmt> {
        self.expect(TokenKind::Drop, "DROP keyword")?;
        self.expect(TokenKind::Table, "TABLE keyword")?;
        let table = self.parse_identifier("table name")?;

        Ok(DropTableStmt { table })
    }

    /// `INSERT INTO name VALUES ( literal, ... )`
    fn parse_insert(&mut self) -> Result<InsertStmt> {
        self.expect(TokenKind::Insert, "INSERT keyword")?;
        self.expect(TokenKind::Into, "INTO keyword")?;
        let table = self.parse_identifier("table name")?;
        self.expect(TokenKind::Values, "VALUES keyword")?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen, "')'")?;

        Ok(InsertStmt { table, values })
    }

    /// `SELECT ( * | col, ... ) FROM name [WHERE cond]`
    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect(TokenKind::Select, "SELECT keyword")?;

        let projection = if self.match_token(TokenKind::Star) {
            Projection::All
        } else {
            let mut columns = Vec::new();
            loop {
                columns.push(self.parse_identifier("column name")?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            Projection::Columns(columns)
        };

        self.expect(TokenKind::From, "FROM keyword")?;
        let table = self.parse_identifier("table name")?;
        let where_clause = self.parse_optional_where()?;

        Ok(SelectStmt {
            table,
            projection,
            where_clause,
        })
    }

    /// `UPDATE name SET col = literal, ... [WHERE cond]`
    fn parse_update(&mut self) -> Result<UpdateStmt> {
        self.expect(TokenKind::Update, "UPDATE keyword")?;
        let table = self.parse_identifier("table name")?;
        self.expect(TokenKind::Set, "SET keyword")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_identifier("column name")?;
            self.expect(TokenKind::Eq, "'='")?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let where_clause = self.parse_optional_where()?;

        Ok(UpdateStmt {
            table,
            assignments,
            where_clause,
        })
    }

    /// `DELETE FROM name [WHERE cond]`
    fn parse_delete(&mut self) -> Result<DeleteStmt> {
        self.expect(TokenKind::Delete, "DELETE keyword")?;
        self.expect(TokenKind::From, "FROM keyword")?;
        let table = self.parse_identifier("table name")?;
        let where_clause = self.parse_optional_where()?;

        Ok(DeleteStmt {
            table,
            where_clause,
        })
    }

    fn parse_optional_where(&mut self) -> Result<Option<Condition>> {
        if self.match_token(TokenKind::Where) {
            Ok(Some(self.parse_condition()?))
        } else {
            Ok(None)
        }
    }

    /// Comparison chain joined by AND/OR, strictly left to right.
    fn parse_condition(&mut self) -> Result<Condition> {
        let first = self.parse_comparison()?;
        let mut rest = Vec::new();

        loop {
            let connector = if self.match_token(TokenKind::And) {
                Connector::And
            } else if self.match_token(TokenKind::Or) {
                Connector::Or
            } else {
                break;
            };
            rest.push((connector, self.parse_comparison()?));
        }

        Ok(Condition { first, rest })
    }

    fn parse_comparison(&mut self) -> Result<Comparison> {
        let column = self.parse_identifier("column name")?;

        let op = match self.current().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Ge => CompareOp::Ge,
            _ => return Err(DbError::Syntax("Expected comparison operator".into())),
        };
        self.advance();

        let value = self.parse_literal()?;

        Ok(Comparison { column, op, value })
    }

    /// One literal value. Bare TRUE/FALSE fold to booleans and NULL to the
    /// null marker; any other bare word folds to text.
    fn parse_literal(&mut self) -> Result<Value> {
        let token = self.current().clone();
        let value = match token.kind {
            TokenKind::Number => Self::parse_number(&token.text)?,
            TokenKind::StringLiteral => Value::Text(token.text),
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Null => Value::Null,
            TokenKind::Identifier => Value::Text(token.text),
            _ => return Err(DbError::Syntax("Invalid value type".into())),
        };
        self.advance();

        Ok(value)
    }

    /// A numeral containing `.` is a double, otherwise an integer. Anything
    /// the numeric parsers reject (`1.2.3`, overflow) is a parse error.
    fn parse_number(text: &str) -> Result<Value> {
        let parsed = if text.contains('.') {
            text.parse::<f64>().map(Value::Double).ok()
        } else {
            text.parse::<i64>().map(Value::Integer).ok()
        };
        parsed.ok_or_else(|| DbError::Syntax(format!("Invalid number: {}", text)))
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String> {
        if self.current().kind == TokenKind::Identifier {
            let name = self.current().text.clone();
            self.advance();
            Ok(name)
        } else {
            Err(DbError::Syntax(format!("Expected {}", what)))
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.current().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(DbError::Syntax(format!("Expected {}", what)))
        }
    }
}
