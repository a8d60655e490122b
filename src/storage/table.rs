//! Table storage: a row arena with schema enforcement, per-column indexes,
//! and filtered reads and writes.
//!
//! Rows live in an arena keyed by a monotonically increasing row-id that is
//! never reused, so deleting a row cannot disturb any other row's identity.
//! All reads and writes on one table serialize behind a single mutex; index
//! maintenance happens inside the same critical section as the row change
//! it belongs to.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::{DbError, Result};
use crate::sql::ast::{CompareOp, Comparison, Condition, Connector, Projection};
use crate::storage::index::{Index, IndexKind};
use crate::types::{Column, Row, RowId, TableSchema, Value};

pub struct Table {
    schema: TableSchema,
    state: Mutex<TableState>,
}

struct TableState {
    rows: BTreeMap<RowId, Row>,
    indexes: AHashMap<String, Index>,
    next_row_id: RowId,
}

/// Row-ids a query will visit: everything, or a narrowed set from an index.
enum Candidates {
    All,
    Ids(BTreeSet<RowId>),
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            state: Mutex::new(TableState {
                rows: BTreeMap::new(),
                indexes: AHashMap::new(),
                next_row_id: 1,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().rows.len()
    }

    /// Validate and store one row, updating every index. Returns the row-id
    /// assigned to it. Nothing is stored when any check fails.
    pub fn insert(&self, row: Row) -> Result<RowId> {
        let mut state = self.state.lock();

        self.schema.validate_row(&row)?;
        self.check_primary_keys(&state, &row)?;

        let row_id = state.next_row_id;
        state.next_row_id += 1;

        for (column_name, index) in state.indexes.iter_mut() {
            if let Some(position) = self.schema.get_column_position(column_name) {
                index.insert(&row[position], row_id);
            }
        }
        state.rows.insert(row_id, row);

        Ok(row_id)
    }

    /// Matching rows with the requested columns, in table (insertion) order.
    ///
    /// The condition is type-checked against the schema before any row is
    /// visited, so a bad predicate fails the same way on an empty table, a
    /// full table, and with or without an index.
    pub fn select(
        &self,
        projection: &Projection,
        condition: Option<&Condition>,
    ) -> Result<(Vec<Column>, Vec<Row>)> {
        let state = self.state.lock();

        let (columns, positions) = self.resolve_projection(projection)?;
        if let Some(condition) = condition {
            self.check_condition(condition)?;
        }

        let project = |row: &Row| positions.iter().map(|&p| row[p].clone()).collect();

        let rows = match plan_candidates(&state, condition) {
            Candidates::All => state
                .rows
                .values()
                .filter(|row| self.condition_holds(condition, row))
                .map(project)
                .collect(),
            Candidates::Ids(ids) => ids
                .iter()
                .filter_map(|id| state.rows.get(id))
                .filter(|row| self.condition_holds(condition, row))
                .map(project)
                .collect(),
        };

        Ok((columns, rows))
    }

    /// Apply assignments to every matching row (all rows when there is no
    /// condition). Returns the number of rows changed. All validation runs
    /// before the first mutation, so a failing statement changes nothing.
    pub fn update_where(
        &self,
        condition: Option<&Condition>,
        assignments: &[(String, Value)],
    ) -> Result<usize> {
        let mut state = self.state.lock();

        if let Some(condition) = condition {
            self.check_condition(condition)?;
        }
        let resolved = self.check_assignments(assignments)?;

        let matched = self.matching_row_ids(&state, condition);
        self.check_assigned_keys(&state, &matched, &resolved)?;

        for &row_id in &matched {
            for (position, value) in &resolved {
                let column_name = &self.schema.columns[*position].name;
                // swap the index entry together with the cell
                let old = match state.rows.get_mut(&row_id) {
                    Some(row) => std::mem::replace(&mut row[*position], value.clone()),
                    None => continue,
                };
                if let Some(index) = state.indexes.get_mut(column_name) {
                    index.remove(&old, row_id);
                    index.insert(value, row_id);
                }
            }
        }

        Ok(matched.len())
    }

    /// Remove every matching row and its index entries. Returns the number
    /// of rows removed. Surviving rows keep their row-ids.
    pub fn delete_where(&self, condition: Option<&Condition>) -> Result<usize> {
        let mut state = self.state.lock();

        if let Some(condition) = condition {
            self.check_condition(condition)?;
        }

        let matched = self.matching_row_ids(&state, condition);

        for &row_id in &matched {
            let Some(row) = state.rows.remove(&row_id) else {
                continue;
            };
            for (column_name, index) in state.indexes.iter_mut() {
                if let Some(position) = self.schema.get_column_position(column_name) {
                    index.remove(&row[position], row_id);
                }
            }
        }

        Ok(matched.len())
    }

    /// Build an index over `column`, populated from the rows already stored.
    pub fn create_index(&self, column: &str, kind: IndexKind) -> Result<()> {
        let mut state = self.state.lock();

        let position = self
            .schema
            .get_column_position(column)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))?;
        if state.indexes.contains_key(column) {
            return Err(DbError::IndexExists(column.to_string()));
        }

        let mut index = Index::new(kind);
        for (&row_id, row) in &state.rows {
            index.insert(&row[position], row_id);
        }
        state.indexes.insert(column.to_string(), index);

        Ok(())
    }

    pub fn drop_index(&self, column: &str) -> Result<()> {
        let mut state = self.state.lock();
        state
            .indexes
            .remove(column)
            .map(|_| ())
            .ok_or_else(|| DbError::IndexNotFound(column.to_string()))
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.state.lock().indexes.contains_key(column)
    }

    /// Indexed columns with their variants, sorted by column name.
    pub fn indexed_columns(&self) -> Vec<(String, IndexKind)> {
        let state = self.state.lock();
        let mut columns: Vec<_> = state
            .indexes
            .iter()
            .map(|(name, index)| (name.clone(), index.kind()))
            .collect();
        columns.sort_by(|a, b| a.0.cmp(&b.0));
        columns
    }

    fn resolve_projection(&self, projection: &Projection) -> Result<(Vec<Column>, Vec<usize>)> {
        match projection {
            Projection::All => Ok((
                self.schema.columns.clone(),
                (0..self.schema.column_count()).collect(),
            )),
            Projection::Columns(names) => {
                let mut columns = Vec::with_capacity(names.len());
                let mut positions = Vec::with_capacity(names.len());
                for name in names {
                    let position = self
                        .schema
                        .get_column_position(name)
                        .ok_or_else(|| DbError::ColumnNotFound(name.clone()))?;
                    columns.push(self.schema.columns[position].clone());
                    positions.push(position);
                }
                Ok((columns, positions))
            }
        }
    }

    /// Static predicate check: every named column must exist and every
    /// non-null literal must match its column's type. Running this before
    /// candidate gathering keeps errors independent of table contents and
    /// of index presence.
    fn check_condition(&self, condition: &Condition) -> Result<()> {
        for comparison in condition.comparisons() {
            let column = self
                .schema
                .get_column(&comparison.column)
                .ok_or_else(|| DbError::ColumnNotFound(comparison.column.clone()))?;
            if let Some(literal_type) = comparison.value.data_type() {
                if literal_type != column.data_type {
                    return Err(DbError::TypeMismatch {
                        column: column.name.clone(),
                        expected: column.data_type.name(),
                        found: literal_type.name(),
                    });
                }
            }
        }
        Ok(())
    }

    fn condition_holds(&self, condition: Option<&Condition>, row: &Row) -> bool {
        match condition {
            Some(condition) => condition_matches(&self.schema, condition, row),
            None => true,
        }
    }

    /// Row-ids satisfying the condition, ascending. Candidates may come
    /// from an index, but every candidate is re-checked against the full
    /// predicate.
    fn matching_row_ids(&self, state: &TableState, condition: Option<&Condition>) -> Vec<RowId> {
        match plan_candidates(state, condition) {
            Candidates::All => state
                .rows
                .iter()
                .filter(|(_, row)| self.condition_holds(condition, row))
                .map(|(&id, _)| id)
                .collect(),
            Candidates::Ids(ids) => ids
                .into_iter()
                .filter(|id| {
                    state
                        .rows
                        .get(id)
                        .is_some_and(|row| self.condition_holds(condition, row))
                })
                .collect(),
        }
    }

    /// Reject an insert that would duplicate an existing primary key value.
    fn check_primary_keys(&self, state: &TableState, row: &[Value]) -> Result<()> {
        for (position, column) in self.schema.columns.iter().enumerate() {
            if !column.primary_key {
                continue;
            }
            if self.key_in_use(state, position, &row[position], None) {
                return Err(DbError::DuplicateKey(column.name.clone()));
            }
        }
        Ok(())
    }

    /// Resolve assignment column names to positions and validate the new
    /// values against type and null constraints.
    fn check_assignments(&self, assignments: &[(String, Value)]) -> Result<Vec<(usize, Value)>> {
        let mut resolved = Vec::with_capacity(assignments.len());
        for (name, value) in assignments {
            let position = self
                .schema
                .get_column_position(name)
                .ok_or_else(|| DbError::ColumnNotFound(name.clone()))?;
            let column = &self.schema.columns[position];
            if value.is_null() {
                if !column.nullable {
                    return Err(DbError::NullViolation(column.name.clone()));
                }
            } else if !value.matches_type(column.data_type) {
                return Err(DbError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type.name(),
                    found: value.type_name(),
                });
            }
            resolved.push((position, value.clone()));
        }
        Ok(resolved)
    }

    /// Reject an update that would leave two rows sharing a primary key
    /// value: either several matched rows all receive the same key, or an
    /// untouched row already holds it. Matching nothing changes nothing,
    /// so it cannot collide.
    fn check_assigned_keys(
        &self,
        state: &TableState,
        matched: &[RowId],
        resolved: &[(usize, Value)],
    ) -> Result<()> {
        for (position, value) in resolved {
            let column = &self.schema.columns[*position];
            if !column.primary_key {
                continue;
            }
            match matched {
                [] => {}
                [row_id] => {
                    if self.key_in_use(state, *position, value, Some(*row_id)) {
                        return Err(DbError::DuplicateKey(column.name.clone()));
                    }
                }
                _ => return Err(DbError::DuplicateKey(column.name.clone())),
            }
        }
        Ok(())
    }

    /// Whether any row other than `exempt` already holds `value` in the
    /// column at `position`. Uses the column's index when one exists.
    fn key_in_use(
        &self,
        state: &TableState,
        position: usize,
        value: &Value,
        exempt: Option<RowId>,
    ) -> bool {
        let column_name = &self.schema.columns[position].name;
        if let Some(index) = state.indexes.get(column_name) {
            return index
                .find(value)
                .into_iter()
                .any(|id| Some(id) != exempt);
        }
        state
            .rows
            .iter()
            .any(|(&id, row)| Some(id) != exempt && &row[position] == value)
    }
}

/// Pick how to gather candidate rows: a single equality comparison on an
/// indexed column uses `find`; a single range comparison on an ordered
/// index uses a bounded scan; everything else (compound conditions,
/// unindexed columns, `<>`, hash-indexed ranges) falls back to a full scan.
/// The plan only narrows the candidate set, never the result.
fn plan_candidates(state: &TableState, condition: Option<&Condition>) -> Candidates {
    let Some(condition) = condition else {
        return Candidates::All;
    };
    let Some(comparison) = condition.single_comparison() else {
        return Candidates::All;
    };
    if comparison.value.is_null() {
        // null matches nothing; the scan will confirm that cheaply
        return Candidates::All;
    }
    let Some(index) = state.indexes.get(&comparison.column) else {
        return Candidates::All;
    };

    match comparison.op {
        CompareOp::Eq => Candidates::Ids(index.find(&comparison.value)),
        op => match range_bounds(op, &comparison.value)
            .and_then(|(lower, upper)| index.find_bounds(lower, upper))
        {
            Some(ids) => Candidates::Ids(ids),
            None => Candidates::All,
        },
    }
}

/// Open/closed bound substitution for the four range operators.
fn range_bounds(op: CompareOp, value: &Value) -> Option<(Bound<&Value>, Bound<&Value>)> {
    match op {
        CompareOp::Lt => Some((Bound::Unbounded, Bound::Excluded(value))),
        CompareOp::Le => Some((Bound::Unbounded, Bound::Included(value))),
        CompareOp::Gt => Some((Bound::Excluded(value), Bound::Unbounded)),
        CompareOp::Ge => Some((Bound::Included(value), Bound::Unbounded)),
        CompareOp::Eq | CompareOp::Ne => None,
    }
}

/// Evaluate a condition chain against one row, strictly left to right with
/// no precedence between AND and OR.
fn condition_matches(schema: &TableSchema, condition: &Condition, row: &Row) -> bool {
    let mut holds = comparison_matches(schema, &condition.first, row);
    for (connector, comparison) in &condition.rest {
        let next = comparison_matches(schema, comparison, row);
        holds = match connector {
            Connector::And => holds && next,
            Connector::Or => holds || next,
        };
    }
    holds
}

/// One comparison against one row. A null on either side matches nothing;
/// callers type-check the condition first, so an unknown column or an
/// unorderable pair cannot occur here and also matches nothing.
fn comparison_matches(schema: &TableSchema, comparison: &Comparison, row: &Row) -> bool {
    let Some(position) = schema.get_column_position(&comparison.column) else {
        return false;
    };
    let cell = &row[position];
    if cell.is_null() || comparison.value.is_null() {
        return false;
    }
    match cell.partial_cmp(&comparison.value) {
        Some(ordering) => comparison.op.matches(ordering),
        None => false,
    }
}
