//! Column indexes: a hash variant for equality lookups and an ordered
//! variant that also answers range queries.
//!
//! Both variants map column values to the set of row-ids currently holding
//! that value. The null marker is never stored; a null cell simply has no
//! index entry, which matches condition evaluation (null never satisfies a
//! comparison).

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::types::{RowId, Value};

/// Which index variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Equality lookups only, amortized O(1)
    Hash,
    /// Equality and inclusive range lookups, O(log n)
    Ordered,
}

/// Key wrapper giving stored values a total order.
///
/// Keys of different types never interleave: ordering is by type tag first,
/// then by value within the tag. Doubles use their `total_cmp` order, so
/// every key (NaN included) has a defined position and equality is exact on
/// the bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IndexKey(Value);

fn tag_rank(value: &Value) -> u8 {
    match value {
        Value::Integer(_) => 0,
        Value::Double(_) => 1,
        Value::Text(_) => 2,
        Value::Boolean(_) => 3,
        Value::Null => 4,
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.partial_cmp(&other.0) {
            Some(ordering) => ordering,
            None => tag_rank(&self.0).cmp(&tag_rank(&other.0)),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Equality-only index over hashed values.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    entries: AHashMap<Value, BTreeSet<RowId>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, value: &Value, row_id: RowId) {
        if value.is_null() {
            return;
        }
        self.entries.entry(value.clone()).or_default().insert(row_id);
    }

    fn remove(&mut self, value: &Value, row_id: RowId) {
        if let Some(rows) = self.entries.get_mut(value) {
            rows.remove(&row_id);
            if rows.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    fn find(&self, value: &Value) -> BTreeSet<RowId> {
        self.entries.get(value).cloned().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Ordered index over totally-ordered keys.
#[derive(Debug, Clone, Default)]
pub struct OrderedIndex {
    entries: BTreeMap<IndexKey, BTreeSet<RowId>>,
}

impl OrderedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, value: &Value, row_id: RowId) {
        if value.is_null() {
            return;
        }
        self.entries
            .entry(IndexKey(value.clone()))
            .or_default()
            .insert(row_id);
    }

    fn remove(&mut self, value: &Value, row_id: RowId) {
        let key = IndexKey(value.clone());
        if let Some(rows) = self.entries.get_mut(&key) {
            rows.remove(&row_id);
            if rows.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    fn find(&self, value: &Value) -> BTreeSet<RowId> {
        self.entries
            .get(&IndexKey(value.clone()))
            .cloned()
            .unwrap_or_default()
    }

    fn find_bounds(&self, lower: Bound<&Value>, upper: Bound<&Value>) -> BTreeSet<RowId> {
        let lower = map_bound(lower);
        let upper = map_bound(upper);
        let mut result = BTreeSet::new();
        for (_, rows) in self.entries.range((lower, upper)) {
            result.extend(rows.iter().copied());
        }
        result
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn map_bound(bound: Bound<&Value>) -> Bound<IndexKey> {
    match bound {
        Bound::Included(v) => Bound::Included(IndexKey(v.clone())),
        Bound::Excluded(v) => Bound::Excluded(IndexKey(v.clone())),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// One column index, either variant behind a single surface.
///
/// The variant is chosen at creation time; callers are otherwise oblivious
/// to which is active. The one capability gap: range lookups on the hash
/// variant return the empty set.
#[derive(Debug, Clone)]
pub enum Index {
    Hash(HashIndex),
    Ordered(OrderedIndex),
}

impl Index {
    pub fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Hash => Index::Hash(HashIndex::new()),
            IndexKind::Ordered => Index::Ordered(OrderedIndex::new()),
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            Index::Hash(_) => IndexKind::Hash,
            Index::Ordered(_) => IndexKind::Ordered,
        }
    }

    /// Record `row_id` under `value`. Inserting the null marker is a no-op.
    pub fn insert(&mut self, value: &Value, row_id: RowId) {
        match self {
            Index::Hash(index) => index.insert(value, row_id),
            Index::Ordered(index) => index.insert(value, row_id),
        }
    }

    /// Drop the `(value, row_id)` pair. Removing an absent pair is a no-op;
    /// removing the last row-id for a key drops the key entry.
    pub fn remove(&mut self, value: &Value, row_id: RowId) {
        match self {
            Index::Hash(index) => index.remove(value, row_id),
            Index::Ordered(index) => index.remove(value, row_id),
        }
    }

    /// Row-ids holding exactly `value`, in ascending row-id order.
    pub fn find(&self, value: &Value) -> BTreeSet<RowId> {
        match self {
            Index::Hash(index) => index.find(value),
            Index::Ordered(index) => index.find(value),
        }
    }

    /// Row-ids with values in `[low, high]`, both bounds inclusive.
    ///
    /// The hash variant cannot answer this and returns the empty set.
    /// Bounds of different types cannot be ordered and are an error; a null
    /// bound or an inverted range matches nothing.
    pub fn find_range(&self, low: &Value, high: &Value) -> Result<BTreeSet<RowId>> {
        match self {
            Index::Hash(_) => Ok(BTreeSet::new()),
            Index::Ordered(index) => {
                if low.is_null() || high.is_null() {
                    return Ok(BTreeSet::new());
                }
                match low.partial_cmp(high) {
                    None => Err(DbError::Incomparable(low.type_name(), high.type_name())),
                    Some(Ordering::Greater) => Ok(BTreeSet::new()),
                    Some(_) => Ok(index
                        .find_bounds(Bound::Included(low), Bound::Included(high))),
                }
            }
        }
    }

    /// Range lookup with explicit bound kinds, for one-sided comparisons.
    /// Only the ordered variant answers; the caller must pass non-null
    /// bounds of the indexed column's type.
    pub(crate) fn find_bounds(
        &self,
        lower: Bound<&Value>,
        upper: Bound<&Value>,
    ) -> Option<BTreeSet<RowId>> {
        match self {
            Index::Hash(_) => None,
            Index::Ordered(index) => Some(index.find_bounds(lower, upper)),
        }
    }

    /// Number of distinct keys currently stored.
    pub fn len(&self) -> usize {
        match self {
            Index::Hash(index) => index.len(),
            Index::Ordered(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(index: &Index, value: Value) -> Vec<RowId> {
        index.find(&value).into_iter().collect()
    }

    #[test]
    fn test_hash_index_equality() {
        let mut index = Index::new(IndexKind::Hash);
        index.insert(&Value::Text("a".into()), 1);
        index.insert(&Value::Text("a".into()), 3);
        index.insert(&Value::Text("b".into()), 2);

        assert_eq!(ids(&index, Value::Text("a".into())), vec![1, 3]);
        assert_eq!(ids(&index, Value::Text("b".into())), vec![2]);
        assert!(ids(&index, Value::Text("c".into())).is_empty());
    }

    #[test]
    fn test_hash_index_range_gap() {
        let mut index = Index::new(IndexKind::Hash);
        index.insert(&Value::Integer(5), 1);

        // documented capability gap: empty, not an error
        let result = index
            .find_range(&Value::Integer(0), &Value::Integer(10))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut index = Index::new(IndexKind::Ordered);
        index.insert(&Value::Integer(7), 4);

        index.remove(&Value::Integer(7), 99); // absent row-id
        index.remove(&Value::Integer(42), 4); // absent key
        assert_eq!(ids(&index, Value::Integer(7)), vec![4]);

        index.remove(&Value::Integer(7), 4);
        index.remove(&Value::Integer(7), 4); // second removal is a no-op
        assert!(ids(&index, Value::Integer(7)).is_empty());
        assert!(index.is_empty()); // empty bucket is pruned
    }

    #[test]
    fn test_ordered_index_inclusive_range() {
        let mut index = Index::new(IndexKind::Ordered);
        for (row_id, v) in [(1, 1), (2, 5), (3, 9)] {
            index.insert(&Value::Integer(v), row_id);
        }

        let result = index
            .find_range(&Value::Integer(1), &Value::Integer(5))
            .unwrap();
        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![1, 2]);

        let all = index
            .find_range(&Value::Integer(0), &Value::Integer(100))
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_ordered_index_open_bounds() {
        let mut index = Index::new(IndexKind::Ordered);
        for (row_id, v) in [(1, 1), (2, 5), (3, 9)] {
            index.insert(&Value::Integer(v), row_id);
        }

        let ge5 = index
            .find_bounds(Bound::Included(&Value::Integer(5)), Bound::Unbounded)
            .unwrap();
        assert_eq!(ge5.into_iter().collect::<Vec<_>>(), vec![2, 3]);

        let lt5 = index
            .find_bounds(Bound::Unbounded, Bound::Excluded(&Value::Integer(5)))
            .unwrap();
        assert_eq!(lt5.into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_range_bound_errors() {
        let mut index = Index::new(IndexKind::Ordered);
        index.insert(&Value::Integer(5), 1);

        // mixed-type bounds cannot be ordered
        assert!(index
            .find_range(&Value::Integer(1), &Value::Text("z".into()))
            .is_err());

        // inverted range matches nothing
        let result = index
            .find_range(&Value::Integer(9), &Value::Integer(1))
            .unwrap();
        assert!(result.is_empty());

        // null bounds match nothing
        let result = index.find_range(&Value::Null, &Value::Integer(1)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_null_is_never_indexed() {
        let mut index = Index::new(IndexKind::Hash);
        index.insert(&Value::Null, 1);
        assert!(index.is_empty());
        assert!(ids(&index, Value::Null).is_empty());

        let mut index = Index::new(IndexKind::Ordered);
        index.insert(&Value::Null, 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_double_keys_total_order() {
        let mut index = Index::new(IndexKind::Ordered);
        index.insert(&Value::Double(1.5), 1);
        index.insert(&Value::Double(f64::NAN), 2);
        index.insert(&Value::Double(2.5), 3);

        // NaN is a findable key like any other
        assert_eq!(ids(&index, Value::Double(f64::NAN)), vec![2]);

        let result = index
            .find_range(&Value::Double(1.0), &Value::Double(3.0))
            .unwrap();
        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_candidates_come_back_in_row_id_order() {
        let mut index = Index::new(IndexKind::Ordered);
        index.insert(&Value::Integer(5), 9);
        index.insert(&Value::Integer(5), 2);
        index.insert(&Value::Integer(5), 6);

        assert_eq!(ids(&index, Value::Integer(5)), vec![2, 6, 9]);
    }
}
