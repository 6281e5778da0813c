use crate::collection::Document;
use crate::common::{Value, HASH_INDEX};
use crate::index::HashIndex;
use std::collections::HashMap;

/// The supported index kinds.
///
/// The set is closed and dispatched exhaustively. `Hash` is the only live
/// member; an ordered kind supporting range lookups is the documented
/// extension point and would be added here, alongside a new arm in
/// [CollectionIndex].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// Hash-equality index: value -> set of primary keys.
    Hash,
}

impl IndexKind {
    /// Resolves an index-kind tag from an index-creation request.
    ///
    /// Returns `None` for unrecognized tags; callers ignore those entries.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            HASH_INDEX => Some(IndexKind::Hash),
            _ => None,
        }
    }

    /// The tag as written in an index-creation request.
    pub fn tag(&self) -> &'static str {
        match self {
            IndexKind::Hash => HASH_INDEX,
        }
    }
}

/// A single index instance, dispatched over the closed kind set.
///
/// Every variant provides the same capability surface - `build`,
/// `on_insert_or_update`, `on_remove`, `lookup` - so the manager and the
/// evaluator never depend on a concrete index representation.
enum CollectionIndex {
    Hash(HashIndex),
}

impl CollectionIndex {
    fn build(&mut self, documents: &HashMap<Value, Document>) {
        match self {
            CollectionIndex::Hash(index) => index.build(documents),
        }
    }

    fn on_insert_or_update(&mut self, document: &Document) {
        match self {
            CollectionIndex::Hash(index) => index.on_insert_or_update(document),
        }
    }

    fn on_remove(&mut self, document: &Document) {
        match self {
            CollectionIndex::Hash(index) => index.on_remove(document),
        }
    }

    fn lookup(&self, value: &Value) -> Vec<Value> {
        match self {
            CollectionIndex::Hash(index) => index.lookup(value),
        }
    }
}

/// Owns the secondary indexes of one document store.
///
/// The manager is consulted by the query evaluator for narrowing lookups and
/// notified by the store on every mutation so that each index keeps
/// reflecting the live document set.
pub struct IndexManager {
    indexes: HashMap<String, CollectionIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        IndexManager {
            indexes: HashMap::new(),
        }
    }

    /// Creates (or rebuilds) an index over `field`, scanning the given
    /// document set once.
    pub fn create_index(
        &mut self,
        field: &str,
        kind: IndexKind,
        documents: &HashMap<Value, Document>,
    ) {
        let mut index = match kind {
            IndexKind::Hash => CollectionIndex::Hash(HashIndex::new(field)),
        };
        index.build(documents);
        log::debug!("Created {} index on field {}", kind.tag(), field);
        self.indexes.insert(field.to_string(), index);
    }

    /// Discards every index. Subsequent lookups on formerly-indexed fields
    /// fall back to a full scan.
    pub fn drop_all(&mut self) {
        self.indexes.clear();
    }

    /// Checks whether a live index covers the field.
    pub fn has_index(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }

    /// The number of live indexes.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Resolves the primary keys filed under `value` in the index covering
    /// `field`.
    ///
    /// Returns `None` when no live index covers the field; the caller falls
    /// back to a scan. An existing index with no bucket for the value returns
    /// an empty set - that answer is authoritative.
    pub fn lookup(&self, field: &str, value: &Value) -> Option<Vec<Value>> {
        self.indexes.get(field).map(|index| index.lookup(value))
    }

    /// Notifies every index that a document was inserted or updated.
    pub fn on_insert_or_update(&mut self, document: &Document) {
        for index in self.indexes.values_mut() {
            index.on_insert_or_update(document);
        }
    }

    /// Notifies every index that a document was removed.
    pub fn on_remove(&mut self, document: &Document) {
        for index in self.indexes.values_mut() {
            index.on_remove(document);
        }
    }
}

impl Default for IndexManager {
    fn default() -> Self {
        Self::new()
    }
}
