use crate::collection::Document;
use crate::common::Value;
use crate::errors::FerriteResult;
use crate::ferrite::FerriteInner;
use crate::index::IndexKind;
use crate::store::DocumentStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// The shared state of one named collection: its document store behind a
/// read-write lock.
pub struct CollectionState {
    pub(crate) name: String,
    pub(crate) store: RwLock<DocumentStore>,
}

impl CollectionState {
    pub(crate) fn new(name: &str, store: DocumentStore) -> Self {
        CollectionState {
            name: name.to_string(),
            store: RwLock::new(store),
        }
    }
}

/// A handle to a named collection of documents.
///
/// Handles are cheap to clone and can be shared across threads; all clones
/// observe the same underlying store.
///
/// # Locking
///
/// Every mutating operation (`insert_one`, `insert_many`, `update`, `remove`,
/// `set`, index maintenance) holds the database-wide mutex for its full
/// duration, so mutations across all collections are strictly serialized and
/// never interleave with snapshot persistence. Queries (`find`, `find_one`,
/// `count`, `get`) stay off that mutex and take only this collection's read
/// lock: concurrent readers proceed in parallel and observe a consistent
/// store, at the cost of briefly blocking behind an in-flight mutation.
///
/// After each successful mutation the database is marked dirty; with autosync
/// enabled it is persisted synchronously before the call returns.
#[derive(Clone)]
pub struct Collection {
    pub(crate) db: Arc<FerriteInner>,
    pub(crate) state: Arc<CollectionState>,
}

impl Collection {
    /// The collection's name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Inserts one document into the collection.
    ///
    /// If the document already contains an `_id` it is used as the primary
    /// key, overwriting any existing document under the same key. Otherwise a
    /// globally unique identifier is generated and assigned.
    ///
    /// Returns the primary key of the inserted document.
    pub fn insert_one(&self, document: Document) -> FerriteResult<Value> {
        let key = {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().insert_one(document)?
        };
        self.db.after_mutation()?;
        Ok(key)
    }

    /// Inserts a list of documents using the same process as `insert_one`,
    /// in the given order.
    ///
    /// The batch is not atomic: a failure partway leaves prior insertions
    /// committed. Returns the primary keys in insertion order.
    pub fn insert_many(&self, documents: Vec<Document>) -> FerriteResult<Vec<Value>> {
        let keys = {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().insert_many(documents)?
        };
        self.db.after_mutation()?;
        Ok(keys)
    }

    /// Finds all documents that match the query.
    ///
    /// An absent query matches every document.
    pub fn find(&self, query: Option<&Document>) -> FerriteResult<Vec<Document>> {
        self.find_with(query, None)
    }

    /// Finds all documents that match the query and the caller-supplied
    /// predicate.
    ///
    /// The predicate runs after structural evaluation and can exclude a
    /// document the query matched. It is trusted code: a panic inside it
    /// propagates to the caller.
    pub fn find_with(
        &self,
        query: Option<&Document>,
        predicate: Option<&dyn Fn(&Document) -> bool>,
    ) -> FerriteResult<Vec<Document>> {
        self.state.store.read().find(query, predicate)
    }

    /// Finds one document that matches the query.
    ///
    /// With no query, an arbitrary (not necessarily stable) existing document
    /// is returned, or `None` if the collection is empty.
    pub fn find_one(&self, query: Option<&Document>) -> FerriteResult<Option<Document>> {
        self.find_one_with(query, None)
    }

    /// Finds one document that matches the query and predicate.
    pub fn find_one_with(
        &self,
        query: Option<&Document>,
        predicate: Option<&dyn Fn(&Document) -> bool>,
    ) -> FerriteResult<Option<Document>> {
        self.state.store.read().find_one(query, predicate)
    }

    /// Applies the patch to all documents matching the query with a shallow
    /// field-wise merge.
    ///
    /// Returns the number of documents updated.
    pub fn update(&self, query: &Document, patch: &Document) -> FerriteResult<usize> {
        let updated = {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().update(query, patch)?
        };
        self.db.after_mutation()?;
        Ok(updated)
    }

    /// Removes all documents that match the query, or every document when no
    /// query is given.
    ///
    /// Returns the number of documents removed.
    pub fn remove(&self, query: Option<&Document>) -> FerriteResult<usize> {
        let removed = {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().remove(query)?
        };
        self.db.after_mutation()?;
        Ok(removed)
    }

    /// The current number of documents in the collection.
    pub fn count(&self) -> usize {
        self.state.store.read().count()
    }

    /// Creates the indexes described by an index-creation request: a mapping
    /// from field name to index-kind tag.
    ///
    /// `"hashed"` is the only meaningful tag; entries with an unrecognized
    /// tag are ignored with a warning.
    pub fn create_index(&self, request: &Document) -> FerriteResult<()> {
        {
            let _guard = self.db.write_lock.lock();
            let mut store = self.state.store.write();
            for (field, tag) in request.iter() {
                match tag.as_str().and_then(IndexKind::from_tag) {
                    Some(kind) => store.create_index(field, kind),
                    None => {
                        log::warn!(
                            "Ignoring unrecognized index kind {} for field {}",
                            tag,
                            field
                        );
                    }
                }
            }
        }
        self.db.after_mutation()
    }

    /// Drops every index on this collection.
    pub fn drop_indexes(&self) -> FerriteResult<()> {
        {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().drop_indexes();
        }
        self.db.after_mutation()
    }

    /// Sets `key` to the given document, key/value-store style.
    ///
    /// Sugar for inserting `value` with its `_id` forced to `key`; a later
    /// `set` under the same key overwrites the current value.
    pub fn set(&self, key: impl Into<Value>, value: Document) -> FerriteResult<Value> {
        let key = {
            let _guard = self.db.write_lock.lock();
            self.state.store.write().set(key.into(), value)?
        };
        self.db.after_mutation()?;
        Ok(key)
    }

    /// Gets the document whose primary key equals `key`, key/value-store
    /// style.
    pub fn get(&self, key: impl Into<Value>) -> Option<Document> {
        self.state.store.read().get(&key.into())
    }
}
