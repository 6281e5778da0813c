use crate::collection::{Document, OidGenerator};
use crate::common::{Value, DOC_ID};
use crate::errors::FerriteResult;
use crate::filter::{compile, execute, ExpressionList};
use crate::index::{IndexKind, IndexManager};
use std::collections::HashMap;
use std::sync::Arc;

/// The in-memory document store of one collection.
///
/// Owns the primary-key-to-document mapping and the secondary indexes over
/// it. Every key in the mapping equals the `_id` field of its document, and
/// every mutation re-synchronizes the live indexes before it returns.
///
/// The store is a plain single-threaded structure; callers layer their own
/// locking on top (see [crate::collection::Collection]).
pub struct DocumentStore {
    documents: HashMap<Value, Document>,
    indexes: IndexManager,
    oid_generator: Arc<OidGenerator>,
}

impl DocumentStore {
    /// Creates an empty store sharing the database's identifier generator.
    pub fn new(oid_generator: Arc<OidGenerator>) -> Self {
        DocumentStore {
            documents: HashMap::new(),
            indexes: IndexManager::new(),
            oid_generator,
        }
    }

    /// Creates a store from a loaded snapshot's documents.
    pub(crate) fn from_documents(
        documents: HashMap<Value, Document>,
        oid_generator: Arc<OidGenerator>,
    ) -> Self {
        DocumentStore {
            documents,
            indexes: IndexManager::new(),
            oid_generator,
        }
    }

    /// Inserts one document, upserting on primary-key conflict.
    ///
    /// A document without an `_id` field is assigned a generated identifier;
    /// a caller-supplied key is kept, overwriting any existing document under
    /// the same key. Live indexes are re-synchronized after the write.
    ///
    /// Returns the primary key of the inserted document.
    pub fn insert_one(&mut self, mut document: Document) -> FerriteResult<Value> {
        if !document.contains_field(DOC_ID) {
            document.put(DOC_ID, self.oid_generator.next_id())?;
        }
        // the field is present by now
        let key = document.id().cloned().unwrap_or(Value::Null);

        self.documents.insert(key.clone(), document);
        if let Some(inserted) = self.documents.get(&key) {
            self.indexes.on_insert_or_update(inserted);
        }
        Ok(key)
    }

    /// Inserts documents one by one, in the given order.
    ///
    /// Not atomic as a batch: a failure partway leaves prior insertions
    /// committed. Returns the primary keys in insertion order.
    pub fn insert_many(&mut self, documents: Vec<Document>) -> FerriteResult<Vec<Value>> {
        let mut keys = Vec::with_capacity(documents.len());
        for document in documents {
            keys.push(self.insert_one(document)?);
        }
        Ok(keys)
    }

    /// Finds all documents selected by the query and predicate.
    ///
    /// An absent query matches every document.
    pub fn find(
        &self,
        query: Option<&Document>,
        predicate: Option<&dyn Fn(&Document) -> bool>,
    ) -> FerriteResult<Vec<Document>> {
        let expressions = match query {
            Some(query) => compile(query)?,
            None => ExpressionList::new(),
        };
        Ok(execute(
            &expressions,
            &self.documents,
            &self.indexes,
            predicate,
        ))
    }

    /// Finds one matching document.
    ///
    /// With no query and no predicate this returns an arbitrary existing
    /// document (iteration order of the underlying map, not stable);
    /// otherwise the first result of [DocumentStore::find], or `None`.
    pub fn find_one(
        &self,
        query: Option<&Document>,
        predicate: Option<&dyn Fn(&Document) -> bool>,
    ) -> FerriteResult<Option<Document>> {
        if query.is_none() && predicate.is_none() {
            return Ok(self.documents.values().next().cloned());
        }
        Ok(self.find(query, predicate)?.into_iter().next())
    }

    /// Applies a shallow field-wise merge to every document matching the
    /// query: fields present in `patch` overwrite the document's fields,
    /// fields absent from `patch` are untouched. Each mutated document is
    /// re-synchronized against every live index.
    ///
    /// Returns the number of documents updated.
    pub fn update(&mut self, query: &Document, patch: &Document) -> FerriteResult<usize> {
        let matched = self.find(Some(query), None)?;
        let mut updated = 0;

        for document in &matched {
            let Some(key) = document.id().cloned() else {
                continue;
            };
            if let Some(live) = self.documents.get_mut(&key) {
                live.merge(patch);
                // the primary key is not patchable; re-keying would break the
                // key-to-document invariant
                if live.id() != Some(&key) {
                    log::warn!("Ignoring attempt to patch {} on document {}", DOC_ID, key);
                    live.put(DOC_ID, key.clone())?;
                }
            }
            if let Some(live) = self.documents.get(&key) {
                self.indexes.on_insert_or_update(live);
            }
            updated += 1;
        }
        Ok(updated)
    }

    /// Deletes every document matching the query, or all documents when no
    /// query is given, from the store and from every live index.
    ///
    /// Returns the number of documents removed.
    pub fn remove(&mut self, query: Option<&Document>) -> FerriteResult<usize> {
        match query {
            None => {
                let count = self.documents.len();
                for document in self.documents.values() {
                    self.indexes.on_remove(document);
                }
                self.documents.clear();
                Ok(count)
            }
            Some(query) => {
                let matched = self.find(Some(query), None)?;
                for document in &matched {
                    if let Some(key) = document.id() {
                        self.documents.remove(key);
                    }
                    self.indexes.on_remove(document);
                }
                Ok(matched.len())
            }
        }
    }

    /// The current number of documents.
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Creates a secondary index over `field`, building it with one scan of
    /// the current documents.
    pub fn create_index(&mut self, field: &str, kind: IndexKind) {
        self.indexes.create_index(field, kind, &self.documents);
    }

    /// Drops every secondary index.
    pub fn drop_indexes(&mut self) {
        self.indexes.drop_all();
    }

    /// Key/value sugar: stores `value` under the primary key `key`.
    ///
    /// This is an insert of `value` with its `_id` forced to `key`; a later
    /// `set` under the same key overwrites the document.
    pub fn set(&mut self, key: Value, mut value: Document) -> FerriteResult<Value> {
        value.put(DOC_ID, key)?;
        self.insert_one(value)
    }

    /// Key/value sugar: fetches the document whose primary key is `key`.
    pub fn get(&self, key: &Value) -> Option<Document> {
        self.documents.get(key).cloned()
    }

    /// Read access to the raw mapping, for snapshot serialization.
    pub(crate) fn documents(&self) -> &HashMap<Value, Document> {
        &self.documents
    }
}
