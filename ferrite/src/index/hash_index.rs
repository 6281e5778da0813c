use crate::collection::Document;
use crate::common::{resolve_path, Value};
use std::collections::{HashMap, HashSet};

/// A hash-equality index over a single document field.
///
/// Buckets map an indexed value to the set of primary keys of documents
/// currently holding that value. A reverse entry map records which value each
/// key is currently filed under, so an update that changes the indexed
/// field's value relocates the key between buckets instead of appending to
/// the new one.
///
/// Invariant: the index reflects exactly the live document set. No key stays
/// in a bucket for a value its document no longer holds, and documents
/// missing the field appear in no bucket.
pub struct HashIndex {
    field: String,
    buckets: HashMap<Value, HashSet<Value>>,
    /// primary key -> the value the key is currently bucketed under
    entries: HashMap<Value, Value>,
}

impl HashIndex {
    pub fn new(field: &str) -> Self {
        HashIndex {
            field: field.to_string(),
            buckets: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// The field this index covers.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Builds the index from scratch with a single scan of the document set.
    ///
    /// Documents that do not hold the indexed field are excluded from every
    /// bucket.
    pub fn build(&mut self, documents: &HashMap<Value, Document>) {
        self.buckets.clear();
        self.entries.clear();
        for (key, document) in documents {
            if let Some(value) = resolve_path(document, &self.field) {
                self.buckets
                    .entry(value.clone())
                    .or_default()
                    .insert(key.clone());
                self.entries.insert(key.clone(), value.clone());
            }
        }
    }

    /// Re-synchronizes the index after a document was inserted or updated.
    ///
    /// If the document holds the indexed field, its key ends up in the bucket
    /// for the field's current value and in no other bucket. Idempotent: a
    /// key already filed under the correct value is left alone. A revision
    /// that dropped the field clears any stale entry for the key.
    pub fn on_insert_or_update(&mut self, document: &Document) {
        let Some(key) = document.id() else {
            log::debug!("Skipping index sync for document without a primary key");
            return;
        };

        let key = key.clone();
        match resolve_path(document, &self.field).cloned() {
            Some(value) => {
                if let Some(previous) = self.entries.get(&key).cloned() {
                    if previous == value {
                        return;
                    }
                    self.unfile(&key, &previous);
                }
                self.buckets
                    .entry(value.clone())
                    .or_default()
                    .insert(key.clone());
                self.entries.insert(key, value);
            }
            None => {
                // the new revision no longer holds the field
                self.remove_key(&key);
            }
        }
    }

    /// Removes the document's key from its bucket.
    ///
    /// A no-op when the document never held the field or was never indexed.
    pub fn on_remove(&mut self, document: &Document) {
        let Some(key) = document.id() else {
            return;
        };
        let key = key.clone();
        self.remove_key(&key);
    }

    /// Returns the primary keys filed under the given value.
    pub fn lookup(&self, value: &Value) -> Vec<Value> {
        match self.buckets.get(value) {
            Some(keys) => keys.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The number of distinct indexed values.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The number of indexed documents.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn remove_key(&mut self, key: &Value) {
        if let Some(previous) = self.entries.remove(key) {
            self.unfile(key, &previous);
        }
    }

    fn unfile(&mut self, key: &Value, value: &Value) {
        if let Some(bucket) = self.buckets.get_mut(value) {
            bucket.remove(key);
            if bucket.is_empty() {
                self.buckets.remove(value);
            }
        }
    }
}
