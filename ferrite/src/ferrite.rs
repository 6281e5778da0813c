use crate::collection::{Collection, CollectionState, OidGenerator};
use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, FerriteError, FerriteResult};
use crate::ferrite_builder::FerriteBuilder;
use crate::store::{DocumentStore, Snapshot, SnapshotCodec};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The main database instance for Ferrite.
///
/// `Ferrite` is the entry point for all database operations: it owns the
/// named collections, the snapshot file and codec, and the coarse write lock
/// that serializes mutations.
///
/// Instances are thread-safe and cheap to clone; all clones share the same
/// underlying state through `Arc`.
///
/// # Examples
///
/// ```rust,ignore
/// use ferrite::doc;
/// use ferrite::ferrite::Ferrite;
/// use ferrite::store::JsonCodec;
///
/// // create or open the database
/// let db = Ferrite::builder()
///     .path("authors.db")
///     .codec(JsonCodec)
///     .open();
///
/// let authors = db.collection("authors");
/// authors.insert_one(doc! { "first": "Langston", "last": "Hughes", "born": 1902 })?;
///
/// let results = authors.find(Some(&doc! { "last": "Hughes" }))?;
///
/// // commit the changes to disk
/// db.sync()?;
/// ```
#[derive(Clone)]
pub struct Ferrite {
    inner: Arc<FerriteInner>,
}

pub(crate) struct FerriteInner {
    path: Option<PathBuf>,
    codec: Box<dyn SnapshotCodec>,
    autosync: bool,
    dirty: AtomicBool,
    /// Coarse mutual exclusion: held for the full duration of every mutating
    /// operation and for snapshot persistence. Queries stay off this lock.
    pub(crate) write_lock: Mutex<()>,
    collections: DashMap<String, Arc<CollectionState>>,
    oid_generator: Arc<OidGenerator>,
}

impl Ferrite {
    /// Creates a new [FerriteBuilder] for configuring and opening a database.
    pub fn builder() -> FerriteBuilder {
        FerriteBuilder::new()
    }

    pub(crate) fn open(
        path: Option<PathBuf>,
        codec: Box<dyn SnapshotCodec>,
        autosync: bool,
    ) -> Self {
        let inner = FerriteInner {
            path,
            codec,
            autosync,
            dirty: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            collections: DashMap::new(),
            oid_generator: Arc::new(OidGenerator::new()),
        };

        // a load failure of any kind degrades to an empty database
        if let Err(err) = inner.load_snapshot() {
            log::warn!(
                "Could not load snapshot from {:?}: {}; starting with an empty database",
                inner.path,
                err
            );
            inner.collections.clear();
        }

        Ferrite {
            inner: Arc::new(inner),
        }
    }

    /// Gets a collection by name, creating it if it doesn't exist.
    pub fn collection(&self, name: &str) -> Collection {
        let state = self
            .inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(CollectionState::new(
                    name,
                    DocumentStore::new(self.inner.oid_generator.clone()),
                ))
            })
            .clone();
        Collection {
            db: self.inner.clone(),
            state,
        }
    }

    /// Checks whether a collection with the given name exists.
    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.collections.contains_key(name)
    }

    /// The names of all live collections.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Whether the database has unsynced mutations.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Persists the whole database to the configured snapshot path.
    ///
    /// This blocks and writes to disk immediately, holding the write lock so
    /// no mutation interleaves with serialization. The write overwrites the
    /// file in place - there is no atomic rename or journal - so `sync` is
    /// best-effort checkpointing, not a durability guarantee.
    ///
    /// # Errors
    ///
    /// Fails when no snapshot path was configured, or when serialization or
    /// the file write fails.
    pub fn sync(&self) -> FerriteResult<()> {
        self.inner.sync()
    }
}

impl FerriteInner {
    fn load_snapshot(&self) -> FerriteResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = self.codec.load(path)?;
        for (name, documents) in snapshot.collections {
            let mut keyed = HashMap::new();
            for (raw_key, mut document) in documents {
                // rebuild the real primary key from the document itself; the
                // snapshot map key is only its display form
                let key = match document.id() {
                    Some(id) => id.clone(),
                    None => {
                        let key = Value::String(raw_key);
                        document.put(DOC_ID, key.clone())?;
                        key
                    }
                };
                keyed.insert(key, document);
            }
            let store = DocumentStore::from_documents(keyed, self.oid_generator.clone());
            self.collections
                .insert(name.clone(), Arc::new(CollectionState::new(&name, store)));
        }
        log::info!(
            "Loaded {} collection(s) from {:?}",
            self.collections.len(),
            path
        );
        Ok(())
    }

    pub(crate) fn sync(&self) -> FerriteResult<()> {
        let Some(path) = &self.path else {
            log::error!("Cannot sync: no snapshot path configured");
            return Err(FerriteError::new(
                "Cannot sync: no snapshot path configured",
                ErrorKind::InvalidOperation,
            ));
        };

        let _guard = self.write_lock.lock();
        let mut collections = HashMap::new();
        for entry in self.collections.iter() {
            let store = entry.value().store.read();
            let mut documents = HashMap::new();
            for (key, document) in store.documents() {
                documents.insert(key.key_string(), document.clone());
            }
            collections.insert(entry.key().clone(), documents);
        }

        let snapshot = Snapshot::new(collections);
        self.codec.dump(&snapshot, path)?;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Finalizes a mutation: marks the database dirty and, with autosync
    /// enabled, persists synchronously. Called after the write lock has been
    /// released.
    pub(crate) fn after_mutation(&self) -> FerriteResult<()> {
        self.dirty.store(true, Ordering::SeqCst);
        if self.autosync {
            if self.path.is_some() {
                self.sync()?;
            } else {
                log::warn!("Autosync is enabled but no snapshot path is configured");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::store::{JsonCodec, MessagePackCodec};
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ferrite-db-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_open_without_path_is_empty() {
        let db = Ferrite::builder().open();
        assert!(db.collection_names().is_empty());
        assert!(!db.is_dirty());
    }

    #[test]
    fn test_collection_is_created_on_demand() {
        let db = Ferrite::builder().open();
        assert!(!db.has_collection("users"));
        let users = db.collection("users");
        assert_eq!(users.name(), "users");
        assert!(db.has_collection("users"));
    }

    #[test]
    fn test_collection_handles_share_state() {
        let db = Ferrite::builder().open();
        db.collection("users")
            .insert_one(doc! { "_id": "1" })
            .unwrap();
        assert_eq!(db.collection("users").count(), 1);
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let db = Ferrite::builder().open();
        db.collection("users").insert_one(doc! { "x": 1 }).unwrap();
        assert!(db.is_dirty());
    }

    #[test]
    fn test_sync_without_path_fails() {
        let db = Ferrite::builder().open();
        let err = db.sync().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_sync_and_reload_round_trip() {
        let path = temp_path("roundtrip.db");

        let db = Ferrite::builder().path(&path).open();
        db.collection("authors")
            .insert_one(doc! { "_id": "1", "last": "Hughes" })
            .unwrap();
        db.collection("books")
            .insert_one(doc! { "_id": "b1", "title": "The Weary Blues" })
            .unwrap();
        db.sync().unwrap();
        assert!(!db.is_dirty());

        let reloaded = Ferrite::builder().path(&path).open();
        let mut names = reloaded.collection_names();
        names.sort();
        assert_eq!(names, vec!["authors", "books"]);
        assert_eq!(
            reloaded
                .collection("authors")
                .find(Some(&doc! { "last": "Hughes" }))
                .unwrap()
                .len(),
            1
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_codec_round_trip() {
        let path = temp_path("json-roundtrip.db");

        let db = Ferrite::builder().path(&path).codec(JsonCodec).open();
        db.collection("kv")
            .set("the-key", doc! { "payload": 7 })
            .unwrap();
        db.sync().unwrap();

        let reloaded = Ferrite::builder().path(&path).codec(JsonCodec).open();
        let fetched = reloaded.collection("kv").get("the-key").unwrap();
        assert_eq!(fetched.get("payload"), Some(&Value::Int(7)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_open_missing_file_degrades_to_empty() {
        let db = Ferrite::builder()
            .path(temp_path("does-not-exist.db"))
            .open();
        assert!(db.collection_names().is_empty());
    }

    #[test]
    fn test_open_corrupt_file_degrades_to_empty() {
        let path = temp_path("corrupt.db");
        fs::write(&path, b"garbage").unwrap();

        let db = Ferrite::builder().path(&path).open();
        assert!(db.collection_names().is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_codec_mismatch_degrades_to_empty() {
        let path = temp_path("mismatch.db");

        let db = Ferrite::builder().path(&path).codec(MessagePackCodec).open();
        db.collection("users").insert_one(doc! { "x": 1 }).unwrap();
        db.sync().unwrap();

        let reopened = Ferrite::builder().path(&path).codec(JsonCodec).open();
        assert!(reopened.collection_names().is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_autosync_persists_after_mutation() {
        let path = temp_path("autosync.db");

        let db = Ferrite::builder().path(&path).autosync(true).open();
        db.collection("users")
            .insert_one(doc! { "_id": "1", "name": "eve" })
            .unwrap();
        assert!(!db.is_dirty());

        let reloaded = Ferrite::builder().path(&path).open();
        assert_eq!(reloaded.collection("users").count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_legacy_flat_snapshot() {
        let path = temp_path("legacy.db");
        let legacy = r#"{
            "meta": { "timestamp": 1 },
            "documents": { "1": { "_id": "1", "x": 5 } }
        }"#;
        fs::write(&path, legacy).unwrap();

        let db = Ferrite::builder().path(&path).codec(JsonCodec).open();
        assert_eq!(db.collection_names(), vec!["default".to_string()]);
        assert_eq!(db.collection("default").count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rebuilds_key_from_document_id() {
        let path = temp_path("intkeys.db");
        // an integer primary key survives the string map key of the snapshot
        let snapshot = r#"{
            "collections": { "default": { "7": { "_id": 7, "x": 1 } } }
        }"#;
        fs::write(&path, snapshot).unwrap();

        let db = Ferrite::builder().path(&path).codec(JsonCodec).open();
        let fetched = db.collection("default").get(7i64);
        assert!(fetched.is_some());

        let _ = fs::remove_file(&path);
    }
}
