use crate::collection::Document;
use crate::common::DEFAULT_COLLECTION;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Snapshot metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Milliseconds since the Unix epoch at serialization time.
    pub timestamp: i64,
}

/// The serialized shape of a whole database:
/// `{ meta: { timestamp }, collections: { <name>: { <id>: <document> } } }`.
///
/// Collection maps key documents by the display form of their primary key;
/// the loader rebuilds the real key from each document's `_id` field, so the
/// key-to-document invariant survives codecs whose map keys must be strings.
///
/// Deserialization also accepts the legacy flat shape
/// `{ meta, documents: { <id>: <document> } }`, folding the flat document map
/// into the `default` collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub collections: HashMap<String, HashMap<String, Document>>,
}

impl Snapshot {
    /// Wraps the given collections with a current timestamp.
    pub fn new(collections: HashMap<String, HashMap<String, Document>>) -> Self {
        Snapshot {
            meta: SnapshotMeta {
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
            collections,
        }
    }
}

/// Both accepted on-disk shapes, prior to normalization.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    meta: Option<SnapshotMeta>,
    #[serde(default)]
    collections: Option<HashMap<String, HashMap<String, Document>>>,
    /// legacy flat shape
    #[serde(default)]
    documents: Option<HashMap<String, Document>>,
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D>(deserializer: D) -> Result<Snapshot, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawSnapshot::deserialize(deserializer)?;
        let collections = match (raw.collections, raw.documents) {
            (Some(collections), _) => collections,
            (None, Some(documents)) => {
                log::info!("Loading legacy flat snapshot into the default collection");
                let mut collections = HashMap::new();
                collections.insert(DEFAULT_COLLECTION.to_string(), documents);
                collections
            }
            (None, None) => HashMap::new(),
        };
        Ok(Snapshot {
            meta: raw.meta.unwrap_or(SnapshotMeta { timestamp: 0 }),
            collections,
        })
    }
}
