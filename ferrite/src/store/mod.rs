//! The document store and its snapshot persistence.
//!
//! [DocumentStore] owns the primary-key-to-document mapping of one collection
//! together with its secondary indexes. [Snapshot] is the serialized shape of
//! a whole database, written and read through a [SnapshotCodec].

mod codec;
mod document_store;
mod snapshot;

pub use codec::{JsonCodec, MessagePackCodec, SnapshotCodec};
pub use document_store::DocumentStore;
pub use snapshot::{Snapshot, SnapshotMeta};
