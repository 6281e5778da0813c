//! Collections and documents for schemaless data storage.
//!
//! A [Document] is a key-value map where keys are strings and values are
//! [crate::common::Value] objects. Nested fields are addressed with a
//! dot-separated path (e.g. `address.city`).
//!
//! A [Collection] is a handle over one named document store inside a
//! [crate::ferrite::Ferrite] database. It exposes the full operation surface:
//!
//! ```rust,ignore
//! use ferrite::doc;
//! use ferrite::ferrite::Ferrite;
//!
//! let db = Ferrite::builder().open();
//! let authors = db.collection("authors");
//!
//! authors.insert_one(doc! { "first": "Langston", "last": "Hughes", "born": 1902 })?;
//! let results = authors.find(Some(&doc! { "last": "Hughes" }))?;
//! ```

mod collection;
pub mod document;
pub mod oid;

pub use collection::{Collection, CollectionState};
pub use document::Document;
pub use oid::OidGenerator;
