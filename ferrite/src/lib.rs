#![allow(dead_code)]
//! # Ferrite - Embedded Document Store
//!
//! Ferrite is a lightweight embedded document store written in Rust: an
//! in-memory mapping of documents keyed by a primary identifier, queryable
//! with a small Mongo-like filter language, optionally accelerated by
//! secondary hash indexes, with full-snapshot persistence to disk.
//!
//! ## Key Features
//!
//! - **Embedded**: No separate server process required
//! - **Schemaless**: Documents are dynamically-typed key-value maps
//! - **Querying**: `$and`/`$or`/`$nor`/`$not` connectives and
//!   `$eq`/`$gt`/`$gte`/`$lt`/`$lte`/`$ne`/`$in`/`$nin` comparators, with
//!   dot-path addressing into nested documents
//! - **Indexing**: Hash-equality indexes maintained incrementally on every
//!   mutation
//! - **Persistence**: Whole-store snapshots through interchangeable binary
//!   (MessagePack) and JSON codecs, with autosync support
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrite::doc;
//! use ferrite::ferrite::Ferrite;
//!
//! // create or open the database
//! let db = Ferrite::builder().path("authors.db").open();
//! let authors = db.collection("authors");
//!
//! // documents are just maps
//! authors.insert_one(doc! { "first": "Langston", "last": "Hughes", "born": 1902 })?;
//!
//! // find some entries
//! let results = authors.find(Some(&doc! { "born": doc! { "$gt": 1900 } }))?;
//!
//! // commit the changes to disk
//! db.sync()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, collection handles, and the identifier
//!   generator
//! - [`common`] - The value union, constants, and dot-path resolution
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - The query compiler, expression tree, and evaluator
//! - [`index`] - Secondary hash indexes
//! - [`store`] - The document store, snapshot shape, and codecs
//! - [`ferrite`] - The database front-end
//! - [`ferrite_builder`] - Database builder for initialization

pub mod collection;
pub mod common;
pub mod errors;
pub mod ferrite;
pub mod ferrite_builder;
pub mod filter;
pub mod index;
pub mod store;

pub use crate::common::{Value, DOC_ID};
