//! Secondary indexes over a document store.
//!
//! An index maps a field's value to the set of primary keys of documents
//! currently holding that value, giving equality lookups O(1)-class cost
//! instead of a full scan. Indexes are maintained incrementally on every
//! mutation and consulted by the query evaluator.

mod hash_index;
mod index_manager;

pub use hash_index::HashIndex;
pub use index_manager::{IndexKind, IndexManager};
