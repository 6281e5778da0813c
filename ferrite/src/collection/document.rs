use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, FerriteError, FerriteResult};
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Represents a document in the Ferrite database.
///
/// Ferrite documents are composed of key-value pairs. The key is always a
/// [String] and the value is a [Value]. Field insertion order is preserved,
/// which matters when a document is used as a query specification: the query
/// compiler walks the keys in their given order.
///
/// Documents support nested documents as well. A nested value can be
/// addressed with a dot-separated path: if a document holds `{"a": {"b": 1}}`,
/// the value inside the nested document is reachable as `a.b` through
/// [crate::common::resolve_path] and through query field names.
///
/// The `_id` field is the primary key of a document inside a collection. If
/// it is absent on insert, the collection assigns a generated identifier.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key in this document.
    ///
    /// If the key already exists its value is replaced. The key is stored
    /// verbatim - a key containing the field separator names a literal field,
    /// not a nested write.
    ///
    /// # Arguments
    ///
    /// * `key` - The field name. Cannot be empty.
    /// * `value` - The value to associate with the key. Can be any type that
    ///   implements `Into<Value>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) -> FerriteResult<()> {
        let key = key.into();
        // key cannot be empty
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(FerriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        self.data.insert(key, value.into());
        Ok(())
    }

    /// Raw insertion used by deserialization and merging, no key validation.
    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.data.insert(key, value);
    }

    /// Gets the value associated with the literal key, if any.
    ///
    /// This is a direct lookup only. Dot-path resolution into nested
    /// documents lives in [crate::common::resolve_path].
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Checks whether the document holds the literal field.
    pub fn contains_field(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes a field from the document, returning its previous value.
    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Returns the primary-key value of this document, if one is set.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    /// Shallow field-wise merge: every field of `patch` overwrites the
    /// corresponding field of this document; fields absent from `patch` are
    /// untouched. Patch keys are taken verbatim, nested values are not
    /// merged recursively.
    pub fn merge(&mut self, patch: &Document) {
        for (key, value) in patch.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Iterates the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Returns the field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // field order is irrelevant for equality, so hash in sorted key order
        let mut keys: Vec<&String> = self.data.keys().collect();
        keys.sort();
        for key in keys {
            key.hash(state);
            self.data[key.as_str()].hash(state);
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.data.iter())
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a ferrite document")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut document = Document::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            document.insert(key, value);
        }
        Ok(document)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Document, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Builds a [Document] from `"key": value` pairs.
///
/// Values can be any expression convertible into a [Value], including nested
/// `doc!` invocations:
///
/// ```ignore
/// let doc = doc! {
///     "name": "Alice",
///     "age": 30,
///     "address": doc! { "city": "Paris" },
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:literal : $value:expr),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($key, $value)
                    .expect("Failed to put value in document");
            )*
            doc
        }
    };
}
