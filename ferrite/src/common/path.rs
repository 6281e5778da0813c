use crate::collection::Document;
use crate::common::{Value, FIELD_SEPARATOR};

/// Resolves a field name against a document, with dot-path fallback.
///
/// Resolution first tries the field name as a literal key. Only when that
/// fails and the name contains the field separator is it split into segments
/// and walked through nested documents, one segment at a time. A document
/// that stores the literal key `"a.b"` therefore shadows the nested path.
///
/// Returns `None` when neither form resolves; callers treat that as a
/// non-match, never an error.
///
/// # Examples
///
/// ```ignore
/// let doc = doc! { "a": doc! { "b": 1 } };
/// assert_eq!(resolve_path(&doc, "a.b"), Some(&Value::Int(1)));
/// assert_eq!(resolve_path(&doc, "a.c"), None);
/// ```
pub fn resolve_path<'a>(document: &'a Document, field: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(field) {
        return Some(value);
    }

    if !field.contains(FIELD_SEPARATOR) {
        return None;
    }

    let mut segments = field.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        match current {
            Value::Document(nested) => {
                current = nested.get(segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}
