use crate::collection::Document;
use crate::common::{resolve_path, Value, DOC_ID};
use crate::filter::{ComparisonOp, Expression, LogicalKind};
use crate::index::IndexManager;
use std::collections::HashMap;

/// Executes a compiled expression list against a document set.
///
/// Three strategies are tried in priority order:
///
/// 1. **Primary-key shortcut** - exactly one [Expression::Equality] node on
///    the primary-key field resolves with a single O(1) key lookup.
/// 2. **Index shortcut** - exactly one top-level equality condition (an
///    Equality node or a `$eq` Comparison) whose field carries a live index
///    resolves candidates through the index bucket. Because exactly one
///    condition was expressed, the candidate set is already final.
/// 3. **Full scan** - every document is tested against the top-level nodes
///    left-to-right with implicit AND semantics, short-circuiting at the
///    first non-matching node.
///
/// The optional caller-supplied predicate is applied after structural
/// evaluation on the scan path and can exclude a document the tree matched.
///
/// Evaluation never fails: unresolved fields and type-incompatible
/// comparisons make the affected node false.
pub fn execute(
    expressions: &[Expression],
    documents: &HashMap<Value, Document>,
    indexes: &IndexManager,
    predicate: Option<&dyn Fn(&Document) -> bool>,
) -> Vec<Document> {
    // fast path: single equality on the primary key
    if let [Expression::Equality { field, value }] = expressions {
        if field == DOC_ID {
            log::debug!("Primary-key lookup for {}", value);
            return documents.get(value).cloned().into_iter().collect();
        }
    }

    // fast path: single equality condition on an indexed field
    if let [expression] = expressions {
        if let Some((field, value)) = equality_condition(expression) {
            if let Some(keys) = indexes.lookup(field, value) {
                log::debug!("Index lookup on field {} for {}", field, value);
                return keys
                    .iter()
                    .filter_map(|key| documents.get(key).cloned())
                    .collect();
            }
        }
    }

    let mut results = Vec::new();
    for document in documents.values() {
        let mut matches = true;
        for expression in expressions {
            matches = evaluate(expression, document);
            if !matches {
                break;
            }
        }
        if matches {
            if let Some(predicate) = predicate {
                matches = predicate(document);
            }
        }
        if matches {
            results.push(document.clone());
        }
    }
    results
}

/// Extracts `(field, literal)` from a node expressing a plain equality
/// condition, if it is one.
fn equality_condition(expression: &Expression) -> Option<(&str, &Value)> {
    match expression {
        Expression::Equality { field, value } => Some((field, value)),
        Expression::Comparison {
            field,
            op: ComparisonOp::Eq,
            value,
        } => Some((field, value)),
        _ => None,
    }
}

/// Evaluates a single expression node against a document.
fn evaluate(expression: &Expression, document: &Document) -> bool {
    match expression {
        Expression::Equality { field, value } => match resolve_path(document, field) {
            Some(actual) => actual == value,
            None => false,
        },
        Expression::Comparison { field, op, value } => match resolve_path(document, field) {
            Some(actual) => op.apply(actual, value),
            None => false,
        },
        Expression::Logical { kind, children } => evaluate_logical(*kind, children, document),
    }
}

fn evaluate_logical(kind: LogicalKind, children: &[Expression], document: &Document) -> bool {
    match kind {
        LogicalKind::And => {
            for child in children {
                if !evaluate(child, document) {
                    return false;
                }
            }
            true
        }
        LogicalKind::Or => {
            for child in children {
                if evaluate(child, document) {
                    return true;
                }
            }
            false
        }
        LogicalKind::Nor => {
            for child in children {
                if evaluate(child, document) {
                    return false;
                }
            }
            true
        }
        LogicalKind::Not => {
            // negated conjunction: evaluate children in order, stopping at the
            // first non-matching one, then negate the accumulated result -
            // not a per-child negation
            let mut matches = true;
            for child in children {
                matches = evaluate(child, document);
                if !matches {
                    break;
                }
            }
            !matches
        }
    }
}
