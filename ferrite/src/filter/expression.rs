use crate::common::{Value, AND_KEY, NOR_KEY, NOT_KEY, OR_KEY};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A compiled query, as produced by [crate::filter::compile].
///
/// Most queries carry only a handful of top-level conditions, so the list is
/// inlined up to four expressions before spilling to the heap.
pub type ExpressionList = SmallVec<[Expression; 4]>;

/// The comparison operators supported in `{field: {operator: literal}}`
/// expressions.
///
/// The operator table is closed: compilation resolves operator tokens through
/// [ComparisonOp::from_token] and rejects anything else outright, and every
/// comparator below is matched exhaustively - there is no fallback arm to
/// silently swallow an unhandled case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `$eq` - equal
    Eq,
    /// `$gt` - greater than
    Gt,
    /// `$gte` - greater than or equal
    Gte,
    /// `$lt` - less than
    Lt,
    /// `$lte` - less than or equal
    Lte,
    /// `$ne` - not equal
    Ne,
    /// `$in` - member of the literal sequence
    In,
    /// `$nin` - not a member of the literal sequence
    Nin,
}

impl ComparisonOp {
    /// Resolves an operator token from a query specification.
    ///
    /// Returns `None` for tokens outside the closed table; the compiler turns
    /// that into a hard error.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "$eq" => Some(ComparisonOp::Eq),
            "$gt" => Some(ComparisonOp::Gt),
            "$gte" => Some(ComparisonOp::Gte),
            "$lt" => Some(ComparisonOp::Lt),
            "$lte" => Some(ComparisonOp::Lte),
            "$ne" => Some(ComparisonOp::Ne),
            "$in" => Some(ComparisonOp::In),
            "$nin" => Some(ComparisonOp::Nin),
            _ => None,
        }
    }

    /// The operator token as written in a query specification.
    pub fn token(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::In => "$in",
            ComparisonOp::Nin => "$nin",
        }
    }

    /// Applies the comparator to a resolved field value and the query literal.
    ///
    /// Any type incompatibility yields `false`, never an error: an unordered
    /// pair fails the ordering comparators, and a non-array literal fails the
    /// membership comparators. `$ne` is the one exception - two values of
    /// unrelated types are genuinely not equal.
    pub fn apply(&self, actual: &Value, literal: &Value) -> bool {
        match self {
            ComparisonOp::Eq => actual == literal,
            ComparisonOp::Ne => actual != literal,
            ComparisonOp::Gt => actual.compare(literal) == Some(Ordering::Greater),
            ComparisonOp::Gte => matches!(
                actual.compare(literal),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            ComparisonOp::Lt => actual.compare(literal) == Some(Ordering::Less),
            ComparisonOp::Lte => matches!(
                actual.compare(literal),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
            ComparisonOp::In => match literal.as_array() {
                Some(items) => items.contains(actual),
                None => false,
            },
            ComparisonOp::Nin => match literal.as_array() {
                Some(items) => !items.contains(actual),
                None => false,
            },
        }
    }
}

/// The logical connectives over lists of sub-expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalKind {
    /// `$and` - all children must match
    And,
    /// `$or` - at least one child must match
    Or,
    /// `$nor` - no child may match
    Nor,
    /// `$not` - negated conjunction over the child list
    Not,
}

impl LogicalKind {
    /// Resolves a logical keyword from a query specification.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            AND_KEY => Some(LogicalKind::And),
            OR_KEY => Some(LogicalKind::Or),
            NOR_KEY => Some(LogicalKind::Nor),
            NOT_KEY => Some(LogicalKind::Not),
            _ => None,
        }
    }

    /// The keyword as written in a query specification.
    pub fn token(&self) -> &'static str {
        match self {
            LogicalKind::And => AND_KEY,
            LogicalKind::Or => OR_KEY,
            LogicalKind::Nor => NOR_KEY,
            LogicalKind::Not => NOT_KEY,
        }
    }
}

/// A single node of a compiled query.
///
/// An expression tree is an ordered sequence of these nodes; a top-level list
/// has implicit AND semantics among its members. Logical nodes carry the
/// flattened expression list compiled from their sub-specifications.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// `{field: literal}` - the resolved field value must equal the literal.
    Equality { field: String, value: Value },
    /// `{field: {operator: literal}}` - the resolved field value must satisfy
    /// the comparator.
    Comparison {
        field: String,
        op: ComparisonOp,
        value: Value,
    },
    /// `{$kind: [sub-spec, ...]}` - a logical connective over the expressions
    /// compiled from the sub-specifications.
    Logical {
        kind: LogicalKind,
        children: Vec<Expression>,
    },
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Equality { field, value } => write!(f, "({} == {})", field, value),
            Expression::Comparison { field, op, value } => {
                write!(f, "({} {} {})", field, op.token(), value)
            }
            Expression::Logical { kind, children } => {
                write!(f, "({}", kind.token())?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_covers_closed_table() {
        assert_eq!(ComparisonOp::from_token("$eq"), Some(ComparisonOp::Eq));
        assert_eq!(ComparisonOp::from_token("$gt"), Some(ComparisonOp::Gt));
        assert_eq!(ComparisonOp::from_token("$gte"), Some(ComparisonOp::Gte));
        assert_eq!(ComparisonOp::from_token("$lt"), Some(ComparisonOp::Lt));
        assert_eq!(ComparisonOp::from_token("$lte"), Some(ComparisonOp::Lte));
        assert_eq!(ComparisonOp::from_token("$ne"), Some(ComparisonOp::Ne));
        assert_eq!(ComparisonOp::from_token("$in"), Some(ComparisonOp::In));
        assert_eq!(ComparisonOp::from_token("$nin"), Some(ComparisonOp::Nin));
        assert_eq!(ComparisonOp::from_token("$regex"), None);
        assert_eq!(ComparisonOp::from_token("name"), None);
    }

    #[test]
    fn test_ordering_comparators() {
        assert!(ComparisonOp::Gt.apply(&Value::Int(10), &Value::Int(6)));
        assert!(!ComparisonOp::Gt.apply(&Value::Int(5), &Value::Int(6)));
        assert!(ComparisonOp::Gte.apply(&Value::Int(6), &Value::Int(6)));
        assert!(ComparisonOp::Lt.apply(&Value::Float(1.5), &Value::Int(2)));
        assert!(ComparisonOp::Lte.apply(&Value::Int(2), &Value::Float(2.0)));
    }

    #[test]
    fn test_eq_and_ne() {
        assert!(ComparisonOp::Eq.apply(&Value::from("a"), &Value::from("a")));
        assert!(!ComparisonOp::Eq.apply(&Value::from("a"), &Value::Int(1)));
        assert!(ComparisonOp::Ne.apply(&Value::from("a"), &Value::Int(1)));
        assert!(!ComparisonOp::Ne.apply(&Value::Int(3), &Value::Float(3.0)));
    }

    #[test]
    fn test_incompatible_types_fail_ordering() {
        assert!(!ComparisonOp::Gt.apply(&Value::from("10"), &Value::Int(6)));
        assert!(!ComparisonOp::Lt.apply(&Value::Null, &Value::Int(6)));
        assert!(!ComparisonOp::Gte.apply(&Value::Bool(true), &Value::Int(0)));
    }

    #[test]
    fn test_membership_comparators() {
        let haystack = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(ComparisonOp::In.apply(&Value::Int(2), &haystack));
        assert!(!ComparisonOp::In.apply(&Value::Int(9), &haystack));
        assert!(ComparisonOp::Nin.apply(&Value::Int(9), &haystack));
        assert!(!ComparisonOp::Nin.apply(&Value::Int(2), &haystack));
    }

    #[test]
    fn test_membership_against_non_array_literal_fails() {
        assert!(!ComparisonOp::In.apply(&Value::Int(1), &Value::Int(1)));
        assert!(!ComparisonOp::Nin.apply(&Value::Int(1), &Value::Int(2)));
    }

    #[test]
    fn test_logical_kind_tokens() {
        assert_eq!(LogicalKind::from_token("$and"), Some(LogicalKind::And));
        assert_eq!(LogicalKind::from_token("$or"), Some(LogicalKind::Or));
        assert_eq!(LogicalKind::from_token("$nor"), Some(LogicalKind::Nor));
        assert_eq!(LogicalKind::from_token("$not"), Some(LogicalKind::Not));
        assert_eq!(LogicalKind::from_token("$xor"), None);
        assert_eq!(LogicalKind::And.token(), "$and");
    }

    #[test]
    fn test_expression_display() {
        let expr = Expression::Comparison {
            field: "age".to_string(),
            op: ComparisonOp::Gt,
            value: Value::Int(21),
        };
        assert_eq!(format!("{}", expr), "(age $gt 21)");

        let logical = Expression::Logical {
            kind: LogicalKind::Or,
            children: vec![
                Expression::Equality {
                    field: "a".to_string(),
                    value: Value::Int(1),
                },
                Expression::Equality {
                    field: "b".to_string(),
                    value: Value::Int(2),
                },
            ],
        };
        assert_eq!(format!("{}", logical), "($or (a == 1) (b == 2))");
    }
}
