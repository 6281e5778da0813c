use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, FerriteError, FerriteResult};
use crate::filter::{ComparisonOp, Expression, ExpressionList, LogicalKind};
use smallvec::SmallVec;

/// Compiles a query specification into an expression list.
///
/// The specification's keys are walked in their given order. Each entry
/// becomes one node:
///
/// * a logical keyword (`$and`, `$or`, `$nor`, `$not`) whose value is a
///   sequence of sub-specifications compiles each sub-specification
///   recursively into a single flattened child list, wrapped in a
///   [Expression::Logical] node;
/// * a mapping value is read as `{operator: literal}` - only the first entry
///   is considered - and becomes a [Expression::Comparison] node;
/// * any other value becomes an [Expression::Equality] node.
///
/// The top-level list has implicit AND semantics among its members.
///
/// Compilation is pure and does no I/O. Malformed shapes degrade into nodes
/// that are resolved lazily at evaluation time: a logical keyword whose value
/// is not a sequence compiles to a connective over an empty child list, and
/// an empty operator mapping compiles to a node that can never match. The
/// one hard failure is an operator token outside the closed table, which is
/// rejected here rather than deferred to a silent non-match.
///
/// # Errors
///
/// Returns `ErrorKind::FilterError` when an `{operator: literal}` entry names
/// an unknown operator.
pub fn compile(spec: &Document) -> FerriteResult<ExpressionList> {
    let mut expressions = Vec::new();
    compile_into(spec, &mut expressions)?;
    Ok(SmallVec::from_vec(expressions))
}

fn compile_into(spec: &Document, expressions: &mut Vec<Expression>) -> FerriteResult<()> {
    for (key, value) in spec.iter() {
        if let Some(kind) = LogicalKind::from_token(key) {
            expressions.push(Expression::Logical {
                kind,
                children: compile_children(key, value)?,
            });
        } else if let Value::Document(operator_spec) = value {
            expressions.push(compile_comparison(key, operator_spec)?);
        } else {
            expressions.push(Expression::Equality {
                field: key.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Compiles the sub-specifications of a logical keyword into one flattened
/// child expression list.
fn compile_children(keyword: &str, value: &Value) -> FerriteResult<Vec<Expression>> {
    let mut children = Vec::new();
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Document(sub_spec) => compile_into(sub_spec, &mut children)?,
                    other => {
                        log::debug!(
                            "Skipping non-document entry {} under {}",
                            other,
                            keyword
                        );
                    }
                }
            }
        }
        other => {
            log::debug!(
                "Logical keyword {} expects a sequence, got {}; compiling empty child list",
                keyword,
                other
            );
        }
    }
    Ok(children)
}

fn compile_comparison(field: &str, operator_spec: &Document) -> FerriteResult<Expression> {
    match operator_spec.iter().next() {
        Some((token, literal)) => match ComparisonOp::from_token(token) {
            Some(op) => Ok(Expression::Comparison {
                field: field.to_string(),
                op,
                value: literal.clone(),
            }),
            None => {
                log::error!("Unknown comparison operator {} on field {}", token, field);
                Err(FerriteError::new(
                    &format!("Unknown comparison operator: {}", token),
                    ErrorKind::FilterError,
                ))
            }
        },
        // an empty operator mapping can never match; an empty disjunction
        // expresses that without leaving the closed node set
        None => Ok(Expression::Logical {
            kind: LogicalKind::Or,
            children: Vec::new(),
        }),
    }
}
