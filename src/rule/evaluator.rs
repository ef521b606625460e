//! Rule evaluator
//!
//! Walks an AST depth-first, left side first, against a [`Record`].
//! AND and OR short-circuit; the first error encountered is returned.
//! The left spine is walked with an explicit stack, so long left-folded
//! chains such as the output of `combine` do not recurse.

use crate::config::MissingAttributePolicy;
use crate::error::EvaluationError;
use crate::record::{Record, Value};
use crate::rule::ast::{AstNode, ComparatorKind, Comparison, LiteralValue, LogicalConnective, Operand};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Evaluate an AST against a record; absent attributes are an error.
pub fn evaluate(ast: &AstNode, record: &Record) -> Result<bool, EvaluationError> {
    evaluate_with(ast, record, MissingAttributePolicy::Error)
}

/// Evaluate an AST against a record with an explicit missing-attribute policy.
pub fn evaluate_with(
    ast: &AstNode,
    record: &Record,
    missing: MissingAttributePolicy,
) -> Result<bool, EvaluationError> {
    let mut pending: SmallVec<[(LogicalConnective, &AstNode); 8]> = SmallVec::new();
    let mut node = ast;
    let mut result = loop {
        match node {
            AstNode::Operator {
                connective,
                left,
                right,
            } => {
                pending.push((*connective, &**right));
                node = &**left;
            }
            AstNode::Operand(Operand::Comparison(cmp)) => {
                break check_comparison(cmp, record, missing)?
            }
            AstNode::Operand(Operand::Integer { value }) => {
                return Err(EvaluationError::NotAComparison { value: *value })
            }
        }
    };

    // Innermost operator first
    while let Some((connective, right)) = pending.pop() {
        result = match (connective, result) {
            (LogicalConnective::And, false) => false,
            (LogicalConnective::Or, true) => true,
            _ => evaluate_with(right, record, missing)?,
        };
    }
    Ok(result)
}

fn check_comparison(
    cmp: &Comparison,
    record: &Record,
    missing: MissingAttributePolicy,
) -> Result<bool, EvaluationError> {
    let value = match (record.get(&cmp.attribute), missing) {
        (Some(value), _) => value,
        (None, MissingAttributePolicy::False) => return Ok(false),
        (None, MissingAttributePolicy::Error) => {
            return Err(EvaluationError::UnknownAttribute {
                attribute: cmp.attribute.clone(),
            })
        }
    };

    let ordering = match (value, &cmp.literal) {
        (Value::Integer(actual), LiteralValue::Integer(expected)) => actual.cmp(expected),
        // Text ordering is lexicographic by byte
        (Value::Text(actual), LiteralValue::Text(expected)) => actual.as_str().cmp(expected.as_str()),
        _ => {
            return Err(EvaluationError::TypeMismatch {
                attribute: cmp.attribute.clone(),
                expected: cmp.literal.kind(),
                actual: value.kind(),
            })
        }
    };

    Ok(apply(cmp.comparator, ordering))
}

#[inline]
fn apply(comparator: ComparatorKind, ordering: Ordering) -> bool {
    match comparator {
        ComparatorKind::Greater => ordering == Ordering::Greater,
        ComparatorKind::Less => ordering == Ordering::Less,
        ComparatorKind::GreaterEqual => ordering != Ordering::Less,
        ComparatorKind::LessEqual => ordering != Ordering::Greater,
        ComparatorKind::Equal => ordering == Ordering::Equal,
        ComparatorKind::NotEqual => ordering != Ordering::Equal,
    }
}
