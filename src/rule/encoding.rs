//! Serde representation of [`AstNode`]
//!
//! A tree is written as its nodes in postfix order, each operator after its
//! left and right sub-trees. Reading it back replays the list on a stack, so
//! neither direction recurses on tree depth.
//!
//! ```json
//! {"nodes": [
//!   {"type": "operand", "kind": "comparison", "attribute": "age",
//!    "comparator": ">", "literal": {"type": "integer", "value": 30}},
//!   {"type": "operand", "kind": "comparison", "attribute": "department",
//!    "comparator": "==", "literal": {"type": "text", "value": "Sales"}},
//!   {"type": "operator", "connective": "AND"}
//! ]}
//! ```
//!
//! Both directions only accept trees the parser could have produced:
//! attributes and text literals are single words and integers are
//! non-negative, so a decoded tree renders to a rule string that parses
//! back into it.

use crate::rule::ast::{AstNode, Comparison, LiteralValue, LogicalConnective, Operand};
use crate::rule::lexer::is_word;
use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum NodeRef<'a> {
    Operand(&'a Operand),
    Operator { connective: LogicalConnective },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Node {
    Operand(Operand),
    Operator { connective: LogicalConnective },
}

#[derive(Serialize)]
struct EncodedRef<'a> {
    nodes: Vec<NodeRef<'a>>,
}

#[derive(Deserialize)]
struct Encoded {
    nodes: Vec<Node>,
}

impl Serialize for AstNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes = postfix(self);
        for (index, node) in nodes.iter().enumerate() {
            if let NodeRef::Operand(operand) = node {
                check_operand(operand, index).map_err(ser::Error::custom)?;
            }
        }
        EncodedRef { nodes }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AstNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rebuild(Encoded::deserialize(deserializer)?.nodes)
    }
}

fn postfix(ast: &AstNode) -> Vec<NodeRef<'_>> {
    let mut nodes = Vec::new();
    // (node, sub-trees already written)
    let mut pending = vec![(ast, false)];

    while let Some((node, children_written)) = pending.pop() {
        match node {
            AstNode::Operand(operand) => nodes.push(NodeRef::Operand(operand)),
            AstNode::Operator { connective, .. } if children_written => {
                nodes.push(NodeRef::Operator {
                    connective: *connective,
                })
            }
            AstNode::Operator { left, right, .. } => {
                pending.push((node, true));
                pending.push((&**right, false));
                pending.push((&**left, false));
            }
        }
    }
    nodes
}

fn rebuild<E: de::Error>(nodes: Vec<Node>) -> Result<AstNode, E> {
    let mut stack: Vec<AstNode> = Vec::new();

    for (index, node) in nodes.into_iter().enumerate() {
        match node {
            Node::Operand(operand) => {
                check_operand(&operand, index).map_err(E::custom)?;
                stack.push(AstNode::Operand(operand));
            }
            Node::Operator { connective } => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(E::custom(format!(
                        "node {}: {} is missing an operand",
                        index, connective
                    )));
                };
                stack.push(AstNode::operator(connective, left, right));
            }
        }
    }

    match (stack.pop(), stack.len()) {
        (Some(root), 0) => Ok(root),
        (None, _) => Err(E::custom("rule has no nodes")),
        (Some(_), rest) => Err(E::custom(format!(
            "{} sub-trees are not joined by an operator",
            rest + 1
        ))),
    }
}

fn check_operand(operand: &Operand, index: usize) -> Result<(), String> {
    match operand {
        Operand::Integer { value } => check_integer(*value, index),
        Operand::Comparison(Comparison {
            attribute, literal, ..
        }) => {
            if !is_word(attribute) {
                return Err(format!(
                    "node {}: attribute '{}' is not a single word",
                    index, attribute
                ));
            }
            match literal {
                LiteralValue::Integer(value) => check_integer(*value, index),
                LiteralValue::Text(text) if !is_word(text) => Err(format!(
                    "node {}: text literal '{}' is not a single word",
                    index, text
                )),
                LiteralValue::Text(_) => Ok(()),
            }
        }
    }
}

fn check_integer(value: i64, index: usize) -> Result<(), String> {
    if value < 0 {
        return Err(format!("node {}: negative integer {}", index, value));
    }
    Ok(())
}
