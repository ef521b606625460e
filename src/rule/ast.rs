//! Abstract Syntax Tree for rule expressions

use serde::{Deserialize, Serialize};
use std::fmt;

/// AST node for rule expressions
///
/// Serialized as a flat postfix node list, see `rule::encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// Leaf, e.g. `age > 30`
    Operand(Operand),
    /// AND / OR joining exactly two sub-trees
    Operator {
        connective: LogicalConnective,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

impl AstNode {
    pub fn comparison(
        attribute: impl Into<String>,
        comparator: ComparatorKind,
        literal: impl Into<LiteralValue>,
    ) -> Self {
        AstNode::Operand(Operand::Comparison(Comparison {
            attribute: attribute.into(),
            comparator,
            literal: literal.into(),
        }))
    }

    pub fn operator(connective: LogicalConnective, left: AstNode, right: AstNode) -> Self {
        AstNode::Operator {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: AstNode, right: AstNode) -> Self {
        Self::operator(LogicalConnective::And, left, right)
    }

    pub fn or(left: AstNode, right: AstNode) -> Self {
        Self::operator(LogicalConnective::Or, left, right)
    }

    /// Attribute names referenced by the tree, left to right, without duplicates
    pub fn attributes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_attributes(&mut out);
        out
    }

    fn collect_attributes<'a>(&'a self, out: &mut Vec<&'a str>) {
        for leaf in self.leaves() {
            if let Operand::Comparison(cmp) = leaf {
                if !out.contains(&cmp.attribute.as_str()) {
                    out.push(&cmp.attribute);
                }
            }
        }
    }

    /// Number of operand leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Operand leaves, left to right
    pub fn leaves(&self) -> impl Iterator<Item = &Operand> + '_ {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            while let Some(node) = pending.pop() {
                match node {
                    AstNode::Operand(operand) => return Some(operand),
                    AstNode::Operator { left, right, .. } => {
                        pending.push(&**right);
                        pending.push(&**left);
                    }
                }
            }
            None
        })
    }
}

// Deep left-folded trees would otherwise drop recursively, one frame per level.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        detach_operator_children(self, &mut detached);
        while let Some(mut node) = detached.pop() {
            detach_operator_children(&mut node, &mut detached);
        }
    }
}

/// Move operator children out of `node`, leaving leaf placeholders behind.
fn detach_operator_children(node: &mut AstNode, out: &mut Vec<AstNode>) {
    if let AstNode::Operator { left, right, .. } = node {
        for child in [left, right] {
            if matches!(**child, AstNode::Operator { .. }) {
                let placeholder = AstNode::Operand(Operand::Integer { value: 0 });
                out.push(std::mem::replace(&mut **child, placeholder));
            }
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Operand(operand) => write!(f, "{}", operand),
            AstNode::Operator {
                connective,
                left,
                right,
            } => write!(f, "({} {} {})", left, connective, right),
        }
    }
}

/// Operand leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    /// `attribute comparator literal`
    Comparison(Comparison),
    /// An integer standing on its own, with no attribute or comparator
    Integer { value: i64 },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Comparison(cmp) => write!(f, "{}", cmp),
            Operand::Integer { value } => write!(f, "{}", value),
        }
    }
}

/// Single comparison expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub attribute: String,
    pub comparator: ComparatorKind,
    pub literal: LiteralValue,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.comparator, self.literal)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparatorKind {
    /// Greater than (>)
    #[serde(rename = ">")]
    Greater,
    /// Less than (<)
    #[serde(rename = "<")]
    Less,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    LessEqual,
    /// Equal (==)
    #[serde(rename = "==")]
    Equal,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    NotEqual,
}

impl ComparatorKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            ">=" => Some(Self::GreaterEqual),
            "<=" => Some(Self::LessEqual),
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalConnective {
    And,
    Or,
}

impl LogicalConnective {
    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            Self::And => 1,
            Self::Or => 0,
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalConnective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Literal value types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Integer(i64),
    Text(String),
}

impl LiteralValue {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Self::Integer(_) => LiteralKind::Integer,
            Self::Text(_) => LiteralKind::Text,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Value kind tag shared by literals and record values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Text,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
        }
    }
}
