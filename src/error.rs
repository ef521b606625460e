//! Error types for the rule engine

use crate::rule::{LiteralKind, LogicalConnective};
use crate::store::RuleId;
use thiserror::Error;

/// Malformed rule text. Offsets are byte offsets into the rule string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("incomplete comparison after '{attribute}' at offset {offset}: {reason}")]
    IncompleteComparison {
        attribute: String,
        offset: usize,
        reason: String,
    },

    #[error("mismatched parenthesis at offset {offset}")]
    MismatchedParen { offset: usize },

    #[error("expected exactly one expression, found {found}")]
    EmptyExpression { found: usize },

    #[error("unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("'{connective}' at offset {offset} is missing an operand")]
    MissingOperand {
        connective: LogicalConnective,
        offset: usize,
    },

    #[error("integer literal '{text}' at offset {offset} does not fit in 64 bits")]
    InvalidInteger { text: String, offset: usize },

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

/// A well-formed rule that cannot be applied to a given record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("unknown attribute: {attribute}")]
    UnknownAttribute { attribute: String },

    #[error("type mismatch on '{attribute}': literal is {expected}, record value is {actual}")]
    TypeMismatch {
        attribute: String,
        expected: LiteralKind,
        actual: LiteralKind,
    },

    #[error("bare integer {value} is not a comparison")]
    NotAComparison { value: i64 },
}

/// Failures at the rule store boundary
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("rule not found: {0}")]
    NotFound(RuleId),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("AST encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for the rule engine
#[derive(Error, Debug)]
pub enum RuleEngineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cannot combine an empty rule set")]
    EmptyRuleSet,

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleEngineError>;
