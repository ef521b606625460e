//! Rule Engine Core - boolean business-rule compiler and evaluator
//!
//! Rule strings such as
//! `(age > 30 AND department == Sales) OR salary > 50000` are tokenized,
//! parsed into an AST with AND binding tighter than OR, optionally combined
//! into a single conjunction, and evaluated against attribute records.
//! Parsed trees can be persisted through the [`store::RuleStore`] boundary.
//!
//! ```
//! use rule_engine_core::{parse, evaluate, Record};
//!
//! let ast = parse("age > 30 AND department == Sales").unwrap();
//! let record = Record::new().with("age", 35).with("department", "Sales");
//! assert!(evaluate(&ast, &record).unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod rule;
pub mod store;

pub use config::{EngineConfig, MissingAttributePolicy};
pub use engine::RuleEngine;
pub use error::{EvaluationError, ParseError, Result, RuleEngineError, StoreError};
pub use record::{Record, Value};
pub use rule::{
    combine, evaluate, evaluate_with, parse, tokenize, AstNode, ComparatorKind, Comparison,
    LiteralKind, LiteralValue, LogicalConnective, Operand,
};
pub use store::{MemoryRuleStore, RuleId, RuleStore, SqliteRuleStore};
