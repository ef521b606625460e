//! Rule persistence boundary
//!
//! A store saves ASTs under a [`RuleId`] and loads them back. Stores keep
//! the structural JSON encoding from [`codec`], so a loaded tree is
//! structurally equal to the one that was saved.

pub mod codec;
mod memory;
mod sqlite;

pub use memory::MemoryRuleStore;
pub use sqlite::SqliteRuleStore;

use crate::error::StoreError;
use crate::rule::AstNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by a store on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub i64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RuleId {
    fn from(id: i64) -> Self {
        RuleId(id)
    }
}

pub trait RuleStore: Send + Sync {
    /// Persist an AST, optionally alongside the rule text it was parsed from.
    fn save_rule(&self, source: Option<&str>, ast: &AstNode) -> Result<RuleId, StoreError>;

    /// Load a previously saved AST; `StoreError::NotFound` if the id is unknown.
    fn load(&self, id: RuleId) -> Result<AstNode, StoreError>;

    /// Rule text saved with the AST, if any.
    fn load_source(&self, id: RuleId) -> Result<Option<String>, StoreError>;

    fn delete(&self, id: RuleId) -> Result<(), StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn save(&self, ast: &AstNode) -> Result<RuleId, StoreError> {
        self.save_rule(None, ast)
    }
}
