//! In-process rule store

use super::{codec, RuleId, RuleStore};
use crate::error::StoreError;
use crate::rule::AstNode;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
struct StoredRule {
    source: Option<String>,
    encoded_ast: String,
}

/// Thread-safe in-memory store. Ids are assigned sequentially from 1.
/// Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct MemoryRuleStore {
    rules: Arc<RwLock<AHashMap<RuleId, StoredRule>>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(AHashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore for MemoryRuleStore {
    #[instrument(skip(self, source, ast))]
    fn save_rule(&self, source: Option<&str>, ast: &AstNode) -> Result<RuleId, StoreError> {
        let encoded_ast = codec::encode(ast)?;
        let id = RuleId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.rules.write().insert(
            id,
            StoredRule {
                source: source.map(str::to_string),
                encoded_ast,
            },
        );

        debug!(rule_id = %id, "rule saved");
        Ok(id)
    }

    fn load(&self, id: RuleId) -> Result<AstNode, StoreError> {
        let rules = self.rules.read();
        match rules.get(&id) {
            Some(stored) => codec::decode(&stored.encoded_ast),
            None => {
                warn!(rule_id = %id, "rule not found");
                Err(StoreError::NotFound(id))
            }
        }
    }

    fn load_source(&self, id: RuleId) -> Result<Option<String>, StoreError> {
        self.rules
            .read()
            .get(&id)
            .map(|stored| stored.source.clone())
            .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self))]
    fn delete(&self, id: RuleId) -> Result<(), StoreError> {
        match self.rules.write().remove(&id) {
            Some(_) => {
                debug!(rule_id = %id, "rule deleted");
                Ok(())
            }
            None => {
                warn!(rule_id = %id, "delete of missing rule");
                Err(StoreError::NotFound(id))
            }
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.rules.read().len())
    }
}
