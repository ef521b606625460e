//! Rule engine facade
//!
//! Ties together configuration, a per-engine parse cache and the rule store
//! boundary. All methods take `&self`; one engine can serve many threads.

use crate::config::EngineConfig;
use crate::error::{ParseError, Result};
use crate::record::Record;
use crate::rule::{combine_asts, evaluate_with, parse, parse_strict, AstNode, ParseCache};
use crate::store::{RuleId, RuleStore};
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct RuleEngine {
    config: EngineConfig,
    cache: ParseCache,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = ParseCache::with_capacity(config.cache_capacity);
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a rule string into an AST (cached per rule string)
    #[instrument(skip(self))]
    pub fn create_rule(&self, rule: &str) -> Result<AstNode> {
        let parse_fn: fn(&str) -> std::result::Result<AstNode, ParseError> =
            if self.config.strict_lexing {
                parse_strict
            } else {
                parse
            };
        let ast = self.cache.get_or_insert_with(rule, parse_fn)?;
        Ok(AstNode::clone(&ast))
    }

    /// Parse every rule and join them with AND, left to right
    #[instrument(skip_all, fields(rules = rules.len()))]
    pub fn combine_rules<S: AsRef<str>>(&self, rules: &[S]) -> Result<AstNode> {
        let asts = rules
            .iter()
            .map(|r| self.create_rule(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let combined = combine_asts(asts)?;
        debug!(leaves = combined.leaf_count(), "rules combined");
        Ok(combined)
    }

    /// Evaluate an AST against a record under the configured missing-attribute policy
    pub fn evaluate_rule(&self, ast: &AstNode, record: &Record) -> Result<bool> {
        Ok(evaluate_with(ast, record, self.config.missing_attribute)?)
    }

    /// Parse a rule string and save it together with its source text
    #[instrument(skip(self, store))]
    pub fn store_rule(&self, store: &dyn RuleStore, rule: &str) -> Result<RuleId> {
        let ast = self.create_rule(rule)?;
        let id = store.save_rule(Some(rule), &ast)?;
        debug!(rule_id = %id, "rule stored");
        Ok(id)
    }

    #[instrument(skip(self, store))]
    pub fn retrieve_rule(&self, store: &dyn RuleStore, id: RuleId) -> Result<AstNode> {
        Ok(store.load(id)?)
    }

    /// Number of rule strings currently held in the parse cache
    pub fn cached_rules(&self) -> usize {
        self.cache.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
