//! Rule parsing cache - keyed by rule string, fast hashing

use crate::error::{ParseError, Result};
use crate::record::Record;
use crate::rule::ast::AstNode;
use crate::rule::evaluator;
use crate::rule::parser;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 256;

/// Memoised `rule string -> AST`. Failed parses are not cached.
///
/// Holds at most `capacity` rules; inserting past that evicts an arbitrary
/// entry. A capacity of zero disables caching.
#[derive(Debug)]
pub struct ParseCache {
    entries: RwLock<AHashMap<String, Arc<AstNode>>>,
    capacity: usize,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached AST for `rule`, or build it with `parse_fn` and cache it.
    pub fn get_or_insert_with<F>(
        &self,
        rule: &str,
        parse_fn: F,
    ) -> std::result::Result<Arc<AstNode>, ParseError>
    where
        F: FnOnce(&str) -> std::result::Result<AstNode, ParseError>,
    {
        // Fast path: read lock only
        if let Some(ast) = self.entries.read().get(rule) {
            return Ok(Arc::clone(ast));
        }

        debug!(rule, "parse cache miss");
        let ast = Arc::new(parse_fn(rule)?);

        if self.capacity == 0 {
            return Ok(ast);
        }

        let mut entries = self.entries.write();
        // Another caller may have raced us here; keep the first entry
        if let Some(existing) = entries.get(rule) {
            return Ok(Arc::clone(existing));
        }
        if entries.len() >= self.capacity {
            if let Some(evicted) = entries.keys().next().cloned() {
                debug!(rule = %evicted, "parse cache full, evicting");
                entries.remove(&evicted);
            }
        }
        entries.insert(rule.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Process-wide cache used by the free functions below
static SHARED_CACHE: Lazy<ParseCache> = Lazy::new(|| ParseCache::with_capacity(2048));

/// Get or parse a rule string, using the shared cache for repeated rules
#[inline]
pub fn get_or_parse(rule: &str) -> Result<Arc<AstNode>> {
    Ok(SHARED_CACHE.get_or_insert_with(rule, parser::parse)?)
}

/// Parse (cached) and evaluate a rule string against a record
#[inline]
pub fn check_rule(rule: &str, record: &Record) -> Result<bool> {
    let ast = get_or_parse(rule)?;
    Ok(evaluator::evaluate(&ast, record)?)
}

/// Clear the shared cache
pub fn clear_cache() {
    SHARED_CACHE.clear();
}

/// Number of rule strings in the shared cache
pub fn cache_size() -> usize {
    SHARED_CACHE.len()
}
