//! SQLite-backed rule store
//!
//! One row per rule: the rule text it was parsed from (if known) and the
//! structural JSON encoding of its AST. Every operation opens its own
//! connection and drops it before returning.

use super::{codec, RuleId, RuleStore};
use crate::error::StoreError;
use crate::rule::AstNode;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct SqliteRuleStore {
    db_path: PathBuf,
}

impl SqliteRuleStore {
    /// Open or create the database file and its `rules` table
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self { db_path };
        store.connect()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS rules (
                id INTEGER PRIMARY KEY,
                rule_string TEXT,
                rule_ast TEXT NOT NULL
            );
            "#,
        )?;

        debug!("rule store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

impl RuleStore for SqliteRuleStore {
    #[instrument(skip(self, source, ast))]
    fn save_rule(&self, source: Option<&str>, ast: &AstNode) -> Result<RuleId, StoreError> {
        let encoded_ast = codec::encode(ast)?;
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO rules (rule_string, rule_ast) VALUES (?1, ?2)",
            params![source, encoded_ast],
        )?;
        let id = RuleId(conn.last_insert_rowid());

        debug!(rule_id = %id, "rule saved");
        Ok(id)
    }

    fn load(&self, id: RuleId) -> Result<AstNode, StoreError> {
        let encoded: Option<String> = self
            .connect()?
            .query_row("SELECT rule_ast FROM rules WHERE id = ?1", [id.0], |row| {
                row.get(0)
            })
            .optional()?;

        match encoded {
            Some(encoded) => codec::decode(&encoded),
            None => {
                warn!(rule_id = %id, "rule not found");
                Err(StoreError::NotFound(id))
            }
        }
    }

    fn load_source(&self, id: RuleId) -> Result<Option<String>, StoreError> {
        self.connect()?
            .query_row(
                "SELECT rule_string FROM rules WHERE id = ?1",
                [id.0],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self))]
    fn delete(&self, id: RuleId) -> Result<(), StoreError> {
        let removed = self
            .connect()?
            .execute("DELETE FROM rules WHERE id = ?1", [id.0])?;

        if removed == 0 {
            warn!(rule_id = %id, "delete of missing rule");
            return Err(StoreError::NotFound(id));
        }
        debug!(rule_id = %id, "rule deleted");
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .connect()?
            .query_row("SELECT COUNT(*) FROM rules", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
