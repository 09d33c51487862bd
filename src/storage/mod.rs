//! Storage layer for ledgerwise
//!
//! Each entity lives in its own JSON file under `data/`, held in memory by
//! a repository and written back atomically. The transaction repository is
//! the transaction store every derived figure is computed from.

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod savings_goals;
pub mod transactions;

pub use accounts::AccountRepository;
pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use savings_goals::SavingsGoalRepository;
pub use transactions::{TransactionQuery, TransactionRepository};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    pub budgets: BudgetRepository,
    pub savings_goals: SavingsGoalRepository,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            savings_goals: SavingsGoalRepository::new(paths.savings_goals_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load every repository from disk
    pub fn load_all(&mut self) -> LedgerResult<()> {
        self.accounts.load()?;
        self.transactions.load()?;
        self.categories.load()?;
        self.budgets.load()?;
        self.savings_goals.load()?;
        debug!(base = %self.paths.base_dir().display(), "storage loaded");
        Ok(())
    }

    /// Record the creation of an entity in the audit log
    ///
    /// Runs after the record is committed, so a failed audit write is
    /// logged and does not fail the operation.
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.write_audit(&entry);
    }

    /// Record an update of an entity in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) {
        let entry = AuditEntry::update(entity_type, entity_id, entity_name, before, after);
        self.write_audit(&entry);
    }

    /// Record the deletion of an entity in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::delete(entity_type, entity_id, entity_name, entity);
        self.write_audit(&entry);
    }

    fn write_audit(&self, entry: &AuditEntry) {
        if let Err(e) = self.audit.log(entry) {
            warn!(
                entity = %entry.entity_id,
                operation = ?entry.operation,
                error = %e,
                "audit entry not written"
            );
        }
    }
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> LedgerResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> LedgerResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.accounts.count().unwrap(), 0);
    }

    #[test]
    fn test_audit_helpers() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        storage.log_create(EntityType::Account, "acc-1", Some("Main".into()), &json!({"a": 1}));
        storage.log_update(EntityType::Account, "acc-1", None, &json!({"a": 1}), &json!({"a": 2}));

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Update);
        assert_eq!(entries[1].diff_summary.as_deref(), Some("a: 1 -> 2"));
    }

    #[test]
    fn test_audit_failure_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        // A directory where the log file should be makes every append fail
        std::fs::create_dir_all(paths.audit_log()).unwrap();
        let storage = Storage::new(paths).unwrap();

        storage.log_create(EntityType::Account, "acc-1", None, &json!({"a": 1}));
        assert!(storage.audit().log(&AuditEntry::create(
            EntityType::Account,
            "acc-1",
            None,
            &json!({"a": 1})
        ))
        .is_err());
    }
}
