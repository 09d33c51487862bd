//! Transaction repository for JSON storage
//!
//! This is the transaction store the balance resolver and budget aggregator
//! read from. A transfer is stored as one record carrying both legs, so no
//! reader can observe one leg without the other.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountId, CategoryId, Transaction, TransactionId, TransactionType, UserId,
};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Filter for [`TransactionRepository::query`]
///
/// Every field is optional; set fields are combined with AND. Date bounds
/// are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub user_id: Option<UserId>,
    pub account_id: Option<AccountId>,
    pub destination_account_id: Option<AccountId>,
    pub kind: Option<TransactionType>,
    pub category_id: Option<CategoryId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Transactions owned by (or sent from) an account
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Transfers received by an account
    pub fn destination(mut self, account_id: AccountId) -> Self {
        self.destination_account_id = Some(account_id);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Restrict to `[start, end]`
    pub fn between(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.from(start).to(end)
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.user_id.map_or(true, |u| txn.user_id == u)
            && self.account_id.map_or(true, |a| txn.account_id == a)
            && self
                .destination_account_id
                .map_or(true, |a| txn.destination_account_id() == Some(a))
            && self.kind.map_or(true, |k| txn.transaction_type() == k)
            && self.category_id.map_or(true, |c| txn.category_id == Some(c))
            && self.date_from.map_or(true, |d| txn.date >= d)
            && self.date_to.map_or(true, |d| txn.date <= d)
    }
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: owning account -> transaction ids
    by_account: RwLock<HashMap<AccountId, Vec<TransactionId>>>,
    /// Index: transfer destination -> transaction ids
    by_destination: RwLock<HashMap<AccountId, Vec<TransactionId>>>,
    /// Index: category -> transaction ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

type Index<K> = HashMap<K, Vec<TransactionId>>;

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_account: RwLock::new(HashMap::new()),
            by_destination: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_account = write_lock(&self.by_account)?;
        let mut by_destination = write_lock(&self.by_destination)?;
        let mut by_category = write_lock(&self.by_category)?;

        data.clear();
        by_account.clear();
        by_destination.clear();
        by_category.clear();

        for txn in file_data.transactions {
            index(&txn, &mut by_account, &mut by_destination, &mut by_category);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> LedgerResult<()> {
        let data = read_lock(&self.data)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// Transactions matching `query`, newest first
    pub fn query(&self, query: &TransactionQuery) -> LedgerResult<Vec<Transaction>> {
        let data = read_lock(&self.data)?;

        // Narrow with the most specific index available
        let candidates: Option<Vec<TransactionId>> = if let Some(account_id) = query.account_id {
            Some(lookup(&*read_lock(&self.by_account)?, &account_id))
        } else if let Some(account_id) = query.destination_account_id {
            Some(lookup(&*read_lock(&self.by_destination)?, &account_id))
        } else if let Some(category_id) = query.category_id {
            Some(lookup(&*read_lock(&self.by_category)?, &category_id))
        } else {
            None
        };

        let mut transactions: Vec<Transaction> = match candidates {
            Some(ids) => ids
                .iter()
                .filter_map(|id| data.get(id))
                .filter(|t| query.matches(t))
                .cloned()
                .collect(),
            None => data.values().filter(|t| query.matches(t)).cloned().collect(),
        };

        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    /// Insert or update a transaction in memory only
    pub fn upsert(&self, txn: Transaction) -> LedgerResult<()> {
        let mut data = write_lock(&self.data)?;
        let mut by_account = write_lock(&self.by_account)?;
        let mut by_destination = write_lock(&self.by_destination)?;
        let mut by_category = write_lock(&self.by_category)?;

        if let Some(old) = data.get(&txn.id) {
            unindex(old, &mut by_account, &mut by_destination, &mut by_category);
        }
        index(&txn, &mut by_account, &mut by_destination, &mut by_category);

        data.insert(txn.id, txn);
        Ok(())
    }

    /// Insert a new transaction and persist it
    ///
    /// If the file cannot be written the in-memory insert is undone, so the
    /// record is either fully stored or absent.
    pub fn insert(&self, txn: Transaction) -> LedgerResult<Transaction> {
        let id = txn.id;
        self.upsert(txn.clone())?;

        if let Err(e) = self.save() {
            warn!(transaction = %id, error = %e, "rolling back unsaved transaction");
            self.remove(id)?;
            return Err(e);
        }

        Ok(txn)
    }

    /// Replace a stored transaction and persist it, restoring the previous
    /// version if the file cannot be written
    pub fn update(&self, txn: Transaction) -> LedgerResult<Transaction> {
        let previous = self
            .get(txn.id)?
            .ok_or_else(|| LedgerError::transaction_not_found(txn.id.to_string()))?;
        self.upsert(txn.clone())?;

        if let Err(e) = self.save() {
            warn!(transaction = %txn.id, error = %e, "restoring unsaved transaction update");
            self.upsert(previous)?;
            return Err(e);
        }

        Ok(txn)
    }

    /// Delete a transaction and persist the removal, putting it back if the
    /// file cannot be written
    pub fn delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        let removed = self
            .remove(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        if let Err(e) = self.save() {
            warn!(transaction = %id, error = %e, "restoring unsaved transaction deletion");
            self.upsert(removed)?;
            return Err(e);
        }

        Ok(removed)
    }

    fn remove(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let mut data = write_lock(&self.data)?;
        let mut by_account = write_lock(&self.by_account)?;
        let mut by_destination = write_lock(&self.by_destination)?;
        let mut by_category = write_lock(&self.by_category)?;

        let removed = data.remove(&id);
        if let Some(txn) = &removed {
            unindex(txn, &mut by_account, &mut by_destination, &mut by_category);
        }
        Ok(removed)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}

fn lookup<K: std::hash::Hash + Eq>(index: &Index<K>, key: &K) -> Vec<TransactionId> {
    index.get(key).cloned().unwrap_or_default()
}

fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

fn index(
    txn: &Transaction,
    by_account: &mut Index<AccountId>,
    by_destination: &mut Index<AccountId>,
    by_category: &mut Index<CategoryId>,
) {
    by_account.entry(txn.account_id).or_default().push(txn.id);
    if let Some(dest) = txn.destination_account_id() {
        by_destination.entry(dest).or_default().push(txn.id);
    }
    if let Some(cat_id) = txn.category_id {
        by_category.entry(cat_id).or_default().push(txn.id);
    }
}

fn unindex(
    txn: &Transaction,
    by_account: &mut Index<AccountId>,
    by_destination: &mut Index<AccountId>,
    by_category: &mut Index<CategoryId>,
) {
    if let Some(ids) = by_account.get_mut(&txn.account_id) {
        ids.retain(|&id| id != txn.id);
    }
    if let Some(dest) = txn.destination_account_id() {
        if let Some(ids) = by_destination.get_mut(&dest) {
            ids.retain(|&id| id != txn.id);
        }
    }
    if let Some(cat_id) = txn.category_id {
        if let Some(ids) = by_category.get_mut(&cat_id) {
            ids.retain(|&id| id != txn.id);
        }
    }
}
