//! Transaction service
//!
//! The single write path for transactions, plus read-side statistics.
//! Adjustments are bookkeeping, not activity, so every statistic here
//! leaves them out.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountId, CategoryId, CategoryKind, Money, Transaction, TransactionId, TransactionKind,
    TransactionType, UserId,
};
use crate::storage::{Storage, TransactionQuery};

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Totals for one transaction type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    /// Sum of amounts dated on or before today
    pub total: Money,
    pub count: usize,
    /// Sum of amounts dated after today
    pub future: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionStats {
    pub income: TypeStats,
    pub expense: TypeStats,
    pub transfer: TypeStats,
    /// `income.total - expense.total`
    pub net: Money,
}

/// Income and expense of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

/// Fields to change on an existing transaction; `None` keeps the value
///
/// The kind and accounts are fixed once recorded.
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<CategoryId>>,
    pub description: Option<String>,
}

/// Spending or earning grouped under one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub total: Money,
    pub count: usize,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate and store a transaction
    ///
    /// A transfer is one record, so both of its legs become visible together.
    pub fn record(&self, txn: Transaction) -> LedgerResult<Transaction> {
        self.check(&txn)?;

        let txn = self.storage.transactions.insert(txn)?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        );
        info!(
            transaction = %txn.id,
            account = %txn.account_id,
            kind = %txn.transaction_type(),
            amount = %txn.amount,
            "recorded transaction"
        );

        Ok(txn)
    }

    /// Apply `edit` to a stored transaction, under the same rules as `record`
    pub fn update(&self, id: TransactionId, edit: TransactionEdit) -> LedgerResult<Transaction> {
        let before = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        let mut txn = before.clone();
        if let Some(date) = edit.date {
            txn.date = date;
        }
        if let Some(amount) = edit.amount {
            txn.amount = amount;
        }
        if let Some(category_id) = edit.category_id {
            txn.category_id = category_id;
        }
        if let Some(description) = edit.description {
            txn.description = description.trim().to_string();
        }
        txn.updated_at = Utc::now();

        self.check(&txn)?;
        let txn = self.storage.transactions.update(txn)?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &before,
            &txn,
        );
        info!(transaction = %txn.id, "updated transaction");

        Ok(txn)
    }

    /// Remove a transaction; every balance and budget figure drops it at once
    pub fn delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        let txn = self.storage.transactions.delete(id)?;

        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        );
        info!(transaction = %txn.id, "deleted transaction");

        Ok(txn)
    }

    /// Rules a stored transaction must satisfy, checked on every write
    fn check(&self, txn: &Transaction) -> LedgerResult<()> {
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let account = self
            .storage
            .accounts
            .get(txn.account_id)?
            .ok_or_else(|| LedgerError::account_not_found(txn.account_id.to_string()))?;

        if account.user_id != txn.user_id {
            return Err(LedgerError::account_not_found(txn.account_id.to_string()));
        }
        if !account.active {
            return Err(LedgerError::Validation(format!(
                "Cannot add transactions to inactive account '{}'",
                account.name
            )));
        }

        if let Some(destination_id) = txn.destination_account_id() {
            let destination = self
                .storage
                .accounts
                .get(destination_id)?
                .filter(|a| a.user_id == txn.user_id)
                .ok_or_else(|| LedgerError::account_not_found(destination_id.to_string()))?;

            if !destination.active {
                return Err(LedgerError::Validation(format!(
                    "Cannot transfer to inactive account '{}'",
                    destination.name
                )));
            }
        }

        if let Some(category_id) = txn.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .filter(|c| c.user_id == txn.user_id)
                .ok_or_else(|| LedgerError::category_not_found(category_id.to_string()))?;

            let expected = match txn.kind {
                TransactionKind::Income => CategoryKind::Income,
                _ => CategoryKind::Expense,
            };
            if category.kind != expected {
                return Err(LedgerError::Validation(format!(
                    "Category '{}' is for {} transactions, not {}",
                    category.name,
                    category.kind.to_string().to_lowercase(),
                    txn.transaction_type().to_string().to_lowercase()
                )));
            }
        }

        Ok(())
    }

    /// Transactions matching `query`, newest first, at most `limit`
    pub fn list(&self, query: &TransactionQuery, limit: Option<usize>) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = self.storage.transactions.query(query)?;
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    /// Find one of the user's transactions by full or short id
    pub fn find(&self, user_id: UserId, identifier: &str) -> LedgerResult<Transaction> {
        self.storage
            .transactions
            .query(&TransactionQuery::new().user(user_id))?
            .into_iter()
            .find(|t| t.id.matches(identifier))
            .ok_or_else(|| LedgerError::transaction_not_found(identifier))
    }

    /// Everything touching an account: its own transactions and transfers it
    /// received, narrowed by `query`, newest first
    pub fn list_for_account(
        &self,
        account_id: AccountId,
        query: &TransactionQuery,
        limit: Option<usize>,
    ) -> LedgerResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .storage
            .transactions
            .query(query)?
            .into_iter()
            .filter(|t| t.touches(account_id))
            .collect();
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    /// Per-type totals, split into current and future amounts
    pub fn stats(
        &self,
        user_id: UserId,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> LedgerResult<TransactionStats> {
        let mut stats = TransactionStats::default();

        for txn in self.storage.transactions.query(&ranged(user_id, date_from, date_to))? {
            let bucket = match txn.transaction_type() {
                TransactionType::Income => &mut stats.income,
                TransactionType::Expense => &mut stats.expense,
                TransactionType::Transfer => &mut stats.transfer,
                TransactionType::Adjustment => continue,
            };

            if txn.date <= today {
                bucket.total += txn.amount;
                bucket.count += 1;
            } else {
                bucket.future += txn.amount;
            }
        }

        stats.net = stats.income.total - stats.expense.total;
        Ok(stats)
    }

    /// Income, expense and net for each month of `year`
    ///
    /// Only entries dated on or before `today` count. Months after today are
    /// present with zero totals.
    pub fn monthly_summary(
        &self,
        user_id: UserId,
        year: i32,
        today: NaiveDate,
    ) -> LedgerResult<Vec<MonthSummary>> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Err(LedgerError::Validation(format!("Year {} is out of range", year)));
        };

        let mut months: Vec<MonthSummary> = (1..=12)
            .map(|month| MonthSummary {
                month,
                income: Money::zero(),
                expense: Money::zero(),
                net: Money::zero(),
            })
            .collect();

        if first <= today {
            let query = ranged(user_id, Some(first), Some(last.min(today)));
            for txn in self.storage.transactions.query(&query)? {
                let summary = &mut months[txn.date.month0() as usize];
                match txn.transaction_type() {
                    TransactionType::Income => summary.income += txn.amount,
                    TransactionType::Expense => summary.expense += txn.amount,
                    TransactionType::Transfer | TransactionType::Adjustment => {}
                }
            }
        }

        for summary in &mut months {
            summary.net = summary.income - summary.expense;
        }
        Ok(months)
    }

    /// Totals per category for one kind, largest first, future entries excluded
    pub fn by_category(
        &self,
        user_id: UserId,
        kind: CategoryKind,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> LedgerResult<Vec<CategoryTotal>> {
        let transaction_type = match kind {
            CategoryKind::Income => TransactionType::Income,
            CategoryKind::Expense => TransactionType::Expense,
        };
        let to = date_to.map_or(today, |d| d.min(today));
        let query = ranged(user_id, date_from, Some(to)).kind(transaction_type);

        let mut groups: HashMap<Option<CategoryId>, (Money, usize)> = HashMap::new();
        for txn in self.storage.transactions.query(&query)? {
            let entry = groups.entry(txn.category_id).or_default();
            entry.0 += txn.amount;
            entry.1 += 1;
        }

        let mut totals = Vec::with_capacity(groups.len());
        for (category_id, (total, count)) in groups {
            let name = match category_id {
                Some(id) => self
                    .storage
                    .categories
                    .get(id)?
                    .map_or_else(|| id.to_string(), |c| c.name),
                None => "Uncategorized".to_string(),
            };
            totals.push(CategoryTotal {
                category_id,
                name,
                total,
                count,
            });
        }

        totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok(totals)
    }
}

fn ranged(user_id: UserId, from: Option<NaiveDate>, to: Option<NaiveDate>) -> TransactionQuery {
    let mut query = TransactionQuery::new().user(user_id);
    query.date_from = from;
    query.date_to = to;
    query
}
