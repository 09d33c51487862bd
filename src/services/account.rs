//! Account service and balance resolver
//!
//! Balances are never stored. They are recomputed from the transaction
//! store on every call, either as of a given day ("current") or over every
//! recorded transaction ("projected").

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountId, AccountType, AdjustmentDirection, Currency, Money, Transaction,
    TransactionId, TransactionType, UserId,
};
use crate::storage::{Storage, TransactionQuery};

use super::transaction::TransactionService;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with both derived balances
#[derive(Debug, Clone)]
pub struct AccountBalance {
    pub account: Account,
    pub current: Money,
    pub projected: Money,
}

/// Totals for one currency across a user's active accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySummary {
    pub currency: Currency,
    pub total: Money,
    pub count: usize,
    /// Current balance per account type, in first-seen order
    pub by_type: Vec<(AccountType, Money)>,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an account, recording a non-zero opening balance as an adjustment
    pub fn create(
        &self,
        user_id: UserId,
        name: &str,
        account_type: AccountType,
        currency: Currency,
        opening_balance: Money,
        today: NaiveDate,
    ) -> LedgerResult<Account> {
        let name = name.trim();

        if self.storage.accounts.name_exists(user_id, name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = Account::new(user_id, name, account_type, currency);
        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        if let Some(direction) = AdjustmentDirection::for_delta(opening_balance) {
            let opening = Transaction::adjustment(
                user_id,
                account.id,
                direction,
                opening_balance.abs(),
                today,
            )
            .with_description("Opening balance");

            // Without its opening balance the account is not created at all
            if let Err(e) = TransactionService::new(self.storage).record(opening) {
                warn!(
                    account = %account.id,
                    error = %e,
                    "rolling back account without opening balance"
                );
                self.storage.accounts.remove(account.id)?;
                self.storage.accounts.save()?;
                return Err(e);
            }
        }

        self.storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        );
        info!(account = %account.id, name = %account.name, "created account");

        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> LedgerResult<Account> {
        self.storage
            .accounts
            .get(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))
    }

    /// Find an account by name or id string
    pub fn find(&self, user_id: UserId, identifier: &str) -> LedgerResult<Account> {
        self.storage
            .accounts
            .find(user_id, identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    }

    pub fn list(&self, user_id: UserId, include_inactive: bool) -> LedgerResult<Vec<Account>> {
        let active = if include_inactive { None } else { Some(true) };
        self.storage.accounts.filter(user_id, None, active)
    }

    /// Balance including only transactions dated on or before `today`
    pub fn current_balance(&self, account_id: AccountId, today: NaiveDate) -> LedgerResult<Money> {
        let balance = self.resolve(account_id, Some(today))?;
        debug!(account = %account_id, %today, %balance, "resolved current balance");
        Ok(balance)
    }

    /// Balance including every transaction, future-dated ones too
    pub fn projected_balance(&self, account_id: AccountId) -> LedgerResult<Money> {
        let balance = self.resolve(account_id, None)?;
        debug!(account = %account_id, %balance, "resolved projected balance");
        Ok(balance)
    }

    /// Sum of every transaction's effect on the account, up to `until`
    ///
    /// Owned transactions and received transfers are gathered separately and
    /// merged by id, so each record is applied exactly once.
    fn resolve(&self, account_id: AccountId, until: Option<NaiveDate>) -> LedgerResult<Money> {
        let mut owned = TransactionQuery::new().account(account_id);
        let mut received = TransactionQuery::new()
            .destination(account_id)
            .kind(TransactionType::Transfer);
        if let Some(day) = until {
            owned = owned.to(day);
            received = received.to(day);
        }

        let mut relevant: HashMap<TransactionId, Transaction> = HashMap::new();
        for txn in self
            .storage
            .transactions
            .query(&owned)?
            .into_iter()
            .chain(self.storage.transactions.query(&received)?)
        {
            relevant.entry(txn.id).or_insert(txn);
        }

        Ok(relevant.values().map(|t| t.effect_on(account_id)).sum())
    }

    pub fn balance(&self, account: &Account, today: NaiveDate) -> LedgerResult<AccountBalance> {
        Ok(AccountBalance {
            account: account.clone(),
            current: self.current_balance(account.id, today)?,
            projected: self.projected_balance(account.id)?,
        })
    }

    pub fn list_with_balances(
        &self,
        user_id: UserId,
        include_inactive: bool,
        today: NaiveDate,
    ) -> LedgerResult<Vec<AccountBalance>> {
        self.list(user_id, include_inactive)?
            .iter()
            .map(|account| self.balance(account, today))
            .collect()
    }

    /// Reconcile the current balance to `target` with one adjustment
    ///
    /// Returns the adjustment, or `None` when the balance already matches.
    pub fn set_balance(
        &self,
        account_id: AccountId,
        target: Money,
        today: NaiveDate,
    ) -> LedgerResult<Option<Transaction>> {
        let account = self.get(account_id)?;
        let current = self.current_balance(account_id, today)?;
        let difference = target - current;

        let Some(direction) = AdjustmentDirection::for_delta(difference) else {
            debug!(account = %account_id, %target, "balance already matches");
            return Ok(None);
        };

        let adjustment = Transaction::adjustment(
            account.user_id,
            account.id,
            direction,
            difference.abs(),
            today,
        )
        .with_description(format!("Balance set to {}", target));

        info!(account = %account_id, from = %current, to = %target, "adjusting balance");
        TransactionService::new(self.storage)
            .record(adjustment)
            .map(Some)
    }

    /// Flip the active flag
    pub fn toggle_active(&self, account_id: AccountId) -> LedgerResult<Account> {
        let mut account = self.get(account_id)?;
        let before = account.clone();
        account.set_active(!account.active);

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        );

        Ok(account)
    }

    /// Current totals of the user's active accounts, grouped by currency
    ///
    /// Currencies are never converted into one another.
    pub fn summary(&self, user_id: UserId, today: NaiveDate) -> LedgerResult<Vec<CurrencySummary>> {
        let mut groups: BTreeMap<Currency, CurrencySummary> = BTreeMap::new();

        for account in self.list(user_id, false)? {
            let balance = self.current_balance(account.id, today)?;
            let group = groups.entry(account.currency).or_insert_with(|| CurrencySummary {
                currency: account.currency,
                total: Money::zero(),
                count: 0,
                by_type: Vec::new(),
            });

            group.total += balance;
            group.count += 1;
            match group.by_type.iter_mut().find(|(t, _)| *t == account.account_type) {
                Some((_, subtotal)) => *subtotal += balance,
                None => group.by_type.push((account.account_type, balance)),
            }
        }

        Ok(groups.into_values().collect())
    }
}
