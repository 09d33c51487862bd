//! Default data for a new ledger
//!
//! Seeds a starter set of accounts, categories, monthly budgets and one
//! savings goal with its budget. Everything goes through the regular
//! services, so the same validation and audit trail apply.

use chrono::{Days, NaiveDate};
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountType, Budget, CategoryId, CategoryKind, Currency, Money, PeriodKind, SavingFrequency,
    SavingsGoal, UserId,
};
use crate::storage::Storage;

use super::account::AccountService;
use super::budget::BudgetService;
use super::category::CategoryService;
use super::period::resolve_window;
use super::savings::SavingsService;

const DEFAULT_ACCOUNTS: &[(&str, AccountType, i64)] = &[
    ("Checking", AccountType::Checking, 1000),
    ("Savings", AccountType::Savings, 5000),
];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Groceries",
    "Transport",
    "Housing",
    "Leisure",
    "Health",
    "Other expenses",
];

const INCOME_CATEGORIES: &[&str] = &["Salary", "Other income"];

/// (category, monthly amount)
const DEFAULT_BUDGETS: &[(&str, i64)] = &[("Groceries", 500), ("Transport", 200), ("Leisure", 300)];

const BUDGET_ALERT_THRESHOLD: u8 = 80;

const GOAL_LABEL: &str = "Summer holiday";
const GOAL_TARGET: i64 = 3000;
const GOAL_SAVING: i64 = 250;
const GOAL_HORIZON_DAYS: u64 = 365;
const GOAL_BUDGET_NAME: &str = "Holiday savings";
const GOAL_ALERT_THRESHOLD: u8 = 90;

/// How many records a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub accounts: usize,
    pub categories: usize,
    pub budgets: usize,
    pub goals: usize,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.accounts + self.categories + self.budgets + self.goals
    }
}

/// Service for seeding default data
pub struct SetupService<'a> {
    storage: &'a Storage,
}

impl<'a> SetupService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Whether the user already has accounts, categories or budgets
    pub fn has_data(&self, user_id: UserId) -> LedgerResult<bool> {
        Ok(!self.storage.accounts.get_by_user(user_id)?.is_empty()
            || !self.storage.categories.get_by_user(user_id, None)?.is_empty()
            || !self.storage.budgets.get_by_user(user_id)?.is_empty())
    }

    /// Create the default records for `user_id`
    ///
    /// Refuses when the user already has data, unless `force` is set. With
    /// `force`, records whose name already exists are left alone and only
    /// the missing ones are created.
    pub fn seed_defaults(
        &self,
        user_id: UserId,
        currency: Currency,
        today: NaiveDate,
        force: bool,
    ) -> LedgerResult<SeedSummary> {
        if !force && self.has_data(user_id)? {
            return Err(LedgerError::Validation(
                "Ledger already has data; use --force to add the missing defaults".into(),
            ));
        }

        let mut summary = SeedSummary::default();
        let month_start = resolve_window(PeriodKind::Monthly, today, None, None).start;

        let accounts = AccountService::new(self.storage);
        for &(name, account_type, opening) in DEFAULT_ACCOUNTS {
            if self.storage.accounts.find(user_id, name)?.is_none() {
                accounts.create(
                    user_id,
                    name,
                    account_type,
                    currency,
                    Money::from_major(opening),
                    today,
                )?;
                summary.accounts += 1;
            }
        }

        let categories = CategoryService::new(self.storage);
        let kinds = EXPENSE_CATEGORIES
            .iter()
            .map(|name| (*name, CategoryKind::Expense))
            .chain(INCOME_CATEGORIES.iter().map(|name| (*name, CategoryKind::Income)));
        for (name, kind) in kinds {
            if !self.storage.categories.name_exists(user_id, name, kind)? {
                categories.create(user_id, name, kind)?;
                summary.categories += 1;
            }
        }

        let budgets = BudgetService::new(self.storage);
        for &(category_name, amount) in DEFAULT_BUDGETS {
            if self.storage.budgets.find(user_id, category_name)?.is_some() {
                continue;
            }
            let category_id = self.expense_category(user_id, category_name)?;
            budgets.create(
                Budget::for_category(
                    user_id,
                    category_name,
                    category_id,
                    Money::from_major(amount),
                    PeriodKind::Monthly,
                    month_start,
                )
                .with_alert_threshold(BUDGET_ALERT_THRESHOLD),
            )?;
            summary.budgets += 1;
        }

        if self.storage.savings_goals.find(user_id, GOAL_LABEL)?.is_none() {
            let target_date = today
                .checked_add_days(Days::new(GOAL_HORIZON_DAYS))
                .ok_or_else(|| LedgerError::Validation(format!("Date {} is out of range", today)))?;

            let goal = SavingsService::new(self.storage).create(
                SavingsGoal::new(
                    user_id,
                    GOAL_LABEL,
                    Money::from_major(GOAL_TARGET),
                    SavingFrequency::Monthly,
                )
                .with_target_date(target_date)
                .with_saving_amount(Money::from_major(GOAL_SAVING)),
            )?;
            summary.goals += 1;

            if self.storage.budgets.find(user_id, GOAL_BUDGET_NAME)?.is_none() {
                budgets.create(
                    Budget::for_savings(
                        user_id,
                        GOAL_BUDGET_NAME,
                        Money::from_major(GOAL_SAVING),
                        PeriodKind::Monthly,
                        month_start,
                        Some(goal.id),
                    )
                    .with_alert_threshold(GOAL_ALERT_THRESHOLD),
                )?;
                summary.budgets += 1;
            }
        }

        info!(user = %user_id, created = summary.total(), "seeded default data");
        Ok(summary)
    }

    fn expense_category(&self, user_id: UserId, name: &str) -> LedgerResult<CategoryId> {
        self.storage
            .categories
            .get_by_user(user_id, Some(CategoryKind::Expense))?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id)
            .ok_or_else(|| LedgerError::category_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_seed_defaults() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SetupService::new(&storage);
        let user = UserId::new();
        let today = d(2025, 3, 15);

        assert!(!service.has_data(user).unwrap());
        let summary = service.seed_defaults(user, Currency::Chf, today, false).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                accounts: 2,
                categories: 8,
                budgets: 4,
                goals: 1,
            }
        );
        assert!(service.has_data(user).unwrap());

        let accounts = AccountService::new(&storage);
        let checking = accounts.find(user, "Checking").unwrap();
        assert_eq!(
            accounts.current_balance(checking.id, today).unwrap(),
            Money::from_major(1000)
        );

        let groceries = BudgetService::new(&storage).find(user, "Groceries").unwrap();
        assert_eq!(groceries.start_date, d(2025, 3, 1));
        assert_eq!(groceries.alert_threshold, 80);

        let goal = SavingsService::new(&storage).find(user, "Summer holiday").unwrap();
        assert_eq!(goal.target_date, Some(d(2026, 3, 15)));
        let linked = storage.budgets.get_by_goal(goal.id).unwrap();
        assert_eq!(linked.len(), 1);
        assert!(linked[0].is_savings_goal);
        assert_eq!(linked[0].alert_threshold, 90);
    }

    #[test]
    fn test_seed_refuses_existing_data_unless_forced() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SetupService::new(&storage);
        let user = UserId::new();
        let today = d(2025, 3, 15);

        CategoryService::new(&storage)
            .create(user, "Groceries", CategoryKind::Expense)
            .unwrap();

        let err = service.seed_defaults(user, Currency::Chf, today, false).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(storage.accounts.count().unwrap(), 0);

        let summary = service.seed_defaults(user, Currency::Chf, today, true).unwrap();
        assert_eq!(summary.categories, 7);
        assert_eq!(summary.budgets, 4);

        // A second forced run has nothing left to add
        let again = service.seed_defaults(user, Currency::Chf, today, true).unwrap();
        assert_eq!(again.total(), 0);
    }
}
