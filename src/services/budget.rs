//! Budget service and aggregator
//!
//! Spent amounts are aggregated from the transaction store for the budget's
//! current period on every call. Nothing derived is stored.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountType, Budget, BudgetId, BudgetStatus, CategoryId, CategoryKind, Money, PeriodKind,
    PeriodWindow, TransactionType, UserId,
};
use crate::models::budget::percentage_of;
use crate::storage::{Storage, TransactionQuery};

use super::period::{resolve_capped_window, resolve_window};

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Totals across a user's active budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub total_budgets: usize,
    pub total_amount: Money,
    pub total_spent: Money,
    pub total_remaining: Money,
    pub over_budget_count: usize,
    /// Budgets past their alert threshold but not yet over budget
    pub alert_count: usize,
    /// Rounded to two decimals; 0 when nothing is budgeted
    pub percentage_used: Decimal,
}

/// Planned against actual spending for one category this month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    pub category_id: CategoryId,
    pub category_name: String,
    pub planned: Money,
    pub actual: Money,
    /// `planned - actual`; negative when overspent
    pub gap: Money,
    pub is_over: bool,
    /// Spending in a category no monthly budget covers
    pub unbudgeted: bool,
}

/// Month-to-date comparison of budgets with actual income and spending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetDashboard {
    pub window: PeriodWindow,
    pub rows: Vec<DashboardRow>,
    pub monthly_income: Money,
    pub actual_income: Money,
    pub total_budget: Money,
    pub total_actual: Money,
    /// `monthly_income - total_budget`
    pub planned_balance: Money,
    /// `actual_income - total_actual`
    pub actual_balance: Money,
    /// `actual_balance - planned_balance`
    pub gap: Money,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate and store a new budget
    ///
    /// Invalid configurations are rejected here so the aggregator never has
    /// to deal with them.
    pub fn create(&self, budget: Budget) -> LedgerResult<Budget> {
        budget
            .validate()
            .map_err(|e| LedgerError::Budget(e.to_string()))?;

        if let Some(category_id) = budget.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .filter(|c| c.user_id == budget.user_id)
                .ok_or_else(|| LedgerError::category_not_found(category_id.to_string()))?;

            if category.kind != CategoryKind::Expense {
                return Err(LedgerError::Budget(format!(
                    "Category '{}' is not an expense category",
                    category.name
                )));
            }
        }

        let budget = self.storage.budgets.insert(budget)?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &budget,
        );
        info!(budget = %budget.id, name = %budget.name, "created budget");

        Ok(budget)
    }

    pub fn get(&self, id: BudgetId) -> LedgerResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))
    }

    pub fn find(&self, user_id: UserId, identifier: &str) -> LedgerResult<Budget> {
        self.storage
            .budgets
            .find(user_id, identifier)?
            .ok_or_else(|| LedgerError::budget_not_found(identifier))
    }

    pub fn list(&self, user_id: UserId, include_inactive: bool) -> LedgerResult<Vec<Budget>> {
        Ok(self
            .storage
            .budgets
            .get_by_user(user_id)?
            .into_iter()
            .filter(|b| include_inactive || b.active)
            .collect())
    }

    /// Derive spent, projected and alert state for `budget` as of `today`
    pub fn status(&self, budget: &Budget, today: NaiveDate) -> LedgerResult<BudgetStatus> {
        let window = resolve_capped_window(
            budget.period,
            today,
            Some(budget.start_date),
            budget.end_date,
            today,
        );
        let projected_window =
            resolve_window(budget.period, today, Some(budget.start_date), budget.end_date);

        let spent = self.aggregate(budget, window)?;
        let projected = self.aggregate(budget, projected_window)?;

        debug!(
            budget = %budget.id,
            %window,
            %spent,
            %projected,
            "aggregated budget"
        );

        Ok(BudgetStatus::derive(
            budget,
            window,
            projected_window,
            spent,
            projected,
        ))
    }

    /// Sum of the transactions a budget tracks inside `window`
    ///
    /// Category budgets count expenses in their category. Savings budgets
    /// count transfers into the user's active savings accounts. Adjustments
    /// never count.
    fn aggregate(&self, budget: &Budget, window: PeriodWindow) -> LedgerResult<Money> {
        if window.is_empty() {
            return Ok(Money::zero());
        }

        if budget.is_savings_goal {
            let mut total = Money::zero();
            for account in self.storage.accounts.filter(
                budget.user_id,
                Some(AccountType::Savings),
                Some(true),
            )? {
                let query = TransactionQuery::new()
                    .destination(account.id)
                    .kind(TransactionType::Transfer)
                    .between(window.start, window.end);
                total += self
                    .storage
                    .transactions
                    .query(&query)?
                    .iter()
                    .map(|t| t.amount)
                    .sum::<Money>();
            }
            return Ok(total);
        }

        let Some(category_id) = budget.category_id else {
            return Err(LedgerError::Budget(format!(
                "Budget '{}' has no category",
                budget.name
            )));
        };

        let query = TransactionQuery::new()
            .user(budget.user_id)
            .category(category_id)
            .kind(TransactionType::Expense)
            .between(window.start, window.end);

        Ok(self
            .storage
            .transactions
            .query(&query)?
            .iter()
            .map(|t| t.amount)
            .sum())
    }

    /// Every budget of the user with its status
    pub fn list_with_status(
        &self,
        user_id: UserId,
        include_inactive: bool,
        today: NaiveDate,
    ) -> LedgerResult<Vec<(Budget, BudgetStatus)>> {
        self.list(user_id, include_inactive)?
            .into_iter()
            .map(|budget| {
                let status = self.status(&budget, today)?;
                Ok((budget, status))
            })
            .collect()
    }

    pub fn summary(&self, user_id: UserId, today: NaiveDate) -> LedgerResult<BudgetSummary> {
        let mut summary = BudgetSummary {
            total_budgets: 0,
            total_amount: Money::zero(),
            total_spent: Money::zero(),
            total_remaining: Money::zero(),
            over_budget_count: 0,
            alert_count: 0,
            percentage_used: Decimal::ZERO,
        };

        for (budget, status) in self.list_with_status(user_id, false, today)? {
            summary.total_budgets += 1;
            summary.total_amount += budget.amount;
            summary.total_spent += status.spent;
            if status.is_over_budget {
                summary.over_budget_count += 1;
            } else if status.is_alert_triggered {
                summary.alert_count += 1;
            }
        }

        summary.total_remaining = summary.total_amount - summary.total_spent;
        summary.percentage_used = percentage_of(summary.total_spent, summary.total_amount)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Ok(summary)
    }

    /// Planned against actual for the month containing `today`
    ///
    /// Rows come from active monthly category budgets, followed by expense
    /// categories with spending this month but no such budget. Actual
    /// figures stop at `today`.
    pub fn dashboard(
        &self,
        user_id: UserId,
        monthly_income: Money,
        today: NaiveDate,
    ) -> LedgerResult<BudgetDashboard> {
        let window = resolve_capped_window(PeriodKind::Monthly, today, None, None, today);

        let mut rows = Vec::new();
        let mut budgeted: HashSet<CategoryId> = HashSet::new();
        let mut total_budget = Money::zero();
        let mut total_actual = Money::zero();

        for budget in self.list(user_id, false)? {
            if budget.period != PeriodKind::Monthly || budget.is_savings_goal {
                continue;
            }
            let Some(category_id) = budget.category_id else {
                continue;
            };

            let actual = self.status(&budget, today)?.spent;
            budgeted.insert(category_id);
            total_budget += budget.amount;
            total_actual += actual;

            rows.push(DashboardRow {
                category_id,
                category_name: self.category_name(category_id)?,
                planned: budget.amount,
                actual,
                gap: budget.amount - actual,
                is_over: actual > budget.amount,
                unbudgeted: false,
            });
        }

        let expenses = TransactionQuery::new()
            .user(user_id)
            .kind(TransactionType::Expense)
            .between(window.start, window.end);
        let mut unbudgeted: HashMap<CategoryId, Money> = HashMap::new();
        for txn in self.storage.transactions.query(&expenses)? {
            if let Some(category_id) = txn.category_id.filter(|id| !budgeted.contains(id)) {
                *unbudgeted.entry(category_id).or_default() += txn.amount;
            }
        }

        let mut extra = Vec::with_capacity(unbudgeted.len());
        for (category_id, actual) in unbudgeted {
            total_actual += actual;
            extra.push(DashboardRow {
                category_id,
                category_name: self.category_name(category_id)?,
                planned: Money::zero(),
                actual,
                gap: -actual,
                is_over: true,
                unbudgeted: true,
            });
        }
        extra.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        rows.extend(extra);

        let income = TransactionQuery::new()
            .user(user_id)
            .kind(TransactionType::Income)
            .between(window.start, window.end);
        let actual_income: Money = self
            .storage
            .transactions
            .query(&income)?
            .iter()
            .map(|t| t.amount)
            .sum();

        let planned_balance = monthly_income - total_budget;
        let actual_balance = actual_income - total_actual;

        Ok(BudgetDashboard {
            window,
            rows,
            monthly_income,
            actual_income,
            total_budget,
            total_actual,
            planned_balance,
            actual_balance,
            gap: actual_balance - planned_balance,
        })
    }

    fn category_name(&self, id: CategoryId) -> LedgerResult<String> {
        Ok(self
            .storage
            .categories
            .get(id)?
            .map_or_else(|| id.to_string(), |c| c.name))
    }

    /// Flip the active flag
    pub fn toggle_active(&self, id: BudgetId) -> LedgerResult<Budget> {
        let mut budget = self.get(id)?;
        let before = budget.clone();
        budget.set_active(!budget.active);

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_update(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &before,
            &budget,
        );

        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{
        Account, AdjustmentDirection, Category, Currency, PeriodKind, Transaction,
    };
    use crate::services::TransactionService;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        user: UserId,
        main: Account,
        savings: Account,
        groceries: Category,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let user = UserId::new();
        let main = Account::new(user, "Main", AccountType::Checking, Currency::Chf);
        let savings = Account::new(user, "Savings", AccountType::Savings, Currency::Chf);
        let groceries = Category::new(user, "Groceries", CategoryKind::Expense);
        storage.accounts.upsert(main.clone()).unwrap();
        storage.accounts.upsert(savings.clone()).unwrap();
        storage.categories.upsert(groceries.clone()).unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            user,
            main,
            savings,
            groceries,
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    impl Fixture {
        fn spend(&self, amount: i64, date: NaiveDate) {
            TransactionService::new(&self.storage)
                .record(
                    Transaction::expense(self.user, self.main.id, Money::from_major(amount), date)
                        .with_category(self.groceries.id),
                )
                .unwrap();
        }

        fn groceries_budget(&self, amount: i64, start: NaiveDate) -> Budget {
            BudgetService::new(&self.storage)
                .create(Budget::for_category(
                    self.user,
                    "Groceries",
                    self.groceries.id,
                    Money::from_major(amount),
                    PeriodKind::Monthly,
                    start,
                ))
                .unwrap()
        }
    }

    #[test]
    fn test_alert_triggered_below_budget() {
        let f = fixture();
        let budget = f.groceries_budget(500, d(1, 1));
        f.spend(300, d(3, 2));
        f.spend(150, d(3, 9));

        let status = BudgetService::new(&f.storage).status(&budget, d(3, 15)).unwrap();

        assert_eq!(status.spent, Money::from_major(450));
        assert_eq!(status.remaining, Money::from_major(50));
        assert_eq!(status.percentage_used, dec!(90));
        assert!(status.is_alert_triggered);
        assert!(!status.is_over_budget);
    }

    #[test]
    fn test_mid_month_start_excludes_earlier_spending() {
        let f = fixture();
        f.spend(100, d(3, 3));
        f.spend(40, d(3, 16));
        let budget = f.groceries_budget(500, d(3, 15));

        let status = BudgetService::new(&f.storage).status(&budget, d(3, 20)).unwrap();

        assert_eq!(status.window, PeriodWindow::new(d(3, 15), d(3, 20)));
        assert_eq!(status.spent, Money::from_major(40));
    }

    #[test]
    fn test_future_spending_is_projected_only() {
        let f = fixture();
        let budget = f.groceries_budget(200, d(1, 1));
        f.spend(50, d(3, 5));
        f.spend(180, d(3, 28));

        let status = BudgetService::new(&f.storage).status(&budget, d(3, 15)).unwrap();

        assert_eq!(status.spent, Money::from_major(50));
        assert_eq!(status.projected, Money::from_major(230));
        assert!(!status.is_over_budget);
        assert!(status.is_projected_over_budget);
        assert_eq!(status.projected_window.end, d(3, 31));
    }

    #[test]
    fn test_spending_outside_period_and_adjustments_ignored() {
        let f = fixture();
        let budget = f.groceries_budget(200, d(1, 1));
        f.spend(70, d(2, 27));
        TransactionService::new(&f.storage)
            .record(Transaction::adjustment(
                f.user,
                f.main.id,
                AdjustmentDirection::Decrease,
                Money::from_major(500),
                d(3, 2),
            ))
            .unwrap();

        let status = BudgetService::new(&f.storage).status(&budget, d(3, 15)).unwrap();
        assert!(status.spent.is_zero());
    }

    #[test]
    fn test_zero_budget_reports_zero_percent() {
        let f = fixture();
        let budget = f.groceries_budget(0, d(1, 1));
        f.spend(25, d(3, 1));

        let status = BudgetService::new(&f.storage).status(&budget, d(3, 15)).unwrap();
        assert_eq!(status.percentage_used, Decimal::ZERO);
        assert!(status.is_over_budget);
    }

    #[test]
    fn test_savings_budget_counts_transfers_into_active_savings() {
        let f = fixture();
        let txns = TransactionService::new(&f.storage);
        let service = BudgetService::new(&f.storage);

        let mut closed = Account::new(f.user, "Old savings", AccountType::Savings, Currency::Chf);
        f.storage.accounts.upsert(closed.clone()).unwrap();

        txns.record(Transaction::transfer(f.user, f.main.id, f.savings.id, Money::from_major(200), d(3, 1)))
            .unwrap();
        txns.record(Transaction::transfer(f.user, f.main.id, closed.id, Money::from_major(75), d(3, 2)))
            .unwrap();
        // Out of savings does not count
        txns.record(Transaction::transfer(f.user, f.savings.id, f.main.id, Money::from_major(30), d(3, 3)))
            .unwrap();

        closed.set_active(false);
        f.storage.accounts.upsert(closed).unwrap();

        let budget = service
            .create(Budget::for_savings(
                f.user,
                "Savings",
                Money::from_major(250),
                PeriodKind::Monthly,
                d(1, 1),
                None,
            ))
            .unwrap();

        let status = service.status(&budget, d(3, 15)).unwrap();
        assert_eq!(status.spent, Money::from_major(200));
        assert_eq!(status.percentage_used, dec!(80));
    }

    #[test]
    fn test_create_rejects_bad_configuration() {
        let f = fixture();
        let service = BudgetService::new(&f.storage);

        let mut both = Budget::for_category(
            f.user,
            "Both",
            f.groceries.id,
            Money::from_major(10),
            PeriodKind::Weekly,
            d(1, 1),
        );
        both.is_savings_goal = true;
        assert!(matches!(service.create(both), Err(LedgerError::Budget(_))));

        let salary = Category::new(f.user, "Salary", CategoryKind::Income);
        f.storage.categories.upsert(salary.clone()).unwrap();
        let income_budget = Budget::for_category(
            f.user,
            "Salary",
            salary.id,
            Money::from_major(10),
            PeriodKind::Monthly,
            d(1, 1),
        );
        assert!(matches!(service.create(income_budget), Err(LedgerError::Budget(_))));

        assert!(service.list(f.user, true).unwrap().is_empty());
    }

    #[test]
    fn test_summary() {
        let f = fixture();
        let service = BudgetService::new(&f.storage);
        let today = d(3, 15);

        let rent = Category::new(f.user, "Rent", CategoryKind::Expense);
        let fun = Category::new(f.user, "Fun", CategoryKind::Expense);
        f.storage.categories.upsert(rent.clone()).unwrap();
        f.storage.categories.upsert(fun.clone()).unwrap();

        f.groceries_budget(500, d(1, 1));
        service
            .create(Budget::for_category(
                f.user,
                "Rent",
                rent.id,
                Money::from_major(1000),
                PeriodKind::Monthly,
                d(1, 1),
            ))
            .unwrap();
        let fun_budget = service
            .create(Budget::for_category(
                f.user,
                "Fun",
                fun.id,
                Money::from_major(100),
                PeriodKind::Monthly,
                d(1, 1),
            ))
            .unwrap();

        f.spend(450, d(3, 2));
        let txns = TransactionService::new(&f.storage);
        txns.record(
            Transaction::expense(f.user, f.main.id, Money::from_major(1100), d(3, 1))
                .with_category(rent.id),
        )
        .unwrap();

        // Inactive budgets are left out
        service.toggle_active(fun_budget.id).unwrap();

        let summary = service.summary(f.user, today).unwrap();
        assert_eq!(summary.total_budgets, 2);
        assert_eq!(summary.total_amount, Money::from_major(1500));
        assert_eq!(summary.total_spent, Money::from_major(1550));
        assert_eq!(summary.total_remaining, Money::from_major(-50));
        assert_eq!(summary.over_budget_count, 1);
        assert_eq!(summary.alert_count, 1);
        assert_eq!(summary.percentage_used, dec!(103.33));
    }

    #[test]
    fn test_dashboard_planned_against_actual() {
        let f = fixture();
        let service = BudgetService::new(&f.storage);
        let txns = TransactionService::new(&f.storage);
        let today = d(3, 15);

        let transport = Category::new(f.user, "Transport", CategoryKind::Expense);
        let health = Category::new(f.user, "Health", CategoryKind::Expense);
        f.storage.categories.upsert(transport.clone()).unwrap();
        f.storage.categories.upsert(health.clone()).unwrap();

        f.groceries_budget(500, d(1, 1));
        // Weekly and savings budgets are not part of the monthly plan
        service
            .create(Budget::for_category(
                f.user,
                "Commute",
                transport.id,
                Money::from_major(50),
                PeriodKind::Weekly,
                d(1, 1),
            ))
            .unwrap();
        service
            .create(Budget::for_savings(
                f.user,
                "Savings",
                Money::from_major(300),
                PeriodKind::Monthly,
                d(1, 1),
                None,
            ))
            .unwrap();

        f.spend(620, d(3, 2));
        // Later this month: not spent yet
        f.spend(100, d(3, 20));
        txns.record(
            Transaction::expense(f.user, f.main.id, Money::from_major(40), d(3, 3))
                .with_category(transport.id),
        )
        .unwrap();
        txns.record(
            Transaction::expense(f.user, f.main.id, Money::from_major(25), d(3, 4))
                .with_category(health.id),
        )
        .unwrap();
        // Last month and uncategorized spending are left out
        txns.record(
            Transaction::expense(f.user, f.main.id, Money::from_major(80), d(2, 27))
                .with_category(health.id),
        )
        .unwrap();
        txns.record(Transaction::expense(f.user, f.main.id, Money::from_major(9), d(3, 5)))
            .unwrap();
        txns.record(Transaction::income(f.user, f.main.id, Money::from_major(4000), d(3, 1)))
            .unwrap();

        let dashboard = service
            .dashboard(f.user, Money::from_major(5000), today)
            .unwrap();

        assert_eq!(dashboard.window, PeriodWindow::new(d(3, 1), d(3, 15)));
        assert_eq!(dashboard.rows.len(), 3);

        let groceries = &dashboard.rows[0];
        assert_eq!(groceries.category_name, "Groceries");
        assert_eq!(groceries.planned, Money::from_major(500));
        assert_eq!(groceries.actual, Money::from_major(620));
        assert_eq!(groceries.gap, Money::from_major(-120));
        assert!(groceries.is_over);
        assert!(!groceries.unbudgeted);

        let names: Vec<_> = dashboard.rows[1..].iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(names, ["Health", "Transport"]);
        assert!(dashboard.rows[1..].iter().all(|r| r.unbudgeted && r.is_over));
        assert_eq!(dashboard.rows[1].gap, Money::from_major(-25));

        assert_eq!(dashboard.total_budget, Money::from_major(500));
        assert_eq!(dashboard.total_actual, Money::from_major(685));
        assert_eq!(dashboard.actual_income, Money::from_major(4000));
        assert_eq!(dashboard.planned_balance, Money::from_major(4500));
        assert_eq!(dashboard.actual_balance, Money::from_major(3315));
        assert_eq!(dashboard.gap, Money::from_major(-1185));
    }
}
