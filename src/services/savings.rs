//! Savings goal service and projection solver
//!
//! A goal is solved in one of two directions:
//!
//! - saving amount known, no target date: how many periods until the
//!   target is reached, and on which date
//! - target date known: how much to save per period to get there
//!
//! Monthly date projection clamps the day of month to 28, so a goal started
//! on the 29th to 31st lands a few days early. That simplification is kept
//! deliberately and pinned by tests.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Budget, GoalStatus, Money, SavingFrequency, SavingsGoal, SavingsGoalId, SavingsProjection,
    UserId,
};
use crate::storage::Storage;

use super::budget::BudgetService;

/// Highest day of month a monthly projection lands on
const MONTHLY_DAY_CAP: u32 = 28;

/// Solve the missing quantity of a goal as of `today`
///
/// Returns `None` when neither quantity is set, or when a saving amount
/// that is not positive is the only input.
pub fn project(goal: &SavingsGoal, today: NaiveDate) -> Option<SavingsProjection> {
    if let Some(target_date) = goal.target_date {
        return Some(solve_amount(goal.target_amount, target_date, goal.saving_frequency, today));
    }

    let saving_amount = goal.saving_amount?;
    solve_date(goal.target_amount, saving_amount, goal.saving_frequency, today)
}

/// Periods needed at `saving_amount` per period, and the date they end on
fn solve_date(
    target_amount: Money,
    saving_amount: Money,
    frequency: SavingFrequency,
    today: NaiveDate,
) -> Option<SavingsProjection> {
    if !saving_amount.is_positive() {
        return None;
    }

    let periods = target_amount.amount().checked_div(saving_amount.amount())?.ceil();
    let periods_needed = periods.to_u32()?;
    let target_date = advance(today, frequency, periods_needed)?;

    Some(SavingsProjection::DateCalculated {
        target_date,
        periods_needed,
    })
}

/// Amount per period needed to reach `target_amount` by `target_date`
fn solve_amount(
    target_amount: Money,
    target_date: NaiveDate,
    frequency: SavingFrequency,
    today: NaiveDate,
) -> SavingsProjection {
    // Past or same-day target: everything has to be saved at once
    if target_date <= today {
        return SavingsProjection::AmountCalculated {
            saving_amount: target_amount.round_cents(),
            periods_needed: 1,
        };
    }

    let periods_needed = periods_between(today, target_date, frequency);
    let saving_amount =
        Money::new(target_amount.amount() / Decimal::from(periods_needed)).round_cents();

    SavingsProjection::AmountCalculated {
        saving_amount,
        periods_needed,
    }
}

/// Move `from` forward by `periods` units of `frequency`
///
/// Monthly steps land on `min(day, 28)`. Yearly steps keep month and day,
/// except that February 29 becomes February 28 in a non-leap year.
pub fn advance(from: NaiveDate, frequency: SavingFrequency, periods: u32) -> Option<NaiveDate> {
    match frequency {
        SavingFrequency::Daily => from.checked_add_days(Days::new(u64::from(periods))),
        SavingFrequency::Weekly => from.checked_add_days(Days::new(u64::from(periods) * 7)),
        SavingFrequency::Monthly => from
            .with_day(from.day().min(MONTHLY_DAY_CAP))?
            .checked_add_months(Months::new(periods)),
        SavingFrequency::Yearly => from.checked_add_months(Months::new(periods.checked_mul(12)?)),
    }
}

/// Whole periods from `from` to a later `to`, at least 1
fn periods_between(from: NaiveDate, to: NaiveDate, frequency: SavingFrequency) -> u32 {
    let days = (to - from).num_days();
    let periods = match frequency {
        SavingFrequency::Daily => days,
        SavingFrequency::Weekly => days / 7,
        SavingFrequency::Monthly => {
            i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
        }
        SavingFrequency::Yearly => i64::from(to.year() - from.year()),
    };
    u32::try_from(periods.max(1)).unwrap_or(u32::MAX)
}

/// Service for savings goals
pub struct SavingsService<'a> {
    storage: &'a Storage,
}

impl<'a> SavingsService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, goal: SavingsGoal) -> LedgerResult<SavingsGoal> {
        goal.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.savings_goals.upsert(goal.clone())?;
        self.storage.savings_goals.save()?;

        self.storage.log_create(
            EntityType::SavingsGoal,
            goal.id.to_string(),
            Some(goal.label.clone()),
            &goal,
        );
        info!(goal = %goal.id, label = %goal.label, "created savings goal");

        Ok(goal)
    }

    pub fn get(&self, id: SavingsGoalId) -> LedgerResult<SavingsGoal> {
        self.storage
            .savings_goals
            .get(id)?
            .ok_or_else(|| LedgerError::goal_not_found(id.to_string()))
    }

    pub fn find(&self, user_id: UserId, identifier: &str) -> LedgerResult<SavingsGoal> {
        self.storage
            .savings_goals
            .find(user_id, identifier)?
            .ok_or_else(|| LedgerError::goal_not_found(identifier))
    }

    pub fn list(&self, user_id: UserId) -> LedgerResult<Vec<SavingsGoal>> {
        self.storage.savings_goals.get_by_user(user_id)
    }

    pub fn solve(&self, id: SavingsGoalId, today: NaiveDate) -> LedgerResult<Option<SavingsProjection>> {
        let goal = self.get(id)?;
        let projection = project(&goal, today);
        debug!(goal = %id, ?projection, "solved savings goal");
        Ok(projection)
    }

    pub fn set_status(&self, id: SavingsGoalId, status: GoalStatus) -> LedgerResult<SavingsGoal> {
        let mut goal = self.get(id)?;
        let before = goal.clone();
        goal.set_status(status);

        self.storage.savings_goals.upsert(goal.clone())?;
        self.storage.savings_goals.save()?;

        self.storage.log_update(
            EntityType::SavingsGoal,
            goal.id.to_string(),
            Some(goal.label.clone()),
            &before,
            &goal,
        );

        Ok(goal)
    }

    /// Create a savings budget tracking this goal
    ///
    /// The amount is the goal's own positive saving amount, or else the
    /// solved one. The budget starts today and ends on the goal's target
    /// date, or today when that date has passed. It is stored as one record
    /// carrying its goal link.
    pub fn create_budget(&self, id: SavingsGoalId, today: NaiveDate) -> LedgerResult<Budget> {
        let goal = self.get(id)?;

        let amount = goal
            .saving_amount
            .filter(Money::is_positive)
            .or_else(|| project(&goal, today).and_then(|p| p.saving_amount()))
            .ok_or_else(|| {
                LedgerError::SavingsGoal(format!(
                    "Cannot determine a saving amount for '{}'",
                    goal.label
                ))
            })?;

        let budget = Budget::for_savings(
            goal.user_id,
            format!("Savings: {}", goal.label),
            amount,
            goal.saving_frequency.budget_period(),
            today,
            Some(goal.id),
        )
        .with_end_date(goal.target_date.map(|end| end.max(today)));

        BudgetService::new(self.storage).create(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{PeriodKind, ProjectionMode};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn goal(target: i64, frequency: SavingFrequency) -> SavingsGoal {
        SavingsGoal::new(UserId::new(), "Car", Money::from_major(target), frequency)
    }

    #[test]
    fn test_monthly_date_projection() {
        let today = d(2025, 1, 15);
        let goal = goal(3000, SavingFrequency::Monthly).with_saving_amount(Money::from_major(250));

        let projection = project(&goal, today).unwrap();
        assert_eq!(
            projection,
            SavingsProjection::DateCalculated {
                target_date: d(2026, 1, 15),
                periods_needed: 12,
            }
        );
    }

    #[test]
    fn test_monthly_projection_clamps_day_to_28() {
        let goal = goal(3000, SavingFrequency::Monthly).with_saving_amount(Money::from_major(250));

        for start in [d(2025, 1, 29), d(2025, 1, 30), d(2025, 1, 31)] {
            let projection = project(&goal, start).unwrap();
            assert_eq!(projection.target_date(), Some(d(2026, 1, 28)), "from {}", start);
        }

        // Even where the month has the day, it is still clamped
        let short = goal.clone().with_saving_amount(Money::from_major(1500));
        assert_eq!(
            project(&short, d(2025, 3, 31)).unwrap().target_date(),
            Some(d(2025, 5, 28))
        );
    }

    #[test]
    fn test_periods_round_up() {
        let goal = goal(1000, SavingFrequency::Weekly).with_saving_amount(Money::from_major(300));
        let projection = project(&goal, d(2025, 1, 1)).unwrap();

        assert_eq!(projection.periods_needed(), 4);
        assert_eq!(projection.target_date(), Some(d(2025, 1, 29)));
    }

    #[test]
    fn test_daily_and_yearly_date_projection() {
        let daily = goal(100, SavingFrequency::Daily).with_saving_amount(Money::from_major(10));
        assert_eq!(project(&daily, d(2025, 1, 25)).unwrap().target_date(), Some(d(2025, 2, 4)));

        let yearly = goal(100, SavingFrequency::Yearly).with_saving_amount(Money::from_major(50));
        assert_eq!(project(&yearly, d(2025, 6, 30)).unwrap().target_date(), Some(d(2027, 6, 30)));

        // Leap day rolls back to Feb 28
        assert_eq!(project(&yearly, d(2024, 2, 29)).unwrap().target_date(), Some(d(2026, 2, 28)));
    }

    #[test]
    fn test_non_positive_saving_amount_has_no_result() {
        let zero = goal(1000, SavingFrequency::Monthly).with_saving_amount(Money::zero());
        let negative = goal(1000, SavingFrequency::Monthly).with_saving_amount(Money::from_major(-5));

        assert_eq!(project(&zero, d(2025, 1, 1)), None);
        assert_eq!(project(&negative, d(2025, 1, 1)), None);
    }

    #[test]
    fn test_nothing_known_has_no_result() {
        assert_eq!(project(&goal(1000, SavingFrequency::Monthly), d(2025, 1, 1)), None);
    }

    #[test]
    fn test_monthly_amount_projection() {
        let today = d(2025, 1, 15);
        let goal = goal(1200, SavingFrequency::Monthly).with_target_date(d(2025, 5, 15));

        let projection = project(&goal, today).unwrap();
        assert_eq!(projection.mode(), ProjectionMode::AmountCalculated);
        assert_eq!(projection.periods_needed(), 4);
        assert_eq!(projection.saving_amount(), Some(Money::from_minor(30000)));
    }

    #[test]
    fn test_target_date_wins_over_saving_amount() {
        let goal = goal(1200, SavingFrequency::Monthly)
            .with_target_date(d(2025, 5, 15))
            .with_saving_amount(Money::from_major(10));

        let projection = project(&goal, d(2025, 1, 15)).unwrap();
        assert_eq!(projection.mode(), ProjectionMode::AmountCalculated);
    }

    #[test]
    fn test_amount_projection_rounds_to_cents() {
        let goal = goal(1000, SavingFrequency::Monthly).with_target_date(d(2025, 4, 1));
        let projection = project(&goal, d(2025, 1, 1)).unwrap();

        assert_eq!(projection.periods_needed(), 3);
        assert_eq!(projection.saving_amount(), Some(Money::new(dec!(333.33))));
    }

    #[test]
    fn test_amount_projection_period_counts() {
        let today = d(2025, 1, 1);

        let daily = goal(100, SavingFrequency::Daily).with_target_date(d(2025, 1, 11));
        assert_eq!(project(&daily, today).unwrap().periods_needed(), 10);

        // 13 days is one whole week
        let weekly = goal(100, SavingFrequency::Weekly).with_target_date(d(2025, 1, 14));
        assert_eq!(project(&weekly, today).unwrap().periods_needed(), 1);

        // Less than a week still counts as one period
        let short = goal(100, SavingFrequency::Weekly).with_target_date(d(2025, 1, 3));
        assert_eq!(project(&short, today).unwrap().periods_needed(), 1);

        // Same month is at least one period
        let same_month = goal(100, SavingFrequency::Monthly).with_target_date(d(2025, 1, 31));
        assert_eq!(project(&same_month, today).unwrap().periods_needed(), 1);

        let yearly = goal(100, SavingFrequency::Yearly).with_target_date(d(2027, 12, 31));
        assert_eq!(project(&yearly, today).unwrap().periods_needed(), 2);
    }

    #[test]
    fn test_past_target_date_needs_everything_now() {
        let today = d(2025, 6, 1);
        for target in [d(2025, 6, 1), d(2024, 1, 1)] {
            let goal = goal(1500, SavingFrequency::Monthly).with_target_date(target);
            assert_eq!(
                project(&goal, today),
                Some(SavingsProjection::AmountCalculated {
                    saving_amount: Money::from_major(1500),
                    periods_needed: 1,
                })
            );
        }
    }

    #[test]
    fn test_date_then_amount_round_trip() {
        let cases = [
            (3000, 250, SavingFrequency::Monthly, d(2025, 1, 31)),
            (3000, 250, SavingFrequency::Monthly, d(2025, 3, 10)),
            (1000, 50, SavingFrequency::Weekly, d(2025, 2, 3)),
            (700, 7, SavingFrequency::Daily, d(2024, 12, 30)),
            (5000, 1000, SavingFrequency::Yearly, d(2024, 2, 29)),
        ];

        for (target, amount, frequency, today) in cases {
            let amount = Money::from_major(amount);
            let forward = goal(target, frequency).with_saving_amount(amount);
            let target_date = project(&forward, today).unwrap().target_date().unwrap();

            let backward = goal(target, frequency).with_target_date(target_date);
            let solved = project(&backward, today).unwrap().saving_amount().unwrap();

            assert!(
                (solved - amount).abs() <= Money::from_minor(1),
                "{:?} from {}: {} vs {}",
                frequency,
                today,
                solved,
                amount
            );
        }
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_budget_from_solved_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);
        let today = d(2025, 1, 15);

        let goal = service
            .create(goal(1200, SavingFrequency::Monthly).with_target_date(d(2025, 5, 15)))
            .unwrap();
        let budget = service.create_budget(goal.id, today).unwrap();

        assert_eq!(budget.name, "Savings: Car");
        assert!(budget.is_savings_goal);
        assert_eq!(budget.category_id, None);
        assert_eq!(budget.amount, Money::from_major(300));
        assert_eq!(budget.period, PeriodKind::Monthly);
        assert_eq!(budget.start_date, today);
        assert_eq!(budget.end_date, Some(d(2025, 5, 15)));
        assert_eq!(budget.savings_goal_id, Some(goal.id));
        assert_eq!(storage.budgets.get_by_goal(goal.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_budget_for_past_target_date_ends_today() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);
        let today = d(2025, 6, 1);

        let goal = service
            .create(goal(1200, SavingFrequency::Monthly).with_target_date(d(2025, 3, 1)))
            .unwrap();
        let budget = service.create_budget(goal.id, today).unwrap();

        assert_eq!(budget.amount, Money::from_major(1200));
        assert_eq!(budget.start_date, today);
        assert_eq!(budget.end_date, Some(today));
    }

    #[test]
    fn test_tiny_saving_amount_has_no_result() {
        let goal = SavingsGoal::new(
            UserId::new(),
            "Moon",
            Money::new(dec!(100000000000000000000)),
            SavingFrequency::Monthly,
        )
        .with_saving_amount(Money::new(dec!(0.0000000001)));

        assert_eq!(project(&goal, d(2025, 1, 1)), None);
    }

    #[test]
    fn test_create_budget_daily_goal_tracks_weekly() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);

        let goal = service
            .create(goal(100, SavingFrequency::Daily).with_saving_amount(Money::from_major(5)))
            .unwrap();
        let budget = service.create_budget(goal.id, d(2025, 1, 1)).unwrap();

        assert_eq!(budget.period, PeriodKind::Weekly);
        assert_eq!(budget.amount, Money::from_major(5));
        assert_eq!(budget.end_date, None);
    }

    #[test]
    fn test_create_budget_without_amount_fails_cleanly() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);

        let goal = service.create(goal(100, SavingFrequency::Monthly)).unwrap();
        let err = service.create_budget(goal.id, d(2025, 1, 1)).unwrap_err();

        assert!(matches!(err, LedgerError::SavingsGoal(_)));
        assert!(storage.budgets.get_by_goal(goal.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_invalid_goal() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);

        let err = service.create(goal(0, SavingFrequency::Monthly)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_set_status() {
        let (_temp_dir, storage) = create_test_storage();
        let service = SavingsService::new(&storage);

        let goal = service.create(goal(100, SavingFrequency::Monthly)).unwrap();
        let updated = service.set_status(goal.id, GoalStatus::Reached).unwrap();

        assert_eq!(updated.status, GoalStatus::Reached);
        assert_eq!(service.get(goal.id).unwrap().status, GoalStatus::Reached);
    }
}
