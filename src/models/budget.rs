//! Budget model
//!
//! A budget caps spending in one expense category per period, or, in
//! savings mode, tracks how much was transferred into savings accounts.
//! `BudgetStatus` holds the values derived for one evaluation date.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, SavingsGoalId, UserId};
use super::money::Money;
use super::period::{PeriodKind, PeriodWindow};

/// Default alert threshold, in percent
pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;

/// A budget definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub user_id: UserId,

    pub name: String,

    /// Tracked expense category; `None` exactly when `is_savings_goal`
    pub category_id: Option<CategoryId>,

    /// Amount allowed per period
    pub amount: Money,

    pub period: PeriodKind,

    /// First day the budget applies
    pub start_date: NaiveDate,

    /// Last day the budget applies, if it ends
    pub end_date: Option<NaiveDate>,

    /// Percentage of `amount` at which the budget is flagged (0-100)
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u8,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub is_savings_goal: bool,

    #[serde(default)]
    pub savings_goal_id: Option<SavingsGoalId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_alert_threshold() -> u8 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_active() -> bool {
    true
}

impl Budget {
    /// Create a category budget
    pub fn for_category(
        user_id: UserId,
        name: impl Into<String>,
        category_id: CategoryId,
        amount: Money,
        period: PeriodKind,
        start_date: NaiveDate,
    ) -> Self {
        Self::build(user_id, name.into(), Some(category_id), amount, period, start_date)
    }

    /// Create a savings-mode budget, optionally linked to a goal
    pub fn for_savings(
        user_id: UserId,
        name: impl Into<String>,
        amount: Money,
        period: PeriodKind,
        start_date: NaiveDate,
        savings_goal_id: Option<SavingsGoalId>,
    ) -> Self {
        let mut budget = Self::build(user_id, name.into(), None, amount, period, start_date);
        budget.is_savings_goal = true;
        budget.savings_goal_id = savings_goal_id;
        budget
    }

    fn build(
        user_id: UserId,
        name: String,
        category_id: Option<CategoryId>,
        amount: Money,
        period: PeriodKind,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            user_id,
            name,
            category_id,
            amount,
            period,
            start_date,
            end_date: None,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            active: true,
            is_savings_goal: false,
            savings_goal_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: u8) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        match (self.category_id.is_some(), self.is_savings_goal) {
            (true, true) => return Err(BudgetValidationError::SavingsBudgetWithCategory),
            (false, false) => return Err(BudgetValidationError::MissingCategory),
            _ => {}
        }

        if self.alert_threshold > 100 {
            return Err(BudgetValidationError::ThresholdOutOfRange(self.alert_threshold));
        }

        if self.amount.is_negative() {
            return Err(BudgetValidationError::NegativeAmount(self.amount));
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(BudgetValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.period, self.amount)
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    MissingCategory,
    SavingsBudgetWithCategory,
    ThresholdOutOfRange(u8),
    NegativeAmount(Money),
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::MissingCategory => {
                write!(f, "A budget must track a category unless it is a savings budget")
            }
            Self::SavingsBudgetWithCategory => {
                write!(f, "A savings budget cannot track a category")
            }
            Self::ThresholdOutOfRange(t) => {
                write!(f, "Alert threshold must be between 0 and 100, got {}", t)
            }
            Self::NegativeAmount(amount) => {
                write!(f, "Budget amount cannot be negative, got {}", amount)
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "Budget end date {} is before start date {}", end, start)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}

/// Derived state of a budget on one evaluation date
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget_id: BudgetId,
    pub amount: Money,

    /// Window used for `spent` (capped at today)
    pub window: PeriodWindow,
    /// Window used for `projected` (the whole period)
    pub projected_window: PeriodWindow,

    pub spent: Money,
    pub projected: Money,

    pub remaining: Money,
    pub projected_remaining: Money,

    pub percentage_used: Decimal,
    pub projected_percentage: Decimal,

    pub is_over_budget: bool,
    pub is_projected_over_budget: bool,

    pub is_alert_triggered: bool,
    pub is_projected_alert_triggered: bool,
}

impl BudgetStatus {
    /// Derive every status value from the two aggregated amounts
    pub fn derive(
        budget: &Budget,
        window: PeriodWindow,
        projected_window: PeriodWindow,
        spent: Money,
        projected: Money,
    ) -> Self {
        let percentage_used = percentage_of(spent, budget.amount);
        let projected_percentage = percentage_of(projected, budget.amount);
        let threshold = Decimal::from(budget.alert_threshold);

        Self {
            budget_id: budget.id,
            amount: budget.amount,
            window,
            projected_window,
            spent,
            projected,
            remaining: budget.amount - spent,
            projected_remaining: budget.amount - projected,
            percentage_used,
            projected_percentage,
            is_over_budget: spent > budget.amount,
            is_projected_over_budget: projected > budget.amount,
            is_alert_triggered: percentage_used >= threshold,
            is_projected_alert_triggered: projected_percentage >= threshold,
        }
    }
}

/// `part / whole * 100`, with a zero whole giving 0
///
/// A ratio too large for `Decimal` saturates at `Decimal::MAX` (or `MIN`
/// when the signs differ).
pub fn percentage_of(part: Money, whole: Money) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.amount()
        .checked_div(whole.amount())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            if part.is_negative() == whole.is_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
}
