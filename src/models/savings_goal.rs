//! Savings goal model
//!
//! A goal knows its target amount and either how much is saved per period
//! or when the target should be reached. The other quantity is solved by
//! the savings service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{SavingsGoalId, UserId};
use super::money::Money;
use super::period::PeriodKind;

/// How often money is put aside for a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SavingFrequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl SavingFrequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "yearly" | "year" | "annual" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Budget period used when a goal is turned into a budget
    ///
    /// Budgets have no daily period, so daily saving is tracked weekly.
    pub fn budget_period(&self) -> PeriodKind {
        match self {
            Self::Daily | Self::Weekly => PeriodKind::Weekly,
            Self::Monthly => PeriodKind::Monthly,
            Self::Yearly => PeriodKind::Yearly,
        }
    }
}

impl fmt::Display for SavingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Reached,
    Cancelled,
}

impl GoalStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "reached" => Some(Self::Reached),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Reached => write!(f, "Reached"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: SavingsGoalId,
    pub user_id: UserId,
    pub label: String,
    pub target_amount: Money,

    /// When set, the saving amount is solved from it
    pub target_date: Option<NaiveDate>,

    /// When set without a target date, the target date is solved from it
    pub saving_amount: Option<Money>,

    #[serde(default)]
    pub saving_frequency: SavingFrequency,

    #[serde(default)]
    pub status: GoalStatus,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(
        user_id: UserId,
        label: impl Into<String>,
        target_amount: Money,
        saving_frequency: SavingFrequency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SavingsGoalId::new(),
            user_id,
            label: label.into(),
            target_amount,
            target_date: None,
            saving_amount: None,
            saving_frequency,
            status: GoalStatus::Active,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    pub fn with_saving_amount(mut self, amount: Money) -> Self {
        self.saving_amount = Some(amount);
        self
    }

    pub fn set_status(&mut self, status: GoalStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), SavingsGoalValidationError> {
        if self.label.trim().is_empty() {
            return Err(SavingsGoalValidationError::EmptyLabel);
        }

        if self.label.len() > 100 {
            return Err(SavingsGoalValidationError::LabelTooLong(self.label.len()));
        }

        if !self.target_amount.is_positive() {
            return Err(SavingsGoalValidationError::NonPositiveTarget(
                self.target_amount,
            ));
        }

        Ok(())
    }
}

impl fmt::Display for SavingsGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.target_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavingsGoalValidationError {
    EmptyLabel,
    LabelTooLong(usize),
    NonPositiveTarget(Money),
}

impl fmt::Display for SavingsGoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "Savings goal label cannot be empty"),
            Self::LabelTooLong(len) => {
                write!(f, "Savings goal label too long ({} chars, max 100)", len)
            }
            Self::NonPositiveTarget(amount) => {
                write!(f, "Target amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for SavingsGoalValidationError {}

/// Which quantity a projection solved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Saving amount known, target date solved
    DateCalculated,
    /// Target date known, saving amount solved
    AmountCalculated,
}

/// Result of solving a savings goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SavingsProjection {
    DateCalculated {
        target_date: NaiveDate,
        periods_needed: u32,
    },
    AmountCalculated {
        saving_amount: Money,
        periods_needed: u32,
    },
}

impl SavingsProjection {
    pub fn mode(&self) -> ProjectionMode {
        match self {
            Self::DateCalculated { .. } => ProjectionMode::DateCalculated,
            Self::AmountCalculated { .. } => ProjectionMode::AmountCalculated,
        }
    }

    pub fn periods_needed(&self) -> u32 {
        match self {
            Self::DateCalculated { periods_needed, .. }
            | Self::AmountCalculated { periods_needed, .. } => *periods_needed,
        }
    }

    pub fn saving_amount(&self) -> Option<Money> {
        match self {
            Self::AmountCalculated { saving_amount, .. } => Some(*saving_amount),
            Self::DateCalculated { .. } => None,
        }
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        match self {
            Self::DateCalculated { target_date, .. } => Some(*target_date),
            Self::AmountCalculated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_to_budget_period() {
        assert_eq!(SavingFrequency::Daily.budget_period(), PeriodKind::Weekly);
        assert_eq!(SavingFrequency::Weekly.budget_period(), PeriodKind::Weekly);
        assert_eq!(SavingFrequency::Monthly.budget_period(), PeriodKind::Monthly);
        assert_eq!(SavingFrequency::Yearly.budget_period(), PeriodKind::Yearly);
    }

    #[test]
    fn test_validation() {
        let user = UserId::new();
        let goal = SavingsGoal::new(user, "Car", Money::from_major(3000), SavingFrequency::Monthly);
        assert!(goal.validate().is_ok());

        let empty = SavingsGoal::new(user, " ", Money::from_major(3000), SavingFrequency::Monthly);
        assert_eq!(empty.validate(), Err(SavingsGoalValidationError::EmptyLabel));

        let zero = SavingsGoal::new(user, "Car", Money::zero(), SavingFrequency::Monthly);
        assert!(matches!(
            zero.validate(),
            Err(SavingsGoalValidationError::NonPositiveTarget(_))
        ));

        // A non-positive saving amount is allowed; solving it yields no result
        let odd = SavingsGoal::new(user, "Car", Money::from_major(10), SavingFrequency::Weekly)
            .with_saving_amount(Money::zero());
        assert!(odd.validate().is_ok());
    }

    #[test]
    fn test_projection_serde() {
        let projection = SavingsProjection::AmountCalculated {
            saving_amount: Money::from_major(300),
            periods_needed: 4,
        };
        let json = serde_json::to_string(&projection).unwrap();
        assert!(json.contains("\"mode\":\"amount_calculated\""));
        assert_eq!(projection.mode(), ProjectionMode::AmountCalculated);
        assert_eq!(projection.periods_needed(), 4);
        assert_eq!(projection.target_date(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(SavingFrequency::parse("Daily"), Some(SavingFrequency::Daily));
        assert_eq!(GoalStatus::parse("canceled"), Some(GoalStatus::Cancelled));
        assert_eq!(SavingFrequency::parse("hourly"), None);
    }
}
