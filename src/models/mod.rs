//! Core data models for ledgerwise
//!
//! This module contains the data structures of the personal-finance domain:
//! accounts, transactions, categories, budgets and savings goals.

pub mod account;
pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod savings_goal;
pub mod transaction;

pub use account::{Account, AccountType, AccountValidationError, Currency};
pub use budget::{Budget, BudgetStatus, BudgetValidationError, DEFAULT_ALERT_THRESHOLD};
pub use category::{Category, CategoryKind, CategoryValidationError};
pub use ids::{AccountId, BudgetId, CategoryId, SavingsGoalId, TransactionId, UserId};
pub use money::{Money, MoneyParseError};
pub use period::{PeriodKind, PeriodWindow};
pub use savings_goal::{
    GoalStatus, ProjectionMode, SavingFrequency, SavingsGoal, SavingsGoalValidationError,
    SavingsProjection,
};
pub use transaction::{
    AdjustmentDirection, Transaction, TransactionKind, TransactionType,
    TransactionValidationError,
};
