//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod budget;
pub mod category;
pub mod goal;
pub mod setup;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use setup::handle_setup_command;
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;

/// Parse an amount argument such as `"1000"`, `"12.50"` or `"1'000.00"`
pub(crate) fn parse_amount(input: &str) -> LedgerResult<Money> {
    Money::parse(input).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount: '{}'. Use format like '1000.00' or '1000'. Error: {}",
            input, e
        ))
    })
}

/// Parse a `YYYY-MM-DD` date argument
pub(crate) fn parse_date(input: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD", input))
    })
}
