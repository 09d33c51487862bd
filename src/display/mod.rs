//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display,
//! including tables, progress bars, and status labels.

pub mod account;
pub mod budget;
pub mod category;
pub mod savings;
pub mod transaction;

pub use account::{format_account_details, format_account_list, format_account_summary};
pub use budget::{
    format_budget_dashboard, format_budget_list, format_budget_status, format_budget_summary,
};
pub use category::{format_category_totals, format_category_tree};
pub use savings::{format_goal_details, format_goal_list};
pub use transaction::{
    format_monthly_summary, format_transaction_details, format_transaction_register,
    format_transaction_stats,
};
