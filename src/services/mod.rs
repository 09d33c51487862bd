//! Service layer for ledgerwise
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, derived balances and budget figures, and the
//! savings goal solver.

pub mod account;
pub mod budget;
pub mod category;
pub mod period;
pub mod savings;
pub mod setup;
pub mod transaction;

pub use account::{AccountBalance, AccountService, CurrencySummary};
pub use budget::{BudgetDashboard, BudgetService, BudgetSummary, DashboardRow};
pub use category::CategoryService;
pub use period::{resolve_capped_window, resolve_window};
pub use savings::SavingsService;
pub use setup::{SeedSummary, SetupService};
pub use transaction::{
    CategoryTotal, MonthSummary, TransactionEdit, TransactionService, TransactionStats, TypeStats,
};
