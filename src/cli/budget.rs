//! Budget CLI commands
//!
//! Implements CLI commands for creating budgets and checking them against
//! actual spending.

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_amount, parse_date};
use crate::config::settings::Settings;
use crate::display::budget::{
    format_budget_dashboard, format_budget_list, format_budget_status, format_budget_summary,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, PeriodKind};
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget for an expense category, or a savings budget
    Create {
        /// Budget name
        name: String,
        /// Amount per period (e.g., "500" or "500.00")
        amount: String,
        /// Expense category to track
        #[arg(short, long, conflicts_with = "savings")]
        category: Option<String>,
        /// Track transfers into savings accounts instead of a category
        #[arg(long)]
        savings: bool,
        /// Period (weekly, monthly, yearly)
        #[arg(short, long, default_value = "monthly")]
        period: String,
        /// First day the budget applies (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,
        /// Last day the budget applies (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Alert threshold in percent, defaults to the configured one
        #[arg(short, long)]
        threshold: Option<u8>,
    },

    /// List budgets with their status for the current period
    List {
        /// Include inactive budgets
        #[arg(short, long)]
        all: bool,
    },

    /// Show spent and projected figures for one budget
    Status {
        /// Budget name or ID
        budget: String,
    },

    /// Totals over all active budgets
    Summary,

    /// Planned against actual spending for the current month
    Dashboard {
        /// Expected monthly income, defaults to the configured one
        #[arg(short, long)]
        income: Option<String>,
    },

    /// Activate or deactivate a budget
    Toggle {
        /// Budget name or ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    today: NaiveDate,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let service = BudgetService::new(storage);
    let user_id = settings.user_id;

    match cmd {
        BudgetCommands::Create {
            name,
            amount,
            category,
            savings,
            period,
            start,
            end,
            threshold,
        } => {
            let amount = parse_amount(&amount)?;
            let period = PeriodKind::parse(&period).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid period: '{}'. Valid periods: weekly, monthly, yearly",
                    period
                ))
            })?;
            let start = start.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            let end = end.as_deref().map(parse_date).transpose()?;

            let budget = match (category, savings) {
                (Some(name_or_id), false) => {
                    let category = CategoryService::new(storage).find(user_id, &name_or_id)?;
                    Budget::for_category(user_id, name, category.id, amount, period, start)
                }
                (None, true) => Budget::for_savings(user_id, name, amount, period, start, None),
                _ => {
                    return Err(LedgerError::Validation(
                        "Give either --category or --savings".into(),
                    ))
                }
            };
            let budget = budget
                .with_end_date(end)
                .with_alert_threshold(threshold.unwrap_or(settings.default_alert_threshold));

            let budget = service.create(budget)?;
            println!("Created budget: {}", budget.name);
            println!("  Amount: {} {}", budget.amount, budget.period);
            println!("  ID: {}", budget.id);
        }

        BudgetCommands::List { all } => {
            let budgets = service.list_with_status(user_id, all, today)?;
            println!("{}", format_budget_list(&budgets));
        }

        BudgetCommands::Status { budget } => {
            let budget = service.find(user_id, &budget)?;
            let status = service.status(&budget, today)?;

            let tracking = match budget.category_id {
                Some(id) => storage
                    .categories
                    .get(id)?
                    .map_or_else(|| id.to_string(), |c| c.name),
                None => "Transfers into savings accounts".to_string(),
            };
            print!("{}", format_budget_status(&budget, &status, &tracking));
        }

        BudgetCommands::Summary => {
            let summary = service.summary(user_id, today)?;
            print!("{}", format_budget_summary(&summary));
        }

        BudgetCommands::Dashboard { income } => {
            let income = match income {
                Some(amount) => parse_amount(&amount)?,
                None => settings.monthly_income,
            };
            let dashboard = service.dashboard(user_id, income, today)?;
            print!("{}", format_budget_dashboard(&dashboard));
        }

        BudgetCommands::Toggle { budget } => {
            let found = service.find(user_id, &budget)?;
            let toggled = service.toggle_active(found.id)?;
            let state = if toggled.active { "Activated" } else { "Deactivated" };
            println!("{} budget: {}", state, toggled.name);
        }
    }

    Ok(())
}
