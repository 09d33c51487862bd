//! Savings goal CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_amount, parse_date};
use crate::config::settings::Settings;
use crate::display::savings::{format_goal_details, format_goal_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{GoalStatus, SavingFrequency, SavingsGoal};
use crate::services::savings::project;
use crate::services::SavingsService;
use crate::storage::Storage;

/// Savings goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a savings goal
    ///
    /// Give a saving amount to solve the date the target is reached, or a
    /// target date to solve the amount to save per period.
    Create {
        /// Goal label
        label: String,
        /// Target amount
        target: String,
        /// Amount saved per period
        #[arg(short, long)]
        amount: Option<String>,
        /// Date the target should be reached (YYYY-MM-DD)
        #[arg(short, long)]
        by: Option<String>,
        /// Saving frequency (daily, weekly, monthly, yearly)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
    },

    /// List goals with their plan
    List,

    /// Solve a goal as of today
    Solve {
        /// Goal label or ID
        goal: String,
    },

    /// Create a savings budget for a goal
    #[command(name = "create-budget")]
    CreateBudget {
        /// Goal label or ID
        goal: String,
    },

    /// Mark a goal active, reached or cancelled
    #[command(name = "set-status")]
    SetStatus {
        /// Goal label or ID
        goal: String,
        /// New status
        status: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    today: NaiveDate,
    cmd: GoalCommands,
) -> LedgerResult<()> {
    let service = SavingsService::new(storage);
    let user_id = settings.user_id;

    match cmd {
        GoalCommands::Create {
            label,
            target,
            amount,
            by,
            frequency,
        } => {
            let frequency = SavingFrequency::parse(&frequency).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid frequency: '{}'. Valid frequencies: daily, weekly, monthly, yearly",
                    frequency
                ))
            })?;

            let mut goal = SavingsGoal::new(user_id, label, parse_amount(&target)?, frequency);
            if let Some(amount) = amount {
                goal = goal.with_saving_amount(parse_amount(&amount)?);
            }
            if let Some(by) = by {
                goal = goal.with_target_date(parse_date(&by)?);
            }

            let goal = service.create(goal)?;
            let projection = project(&goal, today);
            print!("{}", format_goal_details(&goal, projection.as_ref()));
        }

        GoalCommands::List => {
            let goals: Vec<_> = service
                .list(user_id)?
                .into_iter()
                .map(|goal| {
                    let projection = project(&goal, today);
                    (goal, projection)
                })
                .collect();
            println!("{}", format_goal_list(&goals));
        }

        GoalCommands::Solve { goal } => {
            let goal = service.find(user_id, &goal)?;
            let projection = service.solve(goal.id, today)?;
            print!("{}", format_goal_details(&goal, projection.as_ref()));
        }

        GoalCommands::CreateBudget { goal } => {
            let goal = service.find(user_id, &goal)?;
            let budget = service.create_budget(goal.id, today)?;

            println!("Created budget: {}", budget.name);
            println!("  Amount: {} {}", budget.amount, budget.period);
            if let Some(end) = budget.end_date {
                println!("  Until: {}", end);
            }
            println!("  ID: {}", budget.id);
        }

        GoalCommands::SetStatus { goal, status } => {
            let status = GoalStatus::parse(&status).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid status: '{}'. Valid statuses: active, reached, cancelled",
                    status
                ))
            })?;
            let goal = service.find(user_id, &goal)?;
            let updated = service.set_status(goal.id, status)?;
            println!("{} is now {}", updated.label, updated.status);
        }
    }

    Ok(())
}
