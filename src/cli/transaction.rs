//! Transaction CLI commands
//!
//! Implements CLI commands for recording and listing transactions.

use chrono::{Datelike, NaiveDate};
use clap::Subcommand;

use super::{parse_amount, parse_date};
use crate::config::settings::Settings;
use crate::display::category::format_category_totals;
use crate::display::transaction::{
    format_monthly_summary, format_transaction_details, format_transaction_register,
    format_transaction_stats,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AdjustmentDirection, CategoryKind, Transaction, TransactionType};
use crate::services::{AccountService, CategoryService, TransactionEdit, TransactionService};
use crate::storage::{Storage, TransactionQuery};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a new transaction
    Add {
        /// Account name or ID (the source account for transfers)
        account: String,
        /// Amount, always positive (e.g., "50.00")
        amount: String,
        /// Type (income, expense, transfer, adjustment)
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Destination account for transfers
        #[arg(long)]
        to: Option<String>,
        /// Direction for adjustments (increase or decrease)
        #[arg(long)]
        direction: Option<String>,
        /// Category name
        #[arg(short, long)]
        category: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List transactions
    List {
        /// Filter by account name or ID (includes transfers it received)
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by type
        #[arg(short, long)]
        kind: Option<String>,
        /// Filter by category name
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },
    /// Change the date, amount, category or description of a transaction
    Edit {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New category name
        #[arg(short, long, conflicts_with = "no_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        no_category: bool,
        /// New description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Income, expense and net per month of a year
    Monthly {
        /// Year, defaults to the current one
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Income, expense and transfer totals
    Stats {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Totals per category
    #[command(name = "by-category")]
    ByCategory {
        /// Category kind (income or expense)
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

fn parse_optional_date(input: Option<String>) -> LedgerResult<Option<NaiveDate>> {
    input.as_deref().map(parse_date).transpose()
}

fn parse_kind(input: &str) -> LedgerResult<TransactionType> {
    TransactionType::parse(input).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid transaction type: '{}'. Valid types: income, expense, transfer, adjustment",
            input
        ))
    })
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    today: NaiveDate,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);
    let categories = CategoryService::new(storage);
    let user_id = settings.user_id;

    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            kind,
            to,
            direction,
            category,
            date,
            description,
        } => {
            let account = accounts.find(user_id, &account)?;
            let amount = parse_amount(&amount)?;
            let date = parse_optional_date(date)?.unwrap_or(today);

            let mut txn = match parse_kind(&kind)? {
                TransactionType::Income => Transaction::income(user_id, account.id, amount, date),
                TransactionType::Expense => Transaction::expense(user_id, account.id, amount, date),
                TransactionType::Transfer => {
                    let to = to.ok_or_else(|| {
                        LedgerError::Validation("A transfer needs a destination (--to)".into())
                    })?;
                    let destination = accounts.find(user_id, &to)?;
                    Transaction::transfer(user_id, account.id, destination.id, amount, date)
                }
                TransactionType::Adjustment => {
                    let direction = match direction.as_deref().map(str::to_lowercase).as_deref() {
                        Some("increase" | "+") => AdjustmentDirection::Increase,
                        Some("decrease" | "-") => AdjustmentDirection::Decrease,
                        _ => {
                            return Err(LedgerError::Validation(
                                "An adjustment needs --direction increase or decrease".into(),
                            ))
                        }
                    };
                    Transaction::adjustment(user_id, account.id, direction, amount, date)
                }
            };

            if let Some(name) = category {
                txn = txn.with_category(categories.find(user_id, &name)?.id);
            }
            if let Some(description) = description {
                txn = txn.with_description(description);
            }

            let txn = service.record(txn)?;
            println!("Recorded {} in {}", txn, account.name);
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            account,
            kind,
            category,
            from,
            to,
            limit,
        } => {
            let mut query = TransactionQuery::new().user(user_id);
            query.date_from = parse_optional_date(from)?;
            query.date_to = parse_optional_date(to)?;
            if let Some(kind) = kind {
                query = query.kind(parse_kind(&kind)?);
            }
            if let Some(name) = category {
                query = query.category(categories.find(user_id, &name)?.id);
            }

            match account {
                Some(account) => {
                    let account = accounts.find(user_id, &account)?;
                    let transactions = service.list_for_account(account.id, &query, Some(limit))?;
                    println!("Account: {}", account.name);
                    print!("{}", format_transaction_register(&transactions, Some(account.id)));
                }
                None => {
                    let transactions = service.list(&query, Some(limit))?;
                    print!("{}", format_transaction_register(&transactions, None));
                }
            }
        }

        TransactionCommands::Show { id } => {
            let txn = service.find(user_id, &id)?;
            let account = accounts.get(txn.account_id)?;
            let destination = txn
                .destination_account_id()
                .map(|id| accounts.get(id))
                .transpose()?;
            let category = txn
                .category_id
                .map(|id| storage.categories.get(id))
                .transpose()?
                .flatten();

            print!(
                "{}",
                format_transaction_details(
                    &txn,
                    &account.name,
                    destination.as_ref().map(|a| a.name.as_str()),
                    category.as_ref().map(|c| c.name.as_str()),
                )
            );
        }

        TransactionCommands::Edit {
            id,
            amount,
            date,
            category,
            no_category,
            description,
        } => {
            let txn = service.find(user_id, &id)?;

            let category_id = match (category, no_category) {
                (Some(name), _) => Some(Some(categories.find(user_id, &name)?.id)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let edit = TransactionEdit {
                date: parse_optional_date(date)?,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                category_id,
                description,
            };

            let updated = service.update(txn.id, edit)?;
            println!("Updated {}", updated);
        }

        TransactionCommands::Delete { id } => {
            let txn = service.find(user_id, &id)?;
            let deleted = service.delete(txn.id)?;
            println!("Deleted {}", deleted);
        }

        TransactionCommands::Monthly { year } => {
            let year = year.unwrap_or_else(|| today.year());
            let months = service.monthly_summary(user_id, year, today)?;
            print!("{}", format_monthly_summary(year, &months));
        }

        TransactionCommands::Stats { from, to } => {
            let stats = service.stats(
                user_id,
                parse_optional_date(from)?,
                parse_optional_date(to)?,
                today,
            )?;
            print!("{}", format_transaction_stats(&stats));
        }

        TransactionCommands::ByCategory { kind, from, to } => {
            let kind = CategoryKind::parse(&kind).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid category kind: '{}'. Valid kinds: income, expense",
                    kind
                ))
            })?;
            let totals = service.by_category(
                user_id,
                kind,
                parse_optional_date(from)?,
                parse_optional_date(to)?,
                today,
            )?;
            println!("{}", format_category_totals(&totals));
        }
    }

    Ok(())
}
