//! Account CLI commands
//!
//! Implements CLI commands for account management.

use chrono::NaiveDate;
use clap::Subcommand;

use super::parse_amount;
use crate::config::settings::Settings;
use crate::display::account::{format_account_details, format_account_list, format_account_summary};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountType, Currency, Transaction, TransactionKind};
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (checking, savings, credit, cash, investment, loan, other)
        #[arg(short = 't', long, default_value = "checking")]
        account_type: String,
        /// Currency code (CHF, EUR, USD, GBP); defaults to the configured one
        #[arg(short, long)]
        currency: Option<String>,
        /// Opening balance (e.g., "1000.00" or "-250")
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
    },
    /// List accounts with current and projected balances
    List {
        /// Include inactive accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Set the current balance, recording the difference as an adjustment
    SetBalance {
        /// Account name or ID
        account: String,
        /// Target balance
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Activate or deactivate an account
    Toggle {
        /// Account name or ID
        account: String,
    },
    /// Totals of active accounts per currency
    Summary,
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    today: NaiveDate,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);
    let user_id = settings.user_id;

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            currency,
            balance,
        } => {
            let account_type = AccountType::parse(&account_type).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid account type: '{}'. Valid types: checking, savings, credit, cash, investment, loan, other",
                    account_type
                ))
            })?;

            let currency = match currency {
                Some(code) => Currency::parse(&code).ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "Invalid currency: '{}'. Valid currencies: CHF, EUR, USD, GBP",
                        code
                    ))
                })?,
                None => settings.default_currency,
            };

            let opening_balance = parse_amount(&balance)?;
            let account =
                service.create(user_id, &name, account_type, currency, opening_balance, today)?;

            println!("Created account: {}", account.name);
            println!("  Type: {}", account.account_type);
            println!("  Currency: {}", account.currency);
            println!("  Opening Balance: {}", opening_balance);
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { all } => {
            let balances = service.list_with_balances(user_id, all, today)?;
            println!("{}", format_account_list(&balances));
        }

        AccountCommands::Show { account } => {
            let found = service.find(user_id, &account)?;
            let balance = service.balance(&found, today)?;
            print!("{}", format_account_details(&balance));
        }

        AccountCommands::SetBalance { account, amount } => {
            let found = service.find(user_id, &account)?;
            let target = parse_amount(&amount)?;

            match service.set_balance(found.id, target, today)? {
                Some(adjustment) => println!(
                    "Adjusted {} by {}{} to {}",
                    found.name,
                    adjustment_sign(&adjustment),
                    adjustment.amount,
                    target
                ),
                None => println!("{} is already at {}", found.name, target),
            }
        }

        AccountCommands::Toggle { account } => {
            let found = service.find(user_id, &account)?;
            let toggled = service.toggle_active(found.id)?;
            let state = if toggled.active { "Activated" } else { "Deactivated" };
            println!("{} account: {}", state, toggled.name);
        }

        AccountCommands::Summary => {
            let summaries = service.summary(user_id, today)?;
            println!("{}", format_account_summary(&summaries));
        }
    }

    Ok(())
}

fn adjustment_sign(txn: &Transaction) -> String {
    match &txn.kind {
        TransactionKind::Adjustment { direction } => direction.to_string(),
        _ => String::new(),
    }
}
