use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledgerwise::cli::{
    handle_account_command, handle_budget_command, handle_category_command, handle_goal_command,
    handle_setup_command, handle_transaction_command,
};
use ledgerwise::config::{paths::LedgerPaths, settings::Settings};
use ledgerwise::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledgerwise",
    author = "Kaylee Beyene",
    version,
    about = "Personal finance ledger with budgets and savings goals",
    long_about = "ledgerwise records transactions across accounts and derives \
                  everything else from them: current and projected balances, \
                  spending against budgets, and the plan to reach a savings goal."
)]
struct Cli {
    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true, env = "LEDGERWISE_TODAY")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(ledgerwise::cli::AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(ledgerwise::cli::CategoryCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Txn(ledgerwise::cli::TransactionCommands),

    /// Budget commands
    #[command(subcommand)]
    Budget(ledgerwise::cli::BudgetCommands),

    /// Savings goal commands
    #[command(subcommand)]
    Goal(ledgerwise::cli::GoalCommands),

    /// Create default accounts, categories, budgets and a savings goal
    Setup {
        /// Add missing defaults even when the ledger already has data
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    // Persist the owner id on first run so later records share it
    if !paths.settings_file().exists() {
        settings.save(&paths)?;
    }

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, &settings, today, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Txn(cmd)) => {
            handle_transaction_command(&storage, &settings, today, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &settings, today, cmd)?;
        }
        Some(Commands::Goal(cmd)) => {
            handle_goal_command(&storage, &settings, today, cmd)?;
        }
        Some(Commands::Setup { force }) => {
            handle_setup_command(&storage, &settings, today, force)?;
        }
        Some(Commands::Config) => {
            println!("ledgerwise Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  User:             {}", settings.user_id);
            println!("  Default currency: {}", settings.default_currency);
            println!("  Alert threshold:  {}%", settings.default_alert_threshold);
            println!("  Monthly income:   {}", settings.monthly_income);
            println!("  Date format:      {}", settings.date_format);
            println!("  Today:            {}", today);
        }
        None => {
            println!("ledgerwise - personal finance ledger");
            println!();
            println!("Run 'ledgerwise --help' for usage information.");
        }
    }

    Ok(())
}
