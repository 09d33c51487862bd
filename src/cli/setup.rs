//! Setup command: seed a new ledger with default data

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::services::SetupService;
use crate::storage::Storage;

/// Handle the setup command
pub fn handle_setup_command(
    storage: &Storage,
    settings: &Settings,
    today: NaiveDate,
    force: bool,
) -> LedgerResult<()> {
    let summary = SetupService::new(storage).seed_defaults(
        settings.user_id,
        settings.default_currency,
        today,
        force,
    )?;

    if summary.total() == 0 {
        println!("Nothing to add; every default already exists.");
        return Ok(());
    }

    println!("Created default data:");
    println!("  Accounts:   {}", summary.accounts);
    println!("  Categories: {}", summary.categories);
    println!("  Budgets:    {}", summary.budgets);
    println!("  Goals:      {}", summary.goals);

    Ok(())
}
