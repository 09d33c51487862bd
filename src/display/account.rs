//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::services::{AccountBalance, CurrencySummary};

/// Format a list of accounts with balances as a table
pub fn format_account_list(balances: &[AccountBalance]) -> String {
    if balances.is_empty() {
        return "No accounts found.".to_string();
    }

    // Calculate column widths
    let name_width = balances
        .iter()
        .map(|b| b.account.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = balances
        .iter()
        .map(|b| b.account.account_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:<3}  {:>12}  {:>12}  {}\n",
        "Name",
        "Type",
        "Cur",
        "Balance",
        "Projected",
        "Status",
        name_width = name_width,
        type_width = type_width,
    ));

    output.push_str(&format!(
        "{:-<name_width$}  {:-<type_width$}  {:-<3}  {:->12}  {:->12}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    ));

    for balance in balances {
        let status = if balance.account.active { "" } else { "Inactive" };

        output.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {:<3}  {:>12}  {:>12}  {}\n",
            balance.account.name,
            balance.account.account_type,
            balance.account.currency,
            balance.current.to_string(),
            balance.projected.to_string(),
            status,
            name_width = name_width,
            type_width = type_width,
        ));
    }

    output
}

/// Format a single account's details
pub fn format_account_details(balance: &AccountBalance) -> String {
    let account = &balance.account;

    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  Type:      {}\n", account.account_type));
    output.push_str(&format!("  Currency:  {}\n", account.currency));
    output.push_str(&format!("  ID:        {}\n", account.id));
    output.push_str(&format!(
        "  Active:    {}\n",
        if account.active { "Yes" } else { "No" }
    ));
    output.push('\n');
    output.push_str(&format!("  Current Balance:   {}\n", balance.current));
    output.push_str(&format!("  Projected Balance: {}\n", balance.projected));

    if !account.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", account.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        account.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Format per-currency totals; currencies are never added together
pub fn format_account_summary(summaries: &[CurrencySummary]) -> String {
    if summaries.is_empty() {
        return "No active accounts.".to_string();
    }

    let mut output = String::new();
    for summary in summaries {
        output.push_str(&format!(
            "{}: {} across {} account(s)\n",
            summary.currency,
            summary.total.format_with_code(summary.currency.code()),
            summary.count
        ));
        for (account_type, total) in &summary.by_type {
            output.push_str(&format!("  {:<12} {:>12}\n", account_type.to_string(), total.to_string()));
        }
    }
    output
}
