//! Transaction display formatting
//!
//! Provides utilities for formatting transactions for terminal display,
//! including register views and income/expense statistics.

use crate::models::{AccountId, Transaction, TransactionKind};
use crate::services::{MonthSummary, TransactionStats, TypeStats};

/// Format a single transaction for display (register row)
///
/// With a `perspective` account the amount is shown signed as it affects
/// that account; otherwise the stored positive amount is shown.
pub fn format_transaction_row(txn: &Transaction, perspective: Option<AccountId>) -> String {
    let type_icon = match &txn.kind {
        TransactionKind::Income => "+",
        TransactionKind::Expense => "-",
        TransactionKind::Transfer { .. } => "⇄",
        TransactionKind::Adjustment { .. } => "~",
    };

    let amount = match perspective {
        Some(account_id) => txn.effect_on(account_id),
        None => txn.amount,
    };

    let description = if txn.description.is_empty() {
        "(no description)"
    } else {
        &txn.description
    };

    format!(
        "{} {} {:<10} {:20} {:>12}",
        type_icon,
        txn.date.format("%Y-%m-%d"),
        txn.transaction_type().to_string(),
        truncate(description, 20),
        amount.to_string()
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(
    transactions: &[Transaction],
    perspective: Option<AccountId>,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:1} {:10} {:<10} {:20} {:>12}\n",
        "", "Date", "Type", "Description", "Amount"
    ));
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, perspective));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(
    txn: &Transaction,
    account_name: &str,
    destination_name: Option<&str>,
    category_name: Option<&str>,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Type:        {}\n", txn.transaction_type()));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Account:     {}\n", account_name));

    if let Some(destination) = destination_name {
        output.push_str(&format!("To:          {}\n", destination));
    }

    if let TransactionKind::Adjustment { direction } = &txn.kind {
        output.push_str(&format!("Direction:   {}\n", direction));
    }

    match category_name {
        Some(name) => output.push_str(&format!("Category:    {}\n", name)),
        None => output.push_str("Category:    (uncategorized)\n"),
    }

    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }
    if !txn.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", txn.notes));
    }

    output
}

/// Format income, expense and transfer totals for a date range
pub fn format_transaction_stats(stats: &TransactionStats) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:>12} {:>6} {:>12}\n",
        "Type", "Total", "Count", "Scheduled"
    ));
    output.push_str(&"-".repeat(43));
    output.push('\n');

    let rows: [(&str, &TypeStats); 3] = [
        ("Income", &stats.income),
        ("Expense", &stats.expense),
        ("Transfer", &stats.transfer),
    ];
    for (label, row) in rows {
        output.push_str(&format!(
            "{:<10} {:>12} {:>6} {:>12}\n",
            label,
            row.total.to_string(),
            row.count,
            row.future.to_string()
        ));
    }

    output.push_str(&"-".repeat(43));
    output.push('\n');
    output.push_str(&format!("{:<10} {:>12}\n", "Net", stats.net.to_string()));

    output
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format income, expense and net per month of one year
pub fn format_monthly_summary(year: i32, months: &[MonthSummary]) -> String {
    let mut output = format!("{}\n", year);
    output.push_str(&format!(
        "{:<5} {:>12} {:>12} {:>12}\n",
        "Month", "Income", "Expense", "Net"
    ));
    output.push_str(&"-".repeat(44));
    output.push('\n');

    for summary in months {
        let name = summary
            .month
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i as usize))
            .copied()
            .unwrap_or("?");
        output.push_str(&format!(
            "{:<5} {:>12} {:>12} {:>12}\n",
            name,
            summary.income.to_string(),
            summary.expense.to_string(),
            summary.net.to_string()
        ));
    }

    output
}

/// Truncate a string to a maximum length, padding shorter ones
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
