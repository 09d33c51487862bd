//! Budget display formatting
//!
//! Tables of budgets with their current status, a detail view with
//! projections, and the overall summary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Budget, BudgetStatus};
use crate::services::{BudgetDashboard, BudgetSummary};

const BAR_WIDTH: usize = 20;

/// Format a percentage to one decimal place
pub fn format_percentage(pct: Decimal) -> String {
    format!(
        "{}%",
        pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Progress bar for a percentage, full at 100 and beyond
pub fn format_bar(pct: Decimal, width: usize) -> String {
    if pct <= Decimal::ZERO {
        return "░".repeat(width);
    }

    let ratio = pct.min(Decimal::ONE_HUNDRED) / Decimal::ONE_HUNDRED;
    let filled = (ratio * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(width)
        .min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn status_label(status: &BudgetStatus) -> &'static str {
    if status.is_over_budget {
        "OVER"
    } else if status.is_alert_triggered {
        "ALERT"
    } else if status.is_projected_over_budget {
        "on track to exceed"
    } else {
        ""
    }
}

/// Format budgets with their current status as a table
pub fn format_budget_list(budgets: &[(Budget, BudgetStatus)]) -> String {
    if budgets.is_empty() {
        return "No budgets found.".to_string();
    }

    let name_width = budgets
        .iter()
        .map(|(b, _)| b.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<7}  {:>10}  {:>10}  {:>10}  {:>7}  {}\n",
        "Name",
        "Period",
        "Amount",
        "Spent",
        "Remaining",
        "Used",
        "Status",
        name_width = name_width
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<7}  {:->10}  {:->10}  {:->10}  {:->7}  {:-<6}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width
    ));

    for (budget, status) in budgets {
        let label = if budget.active { status_label(status) } else { "inactive" };
        output.push_str(&format!(
            "{:<name_width$}  {:<7}  {:>10}  {:>10}  {:>10}  {:>7}  {}\n",
            budget.name,
            budget.period.to_string(),
            budget.amount.to_string(),
            status.spent.to_string(),
            status.remaining.to_string(),
            format_percentage(status.percentage_used),
            label,
            name_width = name_width
        ));
    }

    output
}

/// Format one budget with both the to-date and whole-period figures
pub fn format_budget_status(budget: &Budget, status: &BudgetStatus, tracking: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:        {}\n", budget.id));
    output.push_str(&format!("  Tracks:    {}\n", tracking));
    output.push_str(&format!("  Period:    {}\n", budget.period));
    output.push_str(&format!("  Amount:    {}\n", budget.amount));
    output.push_str(&format!("  Alert at:  {}%\n", budget.alert_threshold));
    match budget.end_date {
        Some(end) => output.push_str(&format!("  Valid:     {} to {}\n", budget.start_date, end)),
        None => output.push_str(&format!("  Valid:     from {}\n", budget.start_date)),
    }
    output.push('\n');

    output.push_str(&format!(
        "  So far ({} to {})\n",
        status.window.start, status.window.end
    ));
    output.push_str(&format!(
        "    {} {}\n",
        format_bar(status.percentage_used, BAR_WIDTH),
        format_percentage(status.percentage_used)
    ));
    output.push_str(&format!("    Spent:     {}\n", status.spent));
    output.push_str(&format!("    Remaining: {}\n", status.remaining));

    output.push_str(&format!(
        "  Whole period ({} to {})\n",
        status.projected_window.start, status.projected_window.end
    ));
    output.push_str(&format!(
        "    {} {}\n",
        format_bar(status.projected_percentage, BAR_WIDTH),
        format_percentage(status.projected_percentage)
    ));
    output.push_str(&format!("    Projected: {}\n", status.projected));
    output.push_str(&format!("    Remaining: {}\n", status.projected_remaining));

    let label = status_label(status);
    if !label.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Status: {}\n", label));
    }

    output
}

pub fn format_budget_summary(summary: &BudgetSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("Active budgets: {}\n", summary.total_budgets));
    output.push_str(&format!("Total amount:   {}\n", summary.total_amount));
    output.push_str(&format!("Total spent:    {}\n", summary.total_spent));
    output.push_str(&format!("Remaining:      {}\n", summary.total_remaining));
    output.push_str(&format!(
        "Used:           {}\n",
        format_percentage(summary.percentage_used)
    ));
    output.push_str(&format!(
        "Over budget:    {}\nAlerts:         {}\n",
        summary.over_budget_count, summary.alert_count
    ));
    output
}

/// Format planned against actual spending for the current month
pub fn format_budget_dashboard(dashboard: &BudgetDashboard) -> String {
    let mut output = format!("Budget dashboard, {}\n\n", dashboard.window);

    if dashboard.rows.is_empty() {
        output.push_str("No monthly budgets or spending this month.\n");
    } else {
        let name_width = dashboard
            .rows
            .iter()
            .map(|r| r.category_name.chars().count())
            .max()
            .unwrap_or(8)
            .max(8);

        output.push_str(&format!(
            "{:<width$}  {:>12} {:>12} {:>12}\n",
            "Category",
            "Planned",
            "Actual",
            "Gap",
            width = name_width
        ));
        output.push_str(&"-".repeat(name_width + 40));
        output.push('\n');

        for row in &dashboard.rows {
            let mark = if row.unbudgeted {
                "  (no budget)"
            } else if row.is_over {
                "  OVER"
            } else {
                ""
            };
            output.push_str(&format!(
                "{:<width$}  {:>12} {:>12} {:>12}{}\n",
                row.category_name,
                row.planned.to_string(),
                row.actual.to_string(),
                row.gap.to_string(),
                mark,
                width = name_width
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Income:   {} planned, {} actual\n",
        dashboard.monthly_income, dashboard.actual_income
    ));
    output.push_str(&format!(
        "Spending: {} planned, {} actual\n",
        dashboard.total_budget, dashboard.total_actual
    ));
    output.push_str(&format!(
        "Balance:  {} planned, {} actual ({} against plan)\n",
        dashboard.planned_balance, dashboard.actual_balance, dashboard.gap
    ));

    output
}
