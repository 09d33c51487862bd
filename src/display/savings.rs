//! Savings goal display formatting

use crate::models::{SavingsGoal, SavingsProjection};

/// One line per goal with its solved quantity
pub fn format_goal_list(goals: &[(SavingsGoal, Option<SavingsProjection>)]) -> String {
    if goals.is_empty() {
        return "No savings goals found.".to_string();
    }

    let label_width = goals.iter().map(|(g, _)| g.label.len()).max().unwrap_or(5).max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<label_width$}  {:>12}  {:<8}  {:<9}  {}\n",
        "Label",
        "Target",
        "Every",
        "Status",
        "Plan",
        label_width = label_width
    ));
    output.push_str(&format!(
        "{:-<label_width$}  {:->12}  {:-<8}  {:-<9}  {:-<4}\n",
        "",
        "",
        "",
        "",
        "",
        label_width = label_width
    ));

    for (goal, projection) in goals {
        output.push_str(&format!(
            "{:<label_width$}  {:>12}  {:<8}  {:<9}  {}\n",
            goal.label,
            goal.target_amount.to_string(),
            goal.saving_frequency.to_string(),
            goal.status.to_string(),
            format_plan(goal, projection.as_ref()),
            label_width = label_width
        ));
    }

    output
}

/// Short description of how the goal is reached
pub fn format_plan(goal: &SavingsGoal, projection: Option<&SavingsProjection>) -> String {
    match projection {
        Some(SavingsProjection::DateCalculated {
            target_date,
            periods_needed,
        }) => format!(
            "{} x {} until {}",
            periods_needed,
            goal.saving_amount.unwrap_or_default(),
            target_date
        ),
        Some(SavingsProjection::AmountCalculated {
            saving_amount,
            periods_needed,
        }) => format!(
            "{} x {} by {}",
            periods_needed,
            saving_amount,
            goal.target_date
                .map_or_else(|| "-".to_string(), |d| d.to_string())
        ),
        None => "(set an amount or a date)".to_string(),
    }
}

pub fn format_goal_details(goal: &SavingsGoal, projection: Option<&SavingsProjection>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Goal: {}\n", goal.label));
    output.push_str(&format!("  ID:         {}\n", goal.id));
    output.push_str(&format!("  Target:     {}\n", goal.target_amount));
    output.push_str(&format!("  Frequency:  {}\n", goal.saving_frequency));
    output.push_str(&format!("  Status:     {}\n", goal.status));
    if let Some(amount) = goal.saving_amount {
        output.push_str(&format!("  Saving:     {} per period\n", amount));
    }
    if let Some(date) = goal.target_date {
        output.push_str(&format!("  By:         {}\n", date));
    }
    output.push('\n');

    match projection {
        Some(SavingsProjection::DateCalculated {
            target_date,
            periods_needed,
        }) => {
            output.push_str(&format!("  Reached on:     {}\n", target_date));
            output.push_str(&format!("  Periods needed: {}\n", periods_needed));
        }
        Some(SavingsProjection::AmountCalculated {
            saving_amount,
            periods_needed,
        }) => {
            output.push_str(&format!("  Save per period: {}\n", saving_amount));
            output.push_str(&format!("  Periods needed:  {}\n", periods_needed));
        }
        None => output.push_str("  Not enough information to project this goal.\n"),
    }

    if !goal.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", goal.notes));
    }

    output
}
