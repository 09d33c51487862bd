//! Category display formatting
//!
//! Formats categories as a tree under their kind, and per-category totals.

use crate::models::{Category, CategoryKind};
use crate::services::CategoryTotal;

/// Format categories as a tree grouped by kind
pub fn format_category_tree(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'ledgerwise category add <name>' to create one."
            .to_string();
    }

    let mut output = String::new();

    let kinds = [CategoryKind::Income, CategoryKind::Expense];
    let groups: Vec<(CategoryKind, Vec<&Category>)> = kinds
        .iter()
        .map(|&kind| (kind, categories.iter().filter(|c| c.kind == kind).collect::<Vec<_>>()))
        .filter(|(_, list)| !list.is_empty())
        .collect();

    for (i, (kind, list)) in groups.iter().enumerate() {
        output.push_str(&format!("{}\n", kind));

        for (j, category) in list.iter().enumerate() {
            let is_last = j == list.len() - 1;
            let prefix = if is_last { "└── " } else { "├── " };
            output.push_str(&format!("  {}{}\n", prefix, category.name));
        }

        // Add blank line between groups (except after last)
        if i < groups.len() - 1 {
            output.push('\n');
        }
    }

    output
}

/// Format totals per category, largest first
pub fn format_category_totals(totals: &[CategoryTotal]) -> String {
    if totals.is_empty() {
        return "No transactions in this range.".to_string();
    }

    let name_width = totals.iter().map(|t| t.name.len()).max().unwrap_or(8).max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:>5}\n",
        "Category",
        "Total",
        "Count",
        name_width = name_width
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:->5}\n",
        "",
        "",
        "",
        name_width = name_width
    ));

    for total in totals {
        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:>5}\n",
            total.name,
            total.total.to_string(),
            total.count,
            name_width = name_width
        ));
    }

    output
}
