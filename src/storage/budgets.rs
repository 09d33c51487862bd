//! Budget repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::warn;

use crate::error::LedgerResult;
use crate::models::{Budget, BudgetId, SavingsGoalId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> LedgerResult<()> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = write_lock(&self.budgets)?;
        budgets.clear();
        for budget in file_data.budgets {
            budgets.insert(budget.id, budget);
        }

        Ok(())
    }

    pub fn save(&self) -> LedgerResult<()> {
        let budgets = read_lock(&self.budgets)?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &BudgetData { budgets: list })
    }

    pub fn get(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        Ok(read_lock(&self.budgets)?.get(&id).cloned())
    }

    /// Budgets of a user, sorted by name
    pub fn get_by_user(&self, user_id: UserId) -> LedgerResult<Vec<Budget>> {
        let budgets = read_lock(&self.budgets)?;

        let mut list: Vec<_> = budgets
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    pub fn get_by_goal(&self, goal_id: SavingsGoalId) -> LedgerResult<Vec<Budget>> {
        let budgets = read_lock(&self.budgets)?;
        Ok(budgets
            .values()
            .filter(|b| b.savings_goal_id == Some(goal_id))
            .cloned()
            .collect())
    }

    /// Find a budget by id (full or short) or by name, case-insensitive
    pub fn find(&self, user_id: UserId, query: &str) -> LedgerResult<Option<Budget>> {
        let budgets = read_lock(&self.budgets)?;
        let query_lower = query.trim().to_lowercase();

        let owned = || budgets.values().filter(|b| b.user_id == user_id);

        Ok(owned()
            .find(|b| b.id.matches(query))
            .or_else(|| owned().find(|b| b.name.to_lowercase() == query_lower))
            .cloned())
    }

    pub fn upsert(&self, budget: Budget) -> LedgerResult<()> {
        write_lock(&self.budgets)?.insert(budget.id, budget);
        Ok(())
    }

    /// Insert a new budget and persist it, undoing the insert if the write fails
    pub fn insert(&self, budget: Budget) -> LedgerResult<Budget> {
        let id = budget.id;
        self.upsert(budget.clone())?;

        if let Err(e) = self.save() {
            warn!(budget = %id, error = %e, "rolling back unsaved budget");
            write_lock(&self.budgets)?.remove(&id);
            return Err(e);
        }

        Ok(budget)
    }
}
