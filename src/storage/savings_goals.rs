//! Savings goal repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerResult;
use crate::models::{SavingsGoal, SavingsGoalId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SavingsGoalData {
    #[serde(default)]
    goals: Vec<SavingsGoal>,
}

pub struct SavingsGoalRepository {
    path: PathBuf,
    goals: RwLock<HashMap<SavingsGoalId, SavingsGoal>>,
}

impl SavingsGoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            goals: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> LedgerResult<()> {
        let file_data: SavingsGoalData = read_json(&self.path)?;

        let mut goals = write_lock(&self.goals)?;
        goals.clear();
        for goal in file_data.goals {
            goals.insert(goal.id, goal);
        }

        Ok(())
    }

    pub fn save(&self) -> LedgerResult<()> {
        let goals = read_lock(&self.goals)?;

        let mut list: Vec<_> = goals.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &SavingsGoalData { goals: list })
    }

    pub fn get(&self, id: SavingsGoalId) -> LedgerResult<Option<SavingsGoal>> {
        Ok(read_lock(&self.goals)?.get(&id).cloned())
    }

    /// Goals of a user, newest first
    pub fn get_by_user(&self, user_id: UserId) -> LedgerResult<Vec<SavingsGoal>> {
        let goals = read_lock(&self.goals)?;

        let mut list: Vec<_> = goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Find a goal by id (full or short) or by label, case-insensitive
    pub fn find(&self, user_id: UserId, query: &str) -> LedgerResult<Option<SavingsGoal>> {
        let goals = read_lock(&self.goals)?;
        let query_lower = query.trim().to_lowercase();

        let owned = || goals.values().filter(|g| g.user_id == user_id);

        Ok(owned()
            .find(|g| g.id.matches(query))
            .or_else(|| owned().find(|g| g.label.to_lowercase() == query_lower))
            .cloned())
    }

    pub fn upsert(&self, goal: SavingsGoal) -> LedgerResult<()> {
        write_lock(&self.goals)?.insert(goal.id, goal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, SavingFrequency};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("savings_goals.json");
        let repo = SavingsGoalRepository::new(path.clone());
        let user = UserId::new();

        let goal = SavingsGoal::new(user, "Holiday", Money::from_major(1200), SavingFrequency::Monthly)
            .with_saving_amount(Money::from_major(100));
        let id = goal.id;
        repo.upsert(goal).unwrap();
        repo.save().unwrap();

        let reloaded = SavingsGoalRepository::new(path);
        reloaded.load().unwrap();
        let goal = reloaded.get(id).unwrap().unwrap();
        assert_eq!(goal.saving_amount, Some(Money::from_major(100)));
        assert!(reloaded.find(user, "holiday").unwrap().is_some());
        assert_eq!(reloaded.get_by_user(user).unwrap().len(), 1);
    }
}
