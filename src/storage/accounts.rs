//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to `accounts.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerResult;
use crate::models::{Account, AccountId, AccountType, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

/// Repository for account persistence
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> LedgerResult<()> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for account in file_data.accounts {
            data.insert(account.id, account);
        }

        Ok(())
    }

    pub fn save(&self) -> LedgerResult<()> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &AccountData { accounts })
    }

    pub fn get(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All accounts of a user, sorted by name
    pub fn get_by_user(&self, user_id: UserId) -> LedgerResult<Vec<Account>> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(accounts)
    }

    /// Directory filter by (user, type, active)
    pub fn filter(
        &self,
        user_id: UserId,
        account_type: Option<AccountType>,
        active: Option<bool>,
    ) -> LedgerResult<Vec<Account>> {
        Ok(self
            .get_by_user(user_id)?
            .into_iter()
            .filter(|a| account_type.map_or(true, |t| a.account_type == t))
            .filter(|a| active.map_or(true, |flag| a.active == flag))
            .collect())
    }

    /// Find an account by id (full or short) or by name, case-insensitive
    pub fn find(&self, user_id: UserId, query: &str) -> LedgerResult<Option<Account>> {
        let data = read_lock(&self.data)?;
        let query_lower = query.trim().to_lowercase();

        let owned = || data.values().filter(|a| a.user_id == user_id);

        Ok(owned()
            .find(|a| a.id.matches(query))
            .or_else(|| owned().find(|a| a.name.to_lowercase() == query_lower))
            .cloned())
    }

    pub fn upsert(&self, account: Account) -> LedgerResult<()> {
        write_lock(&self.data)?.insert(account.id, account);
        Ok(())
    }

    /// Remove an account in memory only
    pub fn remove(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        Ok(write_lock(&self.data)?.remove(&id))
    }

    pub fn name_exists(
        &self,
        user_id: UserId,
        name: &str,
        exclude_id: Option<AccountId>,
    ) -> LedgerResult<bool> {
        let data = read_lock(&self.data)?;
        let name_lower = name.to_lowercase();
        Ok(data.values().any(|a| {
            a.user_id == user_id && a.name.to_lowercase() == name_lower && Some(a.id) != exclude_id
        }))
    }

    pub fn count(&self) -> LedgerResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AccountRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = AccountRepository::new(temp_dir.path().join("accounts.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let account = Account::new(UserId::new(), "Savings", AccountType::Savings, Currency::Chf);
        let id = account.id;
        repo.upsert(account).unwrap();
        repo.save().unwrap();

        let reloaded = AccountRepository::new(temp_dir.path().join("accounts.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(id).unwrap().unwrap().name, "Savings");
    }

    #[test]
    fn test_filter_by_user_type_and_active() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();

        let mut closed = Account::new(user, "Old savings", AccountType::Savings, Currency::Chf);
        closed.set_active(false);
        repo.upsert(closed).unwrap();
        repo.upsert(Account::new(user, "Savings", AccountType::Savings, Currency::Chf))
            .unwrap();
        repo.upsert(Account::new(user, "Main", AccountType::Checking, Currency::Chf))
            .unwrap();
        repo.upsert(Account::new(UserId::new(), "Theirs", AccountType::Savings, Currency::Chf))
            .unwrap();

        let active_savings = repo
            .filter(user, Some(AccountType::Savings), Some(true))
            .unwrap();
        assert_eq!(active_savings.len(), 1);
        assert_eq!(active_savings[0].name, "Savings");

        assert_eq!(repo.filter(user, None, None).unwrap().len(), 3);
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let account = Account::new(user, "My Checking", AccountType::Checking, Currency::Eur);
        let id = account.id;
        repo.upsert(account).unwrap();

        assert!(repo.find(user, "my checking").unwrap().is_some());
        assert!(repo.find(user, &id.to_string()).unwrap().is_some());
        assert!(repo.find(UserId::new(), "my checking").unwrap().is_none());
        assert!(repo.find(user, "other").unwrap().is_none());
    }

    #[test]
    fn test_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let account = Account::new(user, "Test Account", AccountType::Checking, Currency::Chf);
        let id = account.id;
        repo.upsert(account).unwrap();

        assert!(repo.name_exists(user, "test account", None).unwrap());
        assert!(!repo.name_exists(user, "test account", Some(id)).unwrap());
        assert!(!repo.name_exists(UserId::new(), "test account", None).unwrap());
    }
}
