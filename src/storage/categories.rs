//! Category repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerResult;
use crate::models::{Category, CategoryId, CategoryKind, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CategoryData {
    categories: Vec<Category>,
}

pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> LedgerResult<()> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = write_lock(&self.categories)?;
        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    pub fn save(&self) -> LedgerResult<()> {
        let categories = read_lock(&self.categories)?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| (a.kind as u8, &a.name).cmp(&(b.kind as u8, &b.name)));

        write_json_atomic(&self.path, &CategoryData { categories: list })
    }

    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        Ok(read_lock(&self.categories)?.get(&id).cloned())
    }

    /// Categories of a user, optionally restricted to one kind, sorted by name
    pub fn get_by_user(
        &self,
        user_id: UserId,
        kind: Option<CategoryKind>,
    ) -> LedgerResult<Vec<Category>> {
        let categories = read_lock(&self.categories)?;

        let mut list: Vec<_> = categories
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| kind.map_or(true, |k| c.kind == k))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    /// Find a category by id (full or short) or by name, case-insensitive
    pub fn find(&self, user_id: UserId, query: &str) -> LedgerResult<Option<Category>> {
        let categories = read_lock(&self.categories)?;
        let query_lower = query.trim().to_lowercase();

        let owned = || categories.values().filter(|c| c.user_id == user_id);

        Ok(owned()
            .find(|c| c.id.matches(query))
            .or_else(|| owned().find(|c| c.name.to_lowercase() == query_lower))
            .cloned())
    }

    pub fn upsert(&self, category: Category) -> LedgerResult<()> {
        write_lock(&self.categories)?.insert(category.id, category);
        Ok(())
    }

    /// Is a name already used by a category of the same kind?
    pub fn name_exists(&self, user_id: UserId, name: &str, kind: CategoryKind) -> LedgerResult<bool> {
        let categories = read_lock(&self.categories)?;
        let name_lower = name.to_lowercase();
        Ok(categories
            .values()
            .any(|c| c.user_id == user_id && c.kind == kind && c.name.to_lowercase() == name_lower))
    }
}
