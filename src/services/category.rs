//! Category service
//!
//! Creates and lists the income and expense categories that transactions
//! and budgets refer to.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryKind, UserId};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a category; names are unique per user and kind
    pub fn create(&self, user_id: UserId, name: &str, kind: CategoryKind) -> LedgerResult<Category> {
        let name = name.trim();
        let category = Category::new(user_id, name, kind);
        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if self.storage.categories.name_exists(user_id, name, kind)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        );
        info!(category = %category.id, name = %category.name, %kind, "created category");

        Ok(category)
    }

    /// Find a category by name or ID string
    pub fn find(&self, user_id: UserId, identifier: &str) -> LedgerResult<Category> {
        self.storage
            .categories
            .find(user_id, identifier)?
            .ok_or_else(|| LedgerError::category_not_found(identifier))
    }

    pub fn list(&self, user_id: UserId, kind: Option<CategoryKind>) -> LedgerResult<Vec<Category>> {
        self.storage.categories.get_by_user(user_id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_and_find() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();

        let created = service.create(user, "  Groceries ", CategoryKind::Expense).unwrap();
        assert_eq!(created.name, "Groceries");

        let found = service.find(user, "groceries").unwrap();
        assert_eq!(found.id, created.id);

        // Other users do not see it
        assert!(service.find(UserId::new(), "Groceries").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_name_per_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();

        service.create(user, "Bonus", CategoryKind::Income).unwrap();
        let err = service.create(user, "bonus", CategoryKind::Income).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        // Same name is fine for the other kind
        service.create(user, "Bonus", CategoryKind::Expense).unwrap();
    }

    #[test]
    fn test_list_by_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();

        service.create(user, "Salary", CategoryKind::Income).unwrap();
        service.create(user, "Rent", CategoryKind::Expense).unwrap();
        service.create(user, "Food", CategoryKind::Expense).unwrap();

        let expenses = service.list(user, Some(CategoryKind::Expense)).unwrap();
        let names: Vec<_> = expenses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Food", "Rent"]);
        assert_eq!(service.list(user, None).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let err = service.create(UserId::new(), "   ", CategoryKind::Expense).unwrap_err();
        assert!(err.is_validation());
    }
}
