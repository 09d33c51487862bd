//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of write being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Transaction,
    Category,
    Budget,
    SavingsGoal,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Account => write!(f, "Account"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::Category => write!(f, "Category"),
            EntityType::Budget => write!(f, "Budget"),
            EntityType::SavingsGoal => write!(f, "SavingsGoal"),
        }
    }
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Human-readable label of the entity (account name, budget name, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Top-level fields that changed, e.g. `active: true -> false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
        }
    }

    /// Record an update; the diff summary is computed from the two states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => summarize_changes(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before,
            after,
            diff_summary,
        }
    }

    /// Record a deletion, keeping the last state of the entity
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: serde_json::to_value(entity).ok(),
            after: None,
            diff_summary: None,
        }
    }

    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

/// Describe top-level field changes between two JSON objects
///
/// `updated_at` is ignored; it changes on every write.
fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", before, after));
    };

    let mut changes: Vec<String> = before
        .iter()
        .filter(|(key, _)| key.as_str() != "updated_at")
        .filter_map(|(key, old)| match after.get(key) {
            Some(new) if new != old => Some(format!("{}: {} -> {}", key, old, new)),
            Some(_) => None,
            None => Some(format!("{}: {} -> (removed)", key, old)),
        })
        .collect();

    changes.extend(
        after
            .iter()
            .filter(|(key, _)| !before.contains_key(key.as_str()))
            .map(|(key, new)| format!("{}: (added) -> {}", key, new)),
    );

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Budget,
            "bud-12345678",
            Some("Groceries".to_string()),
            &json!({"name": "Groceries", "amount": "500"}),
        );

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry_summarizes_changes() {
        let before = json!({"name": "Main", "active": true, "updated_at": "a"});
        let after = json!({"name": "Main", "active": false, "updated_at": "b"});

        let entry = AuditEntry::update(EntityType::Account, "acc-1", None, &before, &after);

        assert_eq!(entry.diff_summary.as_deref(), Some("active: true -> false"));
    }

    #[test]
    fn test_delete_entry_keeps_last_state() {
        let entry = AuditEntry::delete(
            EntityType::Transaction,
            "txn-1",
            None,
            &json!({"amount": "12.50"}),
        );

        assert_eq!(entry.operation, Operation::Delete);
        assert_eq!(entry.before, Some(json!({"amount": "12.50"})));
        assert!(entry.after.is_none());
        assert!(entry.format_human_readable().contains("DELETE Transaction txn-1"));
    }

    #[test]
    fn test_no_changes_gives_no_summary() {
        let state = json!({"name": "Main"});
        let entry = AuditEntry::update(EntityType::Account, "acc-1", None, &state, &state);
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_human_readable() {
        let mut entry = AuditEntry::create(
            EntityType::SavingsGoal,
            "sav-1",
            Some("Car".to_string()),
            &json!({}),
        );
        entry.diff_summary = Some("label: \"a\" -> \"b\"".into());

        let text = entry.format_human_readable();
        assert!(text.contains("CREATE SavingsGoal sav-1 (Car)"));
        assert!(text.contains("Changes:"));
    }

    #[test]
    fn test_entity_type_serde() {
        let json = serde_json::to_string(&EntityType::SavingsGoal).unwrap();
        assert_eq!(json, "\"savings_goal\"");
    }
}
