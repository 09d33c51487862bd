//! Transaction model
//!
//! A transaction always carries a strictly positive amount; its direction
//! comes from its kind. Transfers name their destination account and
//! adjustments carry an explicit direction, so neither can exist without
//! the information needed to apply them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, TransactionId, UserId};
use super::money::Money;

/// Marker written into notes by older data for balance adjustments
const LEGACY_ADJUSTMENT_MARKER: &str = "ADJUSTMENT:";

/// Which way a balance adjustment moves the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

impl AdjustmentDirection {
    /// Direction needed to move a balance by `delta`; `None` for a zero delta
    pub fn for_delta(delta: Money) -> Option<Self> {
        if delta.is_positive() {
            Some(Self::Increase)
        } else if delta.is_negative() {
            Some(Self::Decrease)
        } else {
            None
        }
    }

    /// Recover the direction from a legacy `ADJUSTMENT:+` / `ADJUSTMENT:-` note
    ///
    /// A note without exactly one recognizable marker is an error; the
    /// direction is never guessed.
    pub fn from_legacy_note(note: &str) -> Result<Self, TransactionValidationError> {
        let mut found = None;
        for (idx, _) in note.match_indices(LEGACY_ADJUSTMENT_MARKER) {
            let sign = note[idx + LEGACY_ADJUSTMENT_MARKER.len()..].chars().next();
            let direction = match sign {
                Some('+') => Self::Increase,
                Some('-') => Self::Decrease,
                _ => return Err(TransactionValidationError::AmbiguousAdjustment(note.into())),
            };
            if found.is_some_and(|prev| prev != direction) {
                return Err(TransactionValidationError::AmbiguousAdjustment(note.into()));
            }
            found = Some(direction);
        }
        found.ok_or_else(|| TransactionValidationError::AmbiguousAdjustment(note.into()))
    }

    /// Apply the direction to a positive amount
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            Self::Increase => amount,
            Self::Decrease => -amount,
        }
    }
}

impl fmt::Display for AdjustmentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => write!(f, "+"),
            Self::Decrease => write!(f, "-"),
        }
    }
}

/// Plain discriminant of a transaction kind, used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Adjustment,
}

impl TransactionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Transfer => write!(f, "Transfer"),
            Self::Adjustment => write!(f, "Adjustment"),
        }
    }
}

/// What a transaction does to its account(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Debits the owning account and credits `destination_account_id`
    Transfer { destination_account_id: AccountId },
    /// Reconciles the owning account towards a manually entered balance
    Adjustment { direction: AdjustmentDirection },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Income => TransactionType::Income,
            Self::Expense => TransactionType::Expense,
            Self::Transfer { .. } => TransactionType::Transfer,
            Self::Adjustment { .. } => TransactionType::Adjustment,
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub user_id: UserId,

    /// The account this transaction belongs to (the source, for transfers)
    pub account_id: AccountId,

    pub kind: TransactionKind,

    /// Always strictly positive
    pub amount: Money,

    pub date: NaiveDate,

    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: UserId,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            user_id,
            account_id,
            kind,
            amount,
            date,
            category_id: None,
            description: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn income(user_id: UserId, account_id: AccountId, amount: Money, date: NaiveDate) -> Self {
        Self::new(user_id, account_id, TransactionKind::Income, amount, date)
    }

    pub fn expense(user_id: UserId, account_id: AccountId, amount: Money, date: NaiveDate) -> Self {
        Self::new(user_id, account_id, TransactionKind::Expense, amount, date)
    }

    pub fn transfer(
        user_id: UserId,
        from: AccountId,
        to: AccountId,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self::new(
            user_id,
            from,
            TransactionKind::Transfer {
                destination_account_id: to,
            },
            amount,
            date,
        )
    }

    pub fn adjustment(
        user_id: UserId,
        account_id: AccountId,
        direction: AdjustmentDirection,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self::new(
            user_id,
            account_id,
            TransactionKind::Adjustment { direction },
            amount,
            date,
        )
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    pub fn destination_account_id(&self) -> Option<AccountId> {
        match self.kind {
            TransactionKind::Transfer {
                destination_account_id,
            } => Some(destination_account_id),
            _ => None,
        }
    }

    pub fn is_adjustment(&self) -> bool {
        matches!(self.kind, TransactionKind::Adjustment { .. })
    }

    /// Does this transaction move money in or out of `account_id`?
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.account_id == account_id || self.destination_account_id() == Some(account_id)
    }

    /// Signed change this transaction makes to `account_id`'s balance
    pub fn effect_on(&self, account_id: AccountId) -> Money {
        let mut delta = Money::zero();

        if self.account_id == account_id {
            delta += match self.kind {
                TransactionKind::Income => self.amount,
                TransactionKind::Expense => -self.amount,
                TransactionKind::Transfer { .. } => -self.amount,
                TransactionKind::Adjustment { direction } => direction.signed(self.amount),
            };
        }

        if self.destination_account_id() == Some(account_id) {
            delta += self.amount;
        }

        delta
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        match self.kind {
            TransactionKind::Transfer {
                destination_account_id,
            } => {
                if destination_account_id == self.account_id {
                    return Err(TransactionValidationError::TransferToSelf);
                }
                if self.category_id.is_some() {
                    return Err(TransactionValidationError::CategoryNotAllowed(
                        TransactionType::Transfer,
                    ));
                }
            }
            TransactionKind::Adjustment { .. } => {
                if self.category_id.is_some() {
                    return Err(TransactionValidationError::CategoryNotAllowed(
                        TransactionType::Adjustment,
                    ));
                }
            }
            TransactionKind::Income | TransactionKind::Expense => {}
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.transaction_type(),
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    TransferToSelf,
    CategoryNotAllowed(TransactionType),
    AmbiguousAdjustment(String),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Transaction amount must be positive, got {}", amount)
            }
            Self::TransferToSelf => {
                write!(f, "Transfer source and destination must be different accounts")
            }
            Self::CategoryNotAllowed(kind) => {
                write!(f, "{} transactions cannot have a category", kind)
            }
            Self::AmbiguousAdjustment(note) => {
                write!(f, "Cannot determine adjustment direction from '{}'", note)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_effect_by_kind() {
        let user = UserId::new();
        let account = AccountId::new();
        let amount = Money::from_major(100);

        assert_eq!(Transaction::income(user, account, amount, date()).effect_on(account), amount);
        assert_eq!(Transaction::expense(user, account, amount, date()).effect_on(account), -amount);

        let up = Transaction::adjustment(user, account, AdjustmentDirection::Increase, amount, date());
        let down = Transaction::adjustment(user, account, AdjustmentDirection::Decrease, amount, date());
        assert_eq!(up.effect_on(account), amount);
        assert_eq!(down.effect_on(account), -amount);

        // Unrelated account is untouched
        assert!(Transaction::income(user, account, amount, date())
            .effect_on(AccountId::new())
            .is_zero());
    }

    #[test]
    fn test_transfer_conserves_value() {
        let user = UserId::new();
        let from = AccountId::new();
        let to = AccountId::new();
        let txn = Transaction::transfer(user, from, to, Money::from_minor(12345), date());

        assert_eq!(txn.effect_on(from), -txn.effect_on(to));
        assert!((txn.effect_on(from) + txn.effect_on(to)).is_zero());
        assert!(txn.touches(from) && txn.touches(to));
        assert_eq!(txn.destination_account_id(), Some(to));
    }

    #[test]
    fn test_validation() {
        let user = UserId::new();
        let account = AccountId::new();

        let zero = Transaction::income(user, account, Money::zero(), date());
        assert!(matches!(
            zero.validate(),
            Err(TransactionValidationError::NonPositiveAmount(_))
        ));

        let negative = Transaction::expense(user, account, Money::from_major(-5), date());
        assert!(negative.validate().is_err());

        let to_self = Transaction::transfer(user, account, account, Money::from_major(5), date());
        assert_eq!(to_self.validate(), Err(TransactionValidationError::TransferToSelf));

        let categorized_adjustment = Transaction::adjustment(
            user,
            account,
            AdjustmentDirection::Increase,
            Money::from_major(5),
            date(),
        )
        .with_category(CategoryId::new());
        assert_eq!(
            categorized_adjustment.validate(),
            Err(TransactionValidationError::CategoryNotAllowed(TransactionType::Adjustment))
        );

        let ok = Transaction::expense(user, account, Money::from_major(5), date())
            .with_category(CategoryId::new());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_legacy_adjustment_note() {
        assert_eq!(
            AdjustmentDirection::from_legacy_note("ADJUSTMENT:+"),
            Ok(AdjustmentDirection::Increase)
        );
        assert_eq!(
            AdjustmentDirection::from_legacy_note("imported ADJUSTMENT:- from bank"),
            Ok(AdjustmentDirection::Decrease)
        );
        assert!(AdjustmentDirection::from_legacy_note("").is_err());
        assert!(AdjustmentDirection::from_legacy_note("ADJUSTMENT:").is_err());
        assert!(AdjustmentDirection::from_legacy_note("ADJUSTMENT:?").is_err());
        assert!(AdjustmentDirection::from_legacy_note("ADJUSTMENT:+ ADJUSTMENT:-").is_err());
    }

    #[test]
    fn test_direction_for_delta() {
        assert_eq!(
            AdjustmentDirection::for_delta(Money::from_major(3)),
            Some(AdjustmentDirection::Increase)
        );
        assert_eq!(
            AdjustmentDirection::for_delta(Money::from_major(-3)),
            Some(AdjustmentDirection::Decrease)
        );
        assert_eq!(AdjustmentDirection::for_delta(Money::zero()), None);
    }

    #[test]
    fn test_serialization() {
        let txn = Transaction::transfer(
            UserId::new(),
            AccountId::new(),
            AccountId::new(),
            Money::from_minor(5000),
            date(),
        );

        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("\"type\":\"transfer\""));
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, txn.kind);
        assert_eq!(back.amount, txn.amount);
    }

    #[test]
    fn test_adjustment_without_direction_is_rejected_on_load() {
        let txn = Transaction::adjustment(
            UserId::new(),
            AccountId::new(),
            AdjustmentDirection::Decrease,
            Money::from_major(1),
            date(),
        );
        let mut value = serde_json::to_value(&txn).unwrap();
        value["kind"]
            .as_object_mut()
            .unwrap()
            .remove("direction");

        assert!(serde_json::from_value::<Transaction>(value).is_err());
    }

    #[test]
    fn test_display() {
        let txn = Transaction::expense(UserId::new(), AccountId::new(), Money::from_minor(5000), date());
        assert_eq!(txn.to_string(), "2025-01-15 Expense 50.00");
    }
}
