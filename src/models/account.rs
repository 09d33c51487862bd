//! Account model
//!
//! Represents financial accounts (checking, savings, credit cards, etc.).
//! An account deliberately carries no balance: balances are derived from
//! the transaction log by the account service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, UserId};

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
    Loan,
    Other,
}

impl AccountType {
    /// Returns true if this account type normally carries debt
    pub fn is_liability(&self) -> bool {
        matches!(self, Self::Credit | Self::Loan)
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "savings" => Some(Self::Savings),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "cash" => Some(Self::Cash),
            "investment" => Some(Self::Investment),
            "loan" => Some(Self::Loan),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Credit => write!(f, "Credit Card"),
            Self::Cash => write!(f, "Cash"),
            Self::Investment => write!(f, "Investment"),
            Self::Loan => write!(f, "Loan"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Currency an account is held in. Amounts are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Chf,
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chf => "CHF",
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CHF" => Some(Self::Chf),
            "EUR" => Some(Self::Eur),
            "USD" => Some(Self::Usd),
            "GBP" => Some(Self::Gbp),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A financial account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Owner of the account
    pub user_id: UserId,

    /// Account name (e.g., "Main Checking")
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    #[serde(default)]
    pub currency: Currency,

    /// Inactive accounts are hidden from summaries and never receive
    /// savings-goal tracking
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Account {
    /// Create a new active account
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            user_id,
            name: name.into(),
            account_type,
            currency,
            active: true,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    /// Is this an active savings account of the given user?
    pub fn is_savings_of(&self, user_id: UserId) -> bool {
        self.active && self.user_id == user_id && self.account_type == AccountType::Savings
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.account_type, self.currency)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let user = UserId::new();
        let account = Account::new(user, "Main", AccountType::Checking, Currency::Chf);
        assert_eq!(account.user_id, user);
        assert!(account.active);
        assert!(account.validate().is_ok());
    }

    #[test]
    fn test_is_savings_of() {
        let user = UserId::new();
        let mut savings = Account::new(user, "Rainy day", AccountType::Savings, Currency::Chf);
        assert!(savings.is_savings_of(user));
        assert!(!savings.is_savings_of(UserId::new()));

        savings.set_active(false);
        assert!(!savings.is_savings_of(user));

        let checking = Account::new(user, "Main", AccountType::Checking, Currency::Chf);
        assert!(!checking.is_savings_of(user));
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new(UserId::new(), "  ", AccountType::Cash, Currency::Eur);
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "x".repeat(101);
        assert_eq!(account.validate(), Err(AccountValidationError::NameTooLong(101)));
    }

    #[test]
    fn test_parse_types() {
        assert_eq!(AccountType::parse("credit_card"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("LOAN"), Some(AccountType::Loan));
        assert_eq!(AccountType::parse("bogus"), None);
        assert_eq!(Currency::parse("usd"), Some(Currency::Usd));
        assert_eq!(Currency::parse("JPY"), None);
    }

    #[test]
    fn test_serialization() {
        let account = Account::new(UserId::new(), "Main", AccountType::Savings, Currency::Gbp);
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"type\":\"savings\""));
        assert!(json.contains("\"currency\":\"GBP\""));

        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, account.id);
        assert_eq!(back.currency, Currency::Gbp);
    }
}
