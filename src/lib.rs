//! ledgerwise - personal finance ledger
//!
//! This library provides the core of the ledgerwise command line tool.
//! Account balances and budget figures are never stored; they are derived
//! from the transaction store on every read, for an explicit evaluation date.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, transactions, budgets, goals)
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer (balances, budgets, savings solver)
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerwise::config::{paths::LedgerPaths, settings::Settings};
//! use ledgerwise::services::AccountService;
//! use ledgerwise::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let today = chrono::Local::now().date_naive();
//! let balances = AccountService::new(&storage).list_with_balances(settings.user_id, false, today)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
