//! Audit logging
//!
//! Every create and update made through a service is appended to
//! `audit.log` as one JSON line, with the entity's state before and after.
//!
//! ```rust,ignore
//! use ledgerwise::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(
//!     EntityType::Budget,
//!     budget.id.to_string(),
//!     Some(budget.name.clone()),
//!     &budget,
//! ))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
