//! Recurring & installment transaction lifecycle engine.
//!
//! A user-entered transaction expands into a family of stored rows: an
//! installment plan, a bounded monthly series, or a single occurrence. The
//! family is a depth-one tree rooted at its anchor (the one member without a
//! parent link). This crate owns that structure end to end: generating it,
//! resolving membership, projecting it into read views, and deleting from it
//! without ever leaving a group anchorless.

pub mod deletion;
pub mod error;
pub mod generator;
pub mod projector;
pub mod reports;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use deletion::{delete_transaction, delete_transactions};
pub use error::{EngineError, Result};
pub use generator::{NewTransaction, create_transaction};
pub use projector::{GroupRow, ListQuery, list_transactions, upcoming_transactions};
pub use reports::dashboard_summary;
pub use resolver::{resolve_anchor, siblings};
