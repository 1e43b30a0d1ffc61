//! Data models for dashboard entities.
//!
//! [`Transaction`] is the row shape supplied by the data store;
//! [`TransactionId`] is its typed identifier.

mod ids;
mod transaction;

pub use ids::TransactionId;
pub use transaction::Transaction;
