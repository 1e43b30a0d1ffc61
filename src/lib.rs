//! Core of a transaction dashboard.
//!
//! Rows fetched from a remote data store are narrowed by per-card filters
//! (month, calendar day, sender substring) and summarized into live sum and
//! average statistics. Transfer times arrive as ambiguous day-first text and
//! are normalized by [`date::normalize`] before any date filtering.

pub mod aggregate;
pub mod combine;
pub mod config;
pub mod dashboard;
pub mod date;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod models;
