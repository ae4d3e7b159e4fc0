//! In-memory caching of person groups and people.
//!
//! This module provides the `GroupCache` holding the last successful
//! server responses. It is populated lazily by list operations, kept in
//! sync by the facade after each successful mutation, and dropped
//! wholesale by `invalidate()` or a force-refresh.

pub mod store;

pub use store::GroupCache;
