//! Reminder store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence contract the service layer depends on.
//! - Isolate SQL from validation and classification.
//!
//! # Invariants
//! - Repository APIs return `NotFound` for missing rows on every write path.

pub mod reminder_repo;
