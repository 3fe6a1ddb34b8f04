//! Reminder domain model.
//!
//! # Responsibility
//! - Define the records exchanged with the reminder store.
//! - Keep form-draft normalization next to the records it produces.
//!
//! # Invariants
//! - Every stored reminder is identified by a store-assigned `ReminderId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod reminder;
