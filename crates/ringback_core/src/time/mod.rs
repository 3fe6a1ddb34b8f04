//! Time primitives for scheduling.
//!
//! # Responsibility
//! - Define the shared absolute `Instant` value.
//! - Resolve user-picked wall-clock readings into instants.
//!
//! # Invariants
//! - Nothing in this module samples the system clock.

pub mod instant;
pub mod resolver;
