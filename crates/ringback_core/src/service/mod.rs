//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, persistence and classification for callers.
//! - Keep CLI/FFI layers free of storage and time-zone details.

pub mod reminder_service;
