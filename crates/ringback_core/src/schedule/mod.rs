//! Schedule validation for reminder forms.
//!
//! # Responsibility
//! - Gate persisted schedules on the future-only rule.
//! - Report field-scoped rejections instead of form-wide errors.

pub mod validator;
