//! Flutter-facing bindings for Ringback core.

pub mod api;
