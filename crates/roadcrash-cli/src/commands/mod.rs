//! Command implementations.

pub mod consolidate;
pub mod sniff;
pub mod summary;
