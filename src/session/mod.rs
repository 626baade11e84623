//! Session layer: credential persistence and the session operations.

pub mod manager;
pub mod store;
