//! Network layer: the request gateway, its error taxonomy, and wire types.

pub mod error;
pub mod gateway;
pub mod types;
