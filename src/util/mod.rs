//! Browser utilities.

pub mod navigation;
pub mod theme;
