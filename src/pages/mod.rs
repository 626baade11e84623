//! Route-level page components.

pub mod dashboard;
pub mod login;
pub mod profile;
pub mod register;
