//! API endpoint handlers.

pub mod auth;
pub mod doctors;
pub mod health;
pub mod mappings;
pub mod patients;
