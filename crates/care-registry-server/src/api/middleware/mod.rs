//! Middleware stack for protected routes.
//!
//! Stack (outermost → innermost): Auth → Access log → Handler

pub mod audit;
pub mod auth;
