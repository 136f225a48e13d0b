//! HTTP route handlers.

pub mod dashboard;
