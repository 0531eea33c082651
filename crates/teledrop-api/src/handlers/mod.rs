//! HTTP handlers for the Drop Lifecycle Coordinator and ambient endpoints.

pub mod drops;
pub mod health;
