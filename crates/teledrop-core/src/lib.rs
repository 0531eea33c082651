//! # teledrop-core
//!
//! Core domain types, error handling and the Access Evaluator for teledrop.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the storage, database, and API crates depend on.

pub mod access;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod slug;
pub mod traits;
pub mod uuid_utils;

pub use access::evaluate;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::{extract_timestamp, is_v7, new_v7};
