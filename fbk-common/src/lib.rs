//! # FBK Common Library
//!
//! Shared code for the FBK feedback services:
//! - Feedback record model and closed label enumerations
//! - Database initialization and schema
//! - Configuration loading and root folder resolution
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
