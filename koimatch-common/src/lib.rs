//! # Koimatch Common Library
//!
//! Shared code for the koimatch service including:
//! - Database models and schema initialization
//! - Notification dispatch contract (Notifier trait + template kinds)
//! - Configuration loading
//! - Input validation rules (name script, birthday format)
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod validate;

pub use error::{Error, Result};
