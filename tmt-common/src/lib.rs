//! # TMT Common Library
//!
//! Shared code for the medal times tools including:
//! - Error and result types
//! - TOML configuration loading and setting resolution
//! - Race time formatting for log output

pub mod config;
pub mod error;
pub mod race_time;

pub use error::{Error, Result};
