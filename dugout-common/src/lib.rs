//! Shared library for the Dugout ranked-analysis services
//!
//! Provides the common error type, configuration / root folder resolution,
//! and database initialization used by the service members.

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
