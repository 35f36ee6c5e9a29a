//! # Roster Common Library
//!
//! Shared code for the roster portal services:
//! - Error and result types
//! - Root folder resolution and TOML bootstrap configuration
//! - Database initialization, schema and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
