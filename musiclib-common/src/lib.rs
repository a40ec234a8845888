//! # musiclib common library
//!
//! Shared code for the musiclib server and migrator:
//! - Catalog entity model and table schemas
//! - Generic record storage over PostgreSQL
//! - Database configuration
//! - Error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
