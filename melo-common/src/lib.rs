//! # melo Common Library
//!
//! Shared code for melo services:
//! - Error and result types
//! - TOML configuration discovery and loading
//! - Logging configuration

pub mod config;
pub mod error;

pub use error::{Error, Result};
