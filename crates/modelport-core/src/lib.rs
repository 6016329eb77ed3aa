//! # modelport-core
//!
//! Core crate for ModelPort. Contains the configuration schemas shared by
//! the converter and the CLI, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ModelPort crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
