//! # modelport-converter
//!
//! Batch conversion of a folder of host-native model documents (`.skp` by
//! default) into another format. The geometry translation is done by an
//! external modeling host; this crate selects the documents, derives output
//! names, drives the host's open/export primitives one document at a time,
//! and restores the process working directory afterwards.
//!
//! ## Host drivers
//!
//! The converter talks to the host only through the [`host::ModelHost`]
//! trait. [`host::ProcessHost`] launches the real executable (directly, or
//! with a generated Ruby startup script), [`host::DryRunHost`] only records
//! the calls.

pub mod converter;
pub mod discovery;
pub mod error;
pub mod filesystem;
pub mod host;
pub mod models;
pub mod progress;
pub mod report;
pub mod scripting;
pub mod workdir;

pub use converter::BatchConverter;
pub use error::ConversionError;
