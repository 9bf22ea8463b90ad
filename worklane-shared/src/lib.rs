//! # Worklane Shared Library
//!
//! This crate contains the database layer and models shared by the Worklane
//! engine and the reconciler worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models for the org and project hierarchies
//! - `db`: Connection pool and migration runner
//! - `directory`: Read-only lookups into the employee directory

pub mod db;
pub mod directory;
pub mod models;

/// Current version of the Worklane shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
