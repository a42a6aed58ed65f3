//! flipperctl core — shared building blocks for the CLI and the dashboard.
//!
//! # Modules
//!
//! - [`error`]: Error type and Result alias
//! - [`config`]: YAML-backed configuration
//! - [`client`]: HTTP client wrapper for the FlipperHTTP REST API
//! - [`stats`]: Local system statistics and port validation
//! - [`format`]: Terminal output helpers

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod stats;

// Re-export key types at crate root for convenience
pub use client::FlipperClient;
pub use config::FlipperConfig;
pub use error::{Error, Result};
