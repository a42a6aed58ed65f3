//! Command-line interface for FlipperHTTP devices.
//!
//! # Key Abstractions
//!
//! - [`cli::CliArgs`]: clap argument surface
//! - [`app::FlipperCli`]: application wiring (config, logging, client)
//! - [`handlers`]: one function per subcommand

pub mod app;
pub mod cli;
pub mod handlers;
