//! CLI argument parsing and command definitions.
//!
//! Defines the `flipperctl` command surface: connection testing, proxy
//! control, intercepted-request inspection, and configuration management.

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments for flipperctl.
#[derive(Parser, Debug)]
#[command(name = "flipperctl", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "FLIPPERCTL_CONFIG")]
    pub config: Option<String>,

    /// Logging level (overrides the configured level for this run).
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Logging levels selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// The tracing filter directive for this level.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// flipperctl commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test connection to the FlipperHTTP device.
    Connect,

    /// Start the device-side HTTP proxy.
    StartProxy {
        /// Proxy port.
        #[arg(short, long, default_value_t = 8888)]
        port: u16,
    },

    /// Stop the device-side HTTP proxy.
    StopProxy,

    /// Show proxy status, device system info, and local system stats.
    Status,

    /// Show intercepted requests.
    Requests {
        /// Number of requests to show.
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Forward an intercepted request.
    Forward {
        /// ID of the request to forward.
        #[arg(long)]
        request_id: String,

        /// Modified request body (optional).
        #[arg(long)]
        body: Option<String>,
    },

    /// Show the current configuration.
    ConfigShow,

    /// Set a configuration value.
    ConfigSet {
        /// Configuration key.
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create the configuration directory and default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Print version information.
    Version,
}

// ============================================================================
// Tests
// ============================================================================
