//! The flipperctl CLI application.
//!
//! Loads configuration, initialises logging, constructs the device client,
//! and dispatches subcommands to handlers.

use tracing_subscriber::EnvFilter;

use flipperctl_core::{FlipperClient, FlipperConfig, Result};

use crate::cli::{CliArgs, Command, LogLevel};
use crate::handlers;

/// The flipperctl CLI application.
pub struct FlipperCli {
    name: String,
    version: String,
    config: FlipperConfig,
    config_path: Option<String>,
}

impl FlipperCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = FlipperConfig::load(args.config.as_deref())?;
        Ok(Self {
            name: "flipperctl".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            config_path: args.config.clone(),
        })
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &FlipperConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// `RUST_LOG` wins when set; otherwise the `--log-level` flag, then
    /// the configured `log_level` key. The flag is never persisted.
    pub fn init_logging(&self, flag: Option<LogLevel>) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = flag {
            EnvFilter::new(level.as_filter())
        } else {
            EnvFilter::new(configured_filter(&self.config.log_level))
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.log_level);

        match args.command {
            Some(Command::Connect) => {
                handlers::cmd_connect(&self.client()?).await
            }
            Some(Command::StartProxy { port }) => {
                handlers::cmd_start_proxy(
                    &self.client()?,
                    &self.config,
                    self.config_path.as_deref(),
                    port,
                )
                .await
            }
            Some(Command::StopProxy) => handlers::cmd_stop_proxy(&self.client()?).await,
            Some(Command::Status) => handlers::cmd_status(&self.client()?).await,
            Some(Command::Requests { limit }) => {
                handlers::cmd_requests(&self.client()?, limit).await
            }
            Some(Command::Forward { request_id, body }) => {
                handlers::cmd_forward(&self.client()?, &request_id, body.as_deref()).await
            }
            Some(Command::ConfigShow) => handlers::cmd_config_show(&self.config),
            Some(Command::ConfigSet { key, value }) => {
                handlers::cmd_config_set(self.config_path.as_deref(), &key, &value)
            }
            Some(Command::Init { force }) => {
                handlers::cmd_init(self.config_path.as_deref(), force)
            }
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            None => {
                println!("{} {} (use --help for usage)", self.name, self.version);
                Ok(())
            }
        }
    }

    fn client(&self) -> Result<FlipperClient> {
        FlipperClient::new(&self.config)
    }
}

/// Map a configured log level string to a tracing filter directive.
fn configured_filter(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "warning" | "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

// ============================================================================
// Tests
// ============================================================================
