//! flipperctl-web binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flipperctl_core::client;
use flipperctl_core::{FlipperClient, FlipperConfig};
use flipperctl_web::{AppState, create_router};

/// Local web dashboard for FlipperHTTP devices.
#[derive(Debug, Parser)]
#[command(name = "flipperctl-web", version, about)]
struct WebArgs {
    /// Address to bind the dashboard to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the dashboard to (defaults to the configured web_ui_port).
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file.
    #[arg(short, long, env = "FLIPPERCTL_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = WebArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = serve(args).await {
        eprintln!("flipperctl-web: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(args: WebArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = FlipperConfig::load(args.config.as_deref())?;
    let port = args.port.unwrap_or(config.web_ui_port);
    let config_path = FlipperConfig::resolve_config_path(args.config.as_deref());

    if config.auto_start_proxy {
        autostart_proxy(&config).await?;
    }

    let state = AppState::new(config, config_path)?;
    let router = create_router(state);

    let addr = format!("{}:{}", args.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("dashboard listening on http://{addr}");

    axum::serve(listener, router).await?;
    Ok(())
}

/// Kick off the device-side proxy when `auto_start_proxy` is set.
///
/// A failure is logged but does not prevent the dashboard from starting;
/// the device may simply be offline.
async fn autostart_proxy(config: &FlipperConfig) -> flipperctl_core::Result<()> {
    let client = FlipperClient::new(config)?;
    let result = client.start_proxy(config.proxy_port).await;
    if client::is_success(&result) {
        tracing::info!("proxy auto-started on port {}", config.proxy_port);
    } else {
        tracing::warn!("proxy auto-start failed: {}", client::message_of(&result));
    }
    Ok(())
}
