//! Handler functions for flipperctl commands.
//!
//! Each handler issues at most one device call, prints formatted output,
//! and persists configuration where the command requires it. Device-side
//! failures are reported as error messages; the handlers themselves only
//! fail on local problems (unreadable config, unwritable file).

use flipperctl_core::client::{is_success, message_of};
use flipperctl_core::{Error, FlipperClient, FlipperConfig, Result, format, stats};

// ============================================================================
// Device commands
// ============================================================================

/// Test connection to the device health endpoint.
pub async fn cmd_connect(client: &FlipperClient) -> Result<()> {
    println!("Testing connection to FlipperHTTP...");
    if client.connect().await {
        println!(
            "{}",
            format::success_message("Connected to FlipperHTTP successfully")
        );
    } else {
        println!(
            "{}",
            format::error_message("Failed to connect to FlipperHTTP")
        );
    }
    Ok(())
}

/// Start the proxy and persist the chosen port on success.
pub async fn cmd_start_proxy(
    client: &FlipperClient,
    config: &FlipperConfig,
    config_path: Option<&str>,
    port: u16,
) -> Result<()> {
    if !stats::validate_port(port) {
        println!(
            "{}",
            format::error_message(&format!("Port {port} is not available or invalid"))
        );
        return Ok(());
    }

    println!("Starting proxy on port {port}...");
    let result = client.start_proxy(port).await;

    if is_success(&result) {
        persist_proxy_port(config, config_path, port)?;
        println!(
            "{}",
            format::success_message(&format!("Proxy started on port {port}"))
        );
        println!(
            "{}",
            format::info_message(&format!("Configure your tools to use: localhost:{port}"))
        );
    } else {
        println!(
            "{}",
            format::error_message(&format!("Failed to start proxy: {}", message_of(&result)))
        );
        tracing::error!("proxy start failed: {result}");
    }
    Ok(())
}

/// Stop the device-side proxy.
pub async fn cmd_stop_proxy(client: &FlipperClient) -> Result<()> {
    println!("Stopping proxy...");
    let result = client.stop_proxy().await;

    if is_success(&result) {
        println!("{}", format::success_message("Proxy stopped"));
    } else {
        println!(
            "{}",
            format::error_message(&format!("Failed to stop proxy: {}", message_of(&result)))
        );
    }
    Ok(())
}

/// Show proxy status, device system info, and local system stats.
pub async fn cmd_status(client: &FlipperClient) -> Result<()> {
    println!("Getting status...");

    let proxy_status = client.proxy_status().await;
    println!("\n{}", format::heading("Proxy Status:"));
    println!("{}", format::format_json(&proxy_status));

    let sys_info = client.system_info().await;
    println!("\n{}", format::heading("System Information:"));
    println!("{}", format::format_json(&sys_info));

    println!("\n{}", format::heading("Local System Stats:"));
    match local_stats().await {
        Ok(value) => println!("{}", format::format_json(&value)),
        Err(e) => println!(
            "{}",
            format::warning_message(&format!("Local stats unavailable: {e}"))
        ),
    }
    Ok(())
}

/// Show the most recently intercepted requests.
pub async fn cmd_requests(client: &FlipperClient, limit: u32) -> Result<()> {
    println!("Fetching last {limit} intercepted requests...");
    let result = client.intercepted_requests(limit).await;

    if !is_success(&result) {
        println!(
            "{}",
            format::error_message(&format!("Failed to get requests: {}", message_of(&result)))
        );
        return Ok(());
    }

    let requests = result
        .get("requests")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();

    if requests.is_empty() {
        println!(
            "{}",
            format::warning_message("No intercepted requests found")
        );
        return Ok(());
    }

    println!("\n{}", format::heading("Intercepted Requests:"));
    println!("{}", requests_table(&requests));
    Ok(())
}

/// Build the aligned table shown by the `requests` command.
fn requests_table(requests: &[serde_json::Value]) -> String {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = requests
        .iter()
        .enumerate()
        .map(|(i, req)| {
            let mut row = serde_json::Map::new();
            row.insert("#".to_string(), serde_json::json!(i + 1));
            row.insert(
                "method".to_string(),
                req.get("method").cloned().unwrap_or_else(|| "UNKNOWN".into()),
            );
            row.insert(
                "url".to_string(),
                req.get("url").cloned().unwrap_or_else(|| "N/A".into()),
            );
            row.insert(
                "status".to_string(),
                req.get("status").cloned().unwrap_or_else(|| "pending".into()),
            );
            let size = req
                .get("size")
                .and_then(serde_json::Value::as_u64)
                .map(format::format_bytes)
                .unwrap_or_else(|| "N/A".to_string());
            row.insert("size".to_string(), serde_json::json!(size));
            row
        })
        .collect();
    format::render_table(&rows, Some(&["#", "method", "url", "status", "size"]))
}

/// Forward an intercepted request, optionally with a modified body.
pub async fn cmd_forward(
    client: &FlipperClient,
    request_id: &str,
    body: Option<&str>,
) -> Result<()> {
    println!("Forwarding request {request_id}...");
    let result = client.forward_request(request_id, body).await;

    if is_success(&result) {
        println!(
            "{}",
            format::success_message("Request forwarded successfully")
        );
    } else {
        println!(
            "{}",
            format::error_message(&format!(
                "Failed to forward request: {}",
                message_of(&result)
            ))
        );
    }
    Ok(())
}

// ============================================================================
// Configuration commands
// ============================================================================

/// Show the full current configuration.
pub fn cmd_config_show(config: &FlipperConfig) -> Result<()> {
    println!("{}", format::heading("Current Configuration:"));
    println!("{}", format::format_json(&config.to_value()?));
    Ok(())
}

/// Set a configuration value and rewrite the config file.
pub fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<()> {
    let path = FlipperConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("could not determine config directory"))?;

    let mut config = FlipperConfig::load(config_path)?;
    config.set(key, value)?;
    config.save(&path)?;

    println!(
        "{}",
        format::success_message(&format!("Configuration updated: {key} = {value}"))
    );
    Ok(())
}

/// Create the config directory and default config file.
pub fn cmd_init(config_path: Option<&str>, force: bool) -> Result<()> {
    let path = FlipperConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("could not determine config directory"))?;

    println!("Initializing configuration...");
    if let Some(dir) = path.parent() {
        println!("Config directory: {}", dir.display());
    }
    println!("Config file: {}", path.display());

    if path.exists() && !force {
        return Err(Error::config(format!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    FlipperConfig::default().save(&path)?;
    println!("{}", format::success_message("Initialization complete"));
    println!(
        "{}",
        format::info_message("Run 'flipperctl config-show' to view current settings")
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Rewrite the config file with an updated proxy port.
fn persist_proxy_port(
    config: &FlipperConfig,
    config_path: Option<&str>,
    port: u16,
) -> Result<()> {
    match FlipperConfig::resolve_config_path(config_path) {
        Some(path) => {
            let mut updated = config.clone();
            updated.proxy_port = port;
            updated.save(&path)
        }
        None => {
            tracing::warn!("no config directory available, proxy port not persisted");
            Ok(())
        }
    }
}

/// Collect local stats off the async runtime.
async fn local_stats() -> Result<serde_json::Value> {
    tokio::task::spawn_blocking(stats::system_stats_value)
        .await
        .map_err(|e| Error::invalid_data(format!("stats task failed: {e}")))?
}

// ============================================================================
// Tests
// ============================================================================
