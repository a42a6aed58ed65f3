//! Dashboard route handlers.
//!
//! API routes forward to the device client and return its JSON verbatim,
//! including the uniform error value on failure. Local routes (health,
//! stats, config) never touch the device.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use serde::Deserialize;
use serde_json::{Value, json};

use flipperctl_core::stats;

use crate::AppState;

/// Query parameters for the request listing.
#[derive(Debug, Deserialize)]
pub struct RequestsQuery {
    limit: Option<u32>,
}

// ============================================================================
// Pages
// ============================================================================

/// Dashboard page.
pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ============================================================================
// Local endpoints
// ============================================================================

/// Health check for the dashboard itself.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Local host statistics.
pub async fn system_stats() -> (StatusCode, Json<Value>) {
    let result = tokio::task::spawn_blocking(stats::system_stats_value).await;
    match result {
        Ok(Ok(value)) => (StatusCode::OK, Json(value)),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Current configuration.
pub async fn get_config(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let config = state.config().read().await;
    match config.to_value() {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Update configuration keys and persist the file.
pub async fn set_config(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let patch = match body {
        Some(Json(Value::Object(map))) => map,
        _ => return error_response(StatusCode::BAD_REQUEST, "JSON object body required"),
    };

    let mut config = state.config().write().await;
    let mut updated = config.clone();
    for (key, value) in &patch {
        let text = match scalar_text(value) {
            Some(text) => text,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("'{key}' must be a scalar value"),
                );
            }
        };
        if let Err(e) = updated.set(key, &text) {
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    }

    if let Some(path) = state.config_path() {
        let path = path.clone();
        let to_save = updated.clone();
        let saved = tokio::task::spawn_blocking(move || to_save.save(&path)).await;
        match saved {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        }
    }
    *config = updated;

    match config.to_value() {
        Ok(value) => (StatusCode::OK, Json(json!({ "status": "success", "config": value }))),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

// ============================================================================
// Pass-through endpoints
// ============================================================================

/// Proxy status from the device.
pub async fn proxy_status(State(state): State<AppState>) -> Json<Value> {
    Json(state.client().proxy_status().await)
}

/// Start the device-side proxy.
pub async fn proxy_start(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let requested = body
        .as_ref()
        .and_then(|Json(b)| b.get("port"))
        .and_then(Value::as_i64)
        .unwrap_or(8888);
    let port = match u16::try_from(requested) {
        Ok(port) if port > 0 => port,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("invalid proxy port: {requested}"),
            );
        }
    };
    (StatusCode::OK, Json(state.client().start_proxy(port).await))
}

/// Stop the device-side proxy.
pub async fn proxy_stop(State(state): State<AppState>) -> Json<Value> {
    Json(state.client().stop_proxy().await)
}

/// Set proxy filtering and forwarding rules on the device.
pub async fn proxy_rules(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    match body {
        Some(Json(rules)) if rules.is_object() => {
            (StatusCode::OK, Json(state.client().set_proxy_rules(&rules).await))
        }
        _ => error_response(StatusCode::BAD_REQUEST, "JSON object body required"),
    }
}

/// Intercepted requests from the device.
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestsQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(50);
    Json(state.client().intercepted_requests(limit).await)
}

/// Forward an intercepted request.
pub async fn forward_request(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    let body = body.map(|Json(b)| b).unwrap_or_else(|| json!({}));

    let request_id = match body.get("request_id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => return error_response(StatusCode::BAD_REQUEST, "request_id required"),
    };
    let modified_body = body.get("body").and_then(Value::as_str);

    (
        StatusCode::OK,
        Json(state.client().forward_request(&request_id, modified_body).await),
    )
}

/// Device system information.
pub async fn system_info(State(state): State<AppState>) -> Json<Value> {
    Json(state.client().system_info().await)
}

// ============================================================================
// Fallback and helpers
// ============================================================================

/// JSON 404 for unknown routes.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "status": "error", "message": message })))
}

/// Render a JSON scalar as the string form `FlipperConfig::set` expects.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>flipperctl dashboard</title>
<style>
  body { font-family: monospace; margin: 2rem; background: #111; color: #ddd; }
  h1 { color: #6cf; }
  section { margin-bottom: 1.5rem; }
  pre { background: #1c1c1c; padding: 1rem; overflow-x: auto; }
  button { margin-right: 0.5rem; }
</style>
</head>
<body>
<h1>flipperctl dashboard</h1>
<section>
  <button onclick="act('/api/proxy/start')">Start proxy</button>
  <button onclick="act('/api/proxy/stop')">Stop proxy</button>
  <button onclick="refresh()">Refresh</button>
</section>
<section><h2>Proxy status</h2><pre id="proxy">-</pre></section>
<section><h2>Intercepted requests</h2><pre id="requests">-</pre></section>
<section><h2>Local stats</h2><pre id="stats">-</pre></section>
<script>
async function show(path, id) {
  const response = await fetch(path);
  document.getElementById(id).textContent =
    JSON.stringify(await response.json(), null, 2);
}
async function act(path) {
  await fetch(path, { method: 'POST' });
  refresh();
}
function refresh() {
  show('/api/proxy/status', 'proxy');
  show('/api/requests?limit=10', 'requests');
  show('/api/system/stats', 'stats');
}
refresh();
</script>
</body>
</html>
"#;

// ============================================================================
// Tests
// ============================================================================
