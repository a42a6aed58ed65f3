//! Local system statistics and port validation.
//!
//! Reads /proc and `df` directly; this tool targets Linux hosts. Parsing
//! is split from I/O so the parsers are unit-testable. Probe failures are
//! propagated via Result, never panicked on.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Sampling window used for the CPU utilisation estimate.
const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

// ============================================================================
// Stat types
// ============================================================================

/// Memory usage derived from /proc/meminfo.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub total_gb: f64,
    pub available_gb: f64,
    pub percent: f64,
}

/// Disk usage for a mount point, derived from `df`.
#[derive(Debug, Clone, Serialize)]
pub struct DiskStats {
    pub total_gb: f64,
    pub free_gb: f64,
    pub percent: f64,
}

/// Snapshot of local host statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory: MemoryStats,
    pub disk: DiskStats,
}

/// One reading of the aggregate CPU line from /proc/stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSample {
    busy: u64,
    idle: u64,
}

// ============================================================================
// Collection
// ============================================================================

/// Collect CPU, memory, and disk statistics for the local host.
///
/// Blocks for the CPU sampling interval; call from a blocking context.
pub fn system_stats() -> Result<SystemStats> {
    Ok(SystemStats {
        cpu_percent: cpu_percent()?,
        memory: memory_stats()?,
        disk: disk_stats("/")?,
    })
}

/// Collect stats as a JSON value, in the shape the dashboard serves.
pub fn system_stats_value() -> Result<Value> {
    let stats = system_stats()?;
    serde_json::to_value(&stats).map_err(|e| Error::invalid_data(e.to_string()))
}

/// CPU utilisation percentage over a short sampling window.
pub fn cpu_percent() -> Result<f64> {
    let first = read_cpu_sample()?;
    std::thread::sleep(CPU_SAMPLE_INTERVAL);
    let second = read_cpu_sample()?;
    Ok(cpu_percent_between(first, second))
}

/// Memory statistics from /proc/meminfo.
pub fn memory_stats() -> Result<MemoryStats> {
    let content = std::fs::read_to_string("/proc/meminfo")
        .map_err(|e| Error::io_with_path(e, "/proc/meminfo"))?;
    parse_meminfo(&content)
}

/// Disk statistics for a mount point via `df -B1`.
pub fn disk_stats(path: &str) -> Result<DiskStats> {
    let output = std::process::Command::new("df").args(["-B1", path]).output()?;
    if !output.status.success() {
        return Err(Error::invalid_data(format!("df failed for {path}")));
    }
    parse_df_output(&String::from_utf8_lossy(&output.stdout))
}

fn read_cpu_sample() -> Result<CpuSample> {
    let content =
        std::fs::read_to_string("/proc/stat").map_err(|e| Error::io_with_path(e, "/proc/stat"))?;
    parse_cpu_sample(&content)
}

// ============================================================================
// Parsers
// ============================================================================

/// Parse the aggregate "cpu" line from /proc/stat contents.
fn parse_cpu_sample(content: &str) -> Result<CpuSample> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| Error::invalid_data("no aggregate cpu line in /proc/stat"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().unwrap_or(0))
        .collect();
    if fields.len() < 5 {
        return Err(Error::invalid_data("short cpu line in /proc/stat"));
    }

    // Fields: user nice system idle iowait irq softirq steal ...
    // idle time is idle + iowait, everything else counts as busy.
    let idle = fields[3] + fields[4];
    let busy = fields.iter().sum::<u64>() - idle;
    Ok(CpuSample { busy, idle })
}

/// Utilisation between two /proc/stat samples, as a percentage.
fn cpu_percent_between(first: CpuSample, second: CpuSample) -> f64 {
    let busy = second.busy.saturating_sub(first.busy);
    let idle = second.idle.saturating_sub(first.idle);
    let total = busy + idle;
    if total == 0 {
        return 0.0;
    }
    busy as f64 / total as f64 * 100.0
}

/// Parse MemTotal and MemAvailable from /proc/meminfo contents.
fn parse_meminfo(content: &str) -> Result<MemoryStats> {
    let mut total = 0u64;
    let mut available = 0u64;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            // Values in /proc/meminfo are in kB
            let bytes = parts[1].parse::<u64>().unwrap_or(0) * 1024;
            match parts[0] {
                "MemTotal:" => total = bytes,
                "MemAvailable:" => available = bytes,
                _ => {}
            }
        }
    }

    if total == 0 {
        return Err(Error::invalid_data("MemTotal missing from /proc/meminfo"));
    }

    Ok(MemoryStats {
        total_gb: total as f64 / BYTES_PER_GB,
        available_gb: available as f64 / BYTES_PER_GB,
        percent: (total - available) as f64 / total as f64 * 100.0,
    })
}

/// Parse `df -B1` output for a single mount point.
fn parse_df_output(stdout: &str) -> Result<DiskStats> {
    // Second line: Filesystem 1B-blocks Used Available Use% Mounted
    let line = stdout
        .lines()
        .nth(1)
        .ok_or_else(|| Error::invalid_data("short df output"))?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(Error::invalid_data("unparseable df output"));
    }

    let total: u64 = parts[1].parse().unwrap_or(0);
    let available: u64 = parts[3].parse().unwrap_or(0);
    if total == 0 {
        return Err(Error::invalid_data("df reported zero-size filesystem"));
    }

    Ok(DiskStats {
        total_gb: total as f64 / BYTES_PER_GB,
        free_gb: available as f64 / BYTES_PER_GB,
        percent: (total - available) as f64 / total as f64 * 100.0,
    })
}

// ============================================================================
// Port validation
// ============================================================================

/// Whether a value is a valid TCP port number (1-65535).
pub fn port_in_range(port: i64) -> bool {
    (1..=65535).contains(&port)
}

/// Whether a port is valid and currently bindable on the local host.
pub fn validate_port(port: u16) -> bool {
    if port == 0 {
        return false;
    }
    std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
