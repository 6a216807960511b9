// Per-iteration metric readings and the display-ready snapshot built from them

use chrono::{DateTime, Local};
use std::net::IpAddr;
use std::time::Duration;

/// Shown when the outbound address cannot be discovered.
pub const NO_IP: &str = "No IP";
/// Shown for any other metric that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a single sub-query produced no value.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse: {0}")]
    Parse(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("total memory reported as zero")]
    NoMemoryInfo,
    #[error("sampling task: {0}")]
    Task(String),
}

/// Outcome of one sub-query. Collapsed to a fallback string only by [`MetricSnapshot::from`].
pub type Reading<T> = Result<T, SampleError>;

/// Raw sample of one loop iteration.
#[derive(Debug)]
pub struct Readings {
    pub timestamp: DateTime<Local>,
    pub ip_address: Reading<IpAddr>,
    /// Degrees Celsius.
    pub cpu_temperature: Reading<f64>,
    pub memory_usage_percent: Reading<f64>,
    pub disk_usage_percent: Reading<f64>,
}

/// Display-ready values; every field is either a formatted reading or its fallback literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub timestamp: String,
    pub ip_address: String,
    pub cpu_temperature: String,
    pub memory_usage_percent: String,
    pub disk_usage_percent: String,
}

impl MetricSnapshot {
    /// The five label-prefixed lines, top to bottom.
    pub fn lines(&self) -> [String; 5] {
        [
            format!("Time: {}", self.timestamp),
            format!("IP: {}", self.ip_address),
            format!("CPU Temp: {}", self.cpu_temperature),
            format!("Mem Usage: {}", self.memory_usage_percent),
            format!("Disk Usage: {}", self.disk_usage_percent),
        ]
    }
}

impl From<&Readings> for MetricSnapshot {
    fn from(r: &Readings) -> Self {
        Self {
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ip_address: r
                .ip_address
                .as_ref()
                .map(|ip| ip.to_string())
                .unwrap_or_else(|_| NO_IP.into()),
            cpu_temperature: r
                .cpu_temperature
                .as_ref()
                .map(|c| format_celsius(*c))
                .unwrap_or_else(|_| NOT_AVAILABLE.into()),
            memory_usage_percent: r
                .memory_usage_percent
                .as_ref()
                .map(|p| format_percent(*p))
                .unwrap_or_else(|_| NOT_AVAILABLE.into()),
            disk_usage_percent: r
                .disk_usage_percent
                .as_ref()
                .map(|p| format_percent(*p))
                .unwrap_or_else(|_| NOT_AVAILABLE.into()),
        }
    }
}

impl From<Readings> for MetricSnapshot {
    fn from(r: Readings) -> Self {
        Self::from(&r)
    }
}

/// One decimal place plus unit, e.g. `45.7°C`.
pub fn format_celsius(celsius: f64) -> String {
    format!("{:.1}°C", celsius)
}

/// One decimal place plus `%`, e.g. `32.5%`.
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}
