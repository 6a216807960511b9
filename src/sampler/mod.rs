// Host metrics sampling. Each sub-query fails on its own; sample() never fails.

mod address;
mod linux;

use crate::config::SamplerConfig;
use crate::models::{MetricSnapshot, Reading, Readings, SampleError};
use crate::refresh::MetricSource;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::System;
use tracing::instrument;

/// Index into [`MetricsSampler::healthy`] per fallible metric.
#[derive(Debug, Clone, Copy)]
enum Metric {
    Address,
    CpuTemperature,
    Memory,
    Disk,
}

impl Metric {
    fn name(self) -> &'static str {
        match self {
            Metric::Address => "ip_address",
            Metric::CpuTemperature => "cpu_temperature",
            Metric::Memory => "memory_usage",
            Metric::Disk => "disk_usage",
        }
    }
}

pub struct MetricsSampler {
    sys: Arc<Mutex<System>>,
    probe_target: String,
    probe_timeout: Duration,
    thermal_zone_path: PathBuf,
    root_mount: PathBuf,
    /// Last known availability per metric; a failure is logged at WARN only on the first miss.
    healthy: [bool; 4],
}

impl MetricsSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            probe_target: config.probe_target.clone(),
            probe_timeout: config.probe_timeout(),
            thermal_zone_path: config.thermal_zone_path.clone(),
            root_mount: config.root_mount.clone(),
            healthy: [true; 4],
        }
    }

    /// One display-ready snapshot; failed sub-queries appear as their fallback literal.
    pub async fn sample(&mut self) -> MetricSnapshot {
        MetricSnapshot::from(&self.sample_readings().await)
    }

    /// Timestamp plus the four fallible sub-queries, run one after another.
    #[instrument(skip(self), fields(operation = "sample"))]
    pub async fn sample_readings(&mut self) -> Readings {
        let timestamp = chrono::Local::now();

        let ip_address = self.get_ip_address().await;
        self.track(Metric::Address, &ip_address);
        let cpu_temperature = self.get_cpu_temperature().await;
        self.track(Metric::CpuTemperature, &cpu_temperature);
        let memory_usage_percent = self.get_memory_usage().await;
        self.track(Metric::Memory, &memory_usage_percent);
        let disk_usage_percent = self.get_disk_usage().await;
        self.track(Metric::Disk, &disk_usage_percent);

        Readings {
            timestamp,
            ip_address,
            cpu_temperature,
            memory_usage_percent,
            disk_usage_percent,
        }
    }

    pub async fn get_ip_address(&self) -> Reading<IpAddr> {
        address::outbound_address(&self.probe_target, self.probe_timeout).await
    }

    /// Degrees Celsius from the thermal zone.
    pub async fn get_cpu_temperature(&self) -> Reading<f64> {
        linux::read_cpu_temperature(&self.thermal_zone_path).await
    }

    pub async fn get_memory_usage(&self) -> Reading<f64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| SampleError::Task(format!("sysinfo lock poisoned: {}", e)))?;
            sys.refresh_memory();
            linux::usage_percent(sys.total_memory(), sys.available_memory())
                .ok_or(SampleError::NoMemoryInfo)
        })
        .await
        .map_err(|e| SampleError::Task(format!("sysinfo task join: {}", e)))?
    }

    /// Usage of the filesystem holding `root_mount`, counted the way `df` does.
    pub async fn get_disk_usage(&self) -> Reading<f64> {
        let root = self.root_mount.clone();
        tokio::task::spawn_blocking(move || linux::read_disk_usage(&root))
            .await
            .map_err(|e| SampleError::Task(format!("statvfs task join: {}", e)))?
    }

    fn track<T>(&mut self, metric: Metric, reading: &Reading<T>) {
        let slot = &mut self.healthy[metric as usize];
        match reading {
            Ok(_) => {
                if !*slot {
                    tracing::info!(metric = metric.name(), "metric available again");
                }
                *slot = true;
            }
            Err(e) => {
                if *slot {
                    tracing::warn!(
                        metric = metric.name(),
                        error = %e,
                        "metric unavailable; showing fallback"
                    );
                } else {
                    tracing::debug!(metric = metric.name(), error = %e, "metric still unavailable");
                }
                *slot = false;
            }
        }
    }
}

impl MetricSource for MetricsSampler {
    async fn sample(&mut self) -> MetricSnapshot {
        MetricsSampler::sample(self).await
    }
}
