// Runtime settings. Every field defaults to the stock HAT wiring and screen behaviour,
// so running without a config file is the normal case.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub fonts: FontConfig,
    pub sampler: SamplerConfig,
    pub refresh: RefreshConfig,
}

/// SPI + GPIO wiring of the e-paper HAT (BCM line numbers on the gpiochip).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub spi_device: String,
    pub spi_speed_hz: u32,
    pub gpio_chip: String,
    pub rst_pin: u32,
    pub dc_pin: u32,
    pub busy_pin: u32,
    /// Upper bound on a single BUSY wait; a panel that never releases BUSY is treated as an I/O failure.
    pub busy_timeout_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            spi_device: "/dev/spidev0.0".into(),
            spi_speed_hz: 4_000_000,
            gpio_chip: "/dev/gpiochip0".into(),
            rst_pin: 17,
            dc_pin: 25,
            busy_pin: 24,
            busy_timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub body_path: PathBuf,
    pub body_size: f32,
    pub title_path: PathBuf,
    pub title_size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            body_path: PathBuf::from("pic/Font.ttc"),
            body_size: 15.0,
            title_path: PathBuf::from("pic/Font.ttc"),
            title_size: 24.0,
        }
    }
}

impl FontConfig {
    /// Font paths with relative entries looked up next to the installed binary.
    pub fn resolved(&self) -> Self {
        self.resolved_against(&install_dirs())
    }

    /// Relative paths are tried under each root in order; the first existing file wins.
    /// With no match the path is kept as is, i.e. relative to the working directory.
    pub fn resolved_against(&self, roots: &[PathBuf]) -> Self {
        Self {
            body_path: resolve_asset(&self.body_path, roots),
            title_path: resolve_asset(&self.title_path, roots),
            ..self.clone()
        }
    }
}

fn resolve_asset(path: &Path, roots: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    roots
        .iter()
        .map(|root| root.join(path))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// The binary's own directory, then its parent (`<prefix>/bin/..`).
fn install_dirs() -> Vec<PathBuf> {
    let Ok(exe) = std::env::current_exe() else {
        return Vec::new();
    };
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(|dir| dir.ancestors().take(2).map(Path::to_path_buf).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Datagram "connect" target used to learn the outbound interface address. Nothing is sent.
    pub probe_target: String,
    pub probe_timeout_ms: u64,
    pub thermal_zone_path: PathBuf,
    /// Any path on the filesystem to report; `statvfs` is taken on it directly.
    pub root_mount: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            probe_target: "8.8.8.8:80".into(),
            probe_timeout_ms: 2_000,
            thermal_zone_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            root_mount: PathBuf::from("/"),
        }
    }
}

impl SamplerConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Fixed delay after each push; not corrected for iteration latency.
    pub interval_ms: u64,
    /// How often to log loop stats at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            stats_log_interval_secs: 60,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn stats_log_interval(&self) -> Duration {
        Duration::from_secs(self.stats_log_interval_secs)
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` if set (must exist), else `config.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
                Err(e) => Err(anyhow::anyhow!("reading {}: {}", DEFAULT_CONFIG_PATH, e)),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.display.spi_device.is_empty(),
            "display.spi_device must be non-empty"
        );
        anyhow::ensure!(
            self.display.spi_speed_hz > 0,
            "display.spi_speed_hz must be > 0, got {}",
            self.display.spi_speed_hz
        );
        anyhow::ensure!(
            !self.display.gpio_chip.is_empty(),
            "display.gpio_chip must be non-empty"
        );
        let pins = [
            self.display.rst_pin,
            self.display.dc_pin,
            self.display.busy_pin,
        ];
        anyhow::ensure!(
            pins[0] != pins[1] && pins[0] != pins[2] && pins[1] != pins[2],
            "display.rst_pin, display.dc_pin and display.busy_pin must be distinct, got {:?}",
            pins
        );
        anyhow::ensure!(
            self.display.busy_timeout_ms > 0,
            "display.busy_timeout_ms must be > 0, got {}",
            self.display.busy_timeout_ms
        );
        anyhow::ensure!(
            self.fonts.body_size > 0.0,
            "fonts.body_size must be > 0, got {}",
            self.fonts.body_size
        );
        anyhow::ensure!(
            self.fonts.title_size > 0.0,
            "fonts.title_size must be > 0, got {}",
            self.fonts.title_size
        );
        anyhow::ensure!(
            !self.sampler.probe_target.is_empty(),
            "sampler.probe_target must be non-empty"
        );
        anyhow::ensure!(
            self.sampler.probe_timeout_ms > 0,
            "sampler.probe_timeout_ms must be > 0, got {}",
            self.sampler.probe_timeout_ms
        );
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be > 0, got {}",
            self.refresh.interval_ms
        );
        anyhow::ensure!(
            self.refresh.stats_log_interval_secs > 0,
            "refresh.stats_log_interval_secs must be > 0, got {}",
            self.refresh.stats_log_interval_secs
        );
        Ok(())
    }
}
