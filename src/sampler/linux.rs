// Linux thermal-zone and statvfs readings, and the pure helpers behind the percentage metrics.

use crate::models::SampleError;
use std::path::Path;

/// Read a thermal-zone pseudo-file (millidegrees Celsius) and return degrees Celsius.
pub(super) async fn read_cpu_temperature(path: &Path) -> Result<f64, SampleError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_millidegrees(&content)
}

/// `"45678\n"` -> `45.678`.
pub fn parse_millidegrees(content: &str) -> Result<f64, SampleError> {
    let raw = content.trim();
    let milli: i64 = raw
        .parse()
        .map_err(|e| SampleError::Parse(format!("thermal reading {:?}: {}", raw, e)))?;
    Ok(milli as f64 / 1000.0)
}

/// Root filesystem usage from `statvfs`, the way `df` reports it.
pub(super) fn read_disk_usage(root: &Path) -> Result<f64, SampleError> {
    #[cfg(unix)]
    {
        let stat = nix::sys::statvfs::statvfs(root).map_err(std::io::Error::from)?;
        Ok(disk_percent(
            stat.blocks() as u64,
            stat.blocks_free() as u64,
            stat.blocks_available() as u64,
        ))
    }
    #[cfg(not(unix))]
    {
        let _ = root;
        Err(SampleError::Io(std::io::ErrorKind::Unsupported.into()))
    }
}

/// `used / (used + avail)` in fragments, one decimal: blocks reserved for root count as
/// neither used nor available. An empty filesystem reads 0.0.
pub fn disk_percent(blocks: u64, blocks_free: u64, blocks_available: u64) -> f64 {
    let used = blocks.saturating_sub(blocks_free);
    let usable = used + blocks_available;
    if usable == 0 {
        return 0.0;
    }
    round1(used as f64 / usable as f64 * 100.0)
}

/// Used share of `total`, as a percentage rounded to one decimal. `None` when `total` is zero.
pub fn usage_percent(total: u64, available: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(round1((used as f64 / total as f64) * 100.0))
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_millidegrees_accepts_trailing_newline() {
        let c = parse_millidegrees("45678\n").unwrap();
        assert!((c - 45.678).abs() < 1e-9);
    }

    #[test]
    fn parse_millidegrees_handles_negative_readings() {
        let c = parse_millidegrees("-2500").unwrap();
        assert!((c + 2.5).abs() < 1e-9);
    }

    #[test]
    fn parse_millidegrees_rejects_garbage() {
        assert!(matches!(
            parse_millidegrees("hot"),
            Err(SampleError::Parse(_))
        ));
        assert!(matches!(parse_millidegrees(""), Err(SampleError::Parse(_))));
    }

    #[test]
    fn usage_percent_rounds_to_one_decimal() {
        assert_eq!(usage_percent(3, 2), Some(33.3));
        assert_eq!(usage_percent(100, 0), Some(100.0));
        assert_eq!(usage_percent(100, 100), Some(0.0));
    }

    #[test]
    fn usage_percent_none_for_zero_total() {
        assert_eq!(usage_percent(0, 0), None);
    }

    #[test]
    fn usage_percent_saturates_when_available_exceeds_total() {
        assert_eq!(usage_percent(10, 20), Some(0.0));
    }

    #[test]
    fn disk_percent_excludes_reserved_blocks() {
        // 66053021 blocks, 61812419 free, 20959967 available to unprivileged users
        assert_eq!(disk_percent(66_053_021, 61_812_419, 20_959_967), 16.8);
        // 5% reserved: 800 used of 950 usable, not 850 of 1000
        assert_eq!(disk_percent(1000, 200, 150), 84.2);
    }

    #[test]
    fn disk_percent_full_when_only_reserve_left() {
        assert_eq!(disk_percent(1000, 50, 0), 100.0);
    }

    #[test]
    fn disk_percent_of_empty_filesystem_is_zero() {
        assert_eq!(disk_percent(0, 0, 0), 0.0);
        assert_eq!(disk_percent(1000, 1000, 1000), 0.0);
    }
}
