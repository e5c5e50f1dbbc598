use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DEFAULT_IDLE_TIMEOUT, DisplayMetrics, OverlayMask};

use super::layout_store::Orientation;

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 4.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Host-side overlay settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub display: DisplayMetrics,
    pub orientation: Orientation,
    pub scale: f32,
    /// Percent, 0 to 100.
    pub opacity: u8,
    /// Overlay mask bits applied on start; 0 keeps the overlay off.
    pub mask: u32,
    pub idle_timeout_secs: u64,
    pub tick_period_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            display: DisplayMetrics::default(),
            orientation: Orientation::Landscape,
            scale: 1.0,
            opacity: 100,
            mask: 0,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
            tick_period_ms: 1000,
        }
    }
}

impl OverlayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(&content)?;
        Ok(config.sanitized())
    }

    pub fn sanitized(mut self) -> Self {
        self.scale = clamp_scale(self.scale);
        self.opacity = self.opacity.min(100);
        self.tick_period_ms = self.tick_period_ms.max(1);
        self
    }

    pub fn initial_mask(&self) -> OverlayMask {
        OverlayMask(self.mask & OverlayMask::ALL.bits())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn unique_path() -> std::path::PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let filename = format!("overpad_config_{}_{}", std::process::id(), id);
        std::env::temp_dir().join(filename).with_extension("json")
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{ "scale": 1.5, "orientation": "portrait" }"#)
                .expect("parse");

        assert_eq!(config.scale, 1.5);
        assert_eq!(config.orientation, Orientation::Portrait);
        assert_eq!(config.opacity, 100);
        assert_eq!(config.idle_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let path = unique_path();
        std::fs::write(&path, r#"{ "scale": 9.0, "opacity": 250, "mask": 255 }"#)
            .expect("write config");

        let config = OverlayConfig::load(&path).expect("load");

        assert_eq!(config.scale, MAX_SCALE);
        assert_eq!(config.opacity, 100);
        assert_eq!(config.initial_mask(), OverlayMask::ALL);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reports_parse_errors() {
        let path = unique_path();
        std::fs::write(&path, "{ scale: }").expect("write config");

        let err = OverlayConfig::load(&path).expect_err("invalid json");

        assert!(matches!(err, ConfigError::Parse(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = OverlayConfig::load(unique_path()).expect_err("missing");

        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn clamp_scale_bounds() {
        assert_eq!(clamp_scale(0.01), MIN_SCALE);
        assert_eq!(clamp_scale(2.0), 2.0);
        assert_eq!(clamp_scale(f32::NAN), 1.0);
    }
}
