use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub sensors: SensorsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Sampling period in milliseconds.
    #[serde(alias = "intervalMs")]
    pub interval_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl GeneralConfig {
    /// Zero would stall the timer, so it falls back to the default period.
    pub fn interval(&self) -> Duration {
        if self.interval_ms == 0 {
            tracing::warn!(
                default_ms = DEFAULT_INTERVAL_MS,
                "interval_ms = 0 is not a valid sampling period, using default"
            );
            return Duration::from_millis(DEFAULT_INTERVAL_MS);
        }
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    pub core_pattern: String,
    pub ambient_pattern: String,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        SensorsConfig {
            command: "sensors".to_string(),
            args: vec!["-A".to_string()],
            timeout_ms: 2000,
            core_pattern: r"Core 0:\s+([+-]?[0-9]+(?:\.[0-9]+)?)°C".to_string(),
            ambient_pattern: r"temp1:\s+([+-]?[0-9]+(?:\.[0-9]+)?)°C".to_string(),
        }
    }
}

impl SensorsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostsnap").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.interval_ms, 5000);
        assert_eq!(config.general.interval(), Duration::from_millis(5000));
        assert_eq!(config.sensors.command, "sensors");
        assert_eq!(config.sensors.args, vec!["-A".to_string()]);
        assert_eq!(config.sensors.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
interval_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.interval_ms, 500);
        // Other fields should be defaults
        assert_eq!(config.sensors.command, "sensors");
        assert_eq!(config.sensors.timeout_ms, 2000);
    }

    #[test]
    fn accepts_camel_case_interval() {
        let toml_str = r#"
[general]
intervalMs = 1500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.interval_ms, 1500);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
interval_ms = 1000

[sensors]
command = "/usr/bin/sensors"
args = ["-A", "coretemp-isa-0000"]
timeout_ms = 750
core_pattern = 'Package id 0:\s+\+([0-9.]+)°C'
ambient_pattern = 'temp2:\s+\+([0-9.]+)°C'
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.interval_ms, 1000);
        assert_eq!(config.sensors.command, "/usr/bin/sensors");
        assert_eq!(config.sensors.args.len(), 2);
        assert_eq!(config.sensors.timeout(), Duration::from_millis(750));
        assert_eq!(config.sensors.core_pattern, r"Package id 0:\s+\+([0-9.]+)°C");
        assert_eq!(config.sensors.ambient_pattern, r"temp2:\s+\+([0-9.]+)°C");
    }

    #[test]
    fn zero_interval_uses_default() {
        let general = GeneralConfig { interval_ms: 0 };
        assert_eq!(general.interval(), Duration::from_millis(DEFAULT_INTERVAL_MS));
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.interval_ms, 5000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("hostsnap_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.interval_ms, 5000);
        let _ = std::fs::remove_file(&temp);
    }
}
