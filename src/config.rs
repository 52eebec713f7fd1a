use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub quality: QualityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Thresholds for display-side quality bucketing of rankings.
/// Storage never enforces them; see [`crate::models::QualityTier`].
#[derive(Debug, Deserialize, Clone)]
pub struct QualityConfig {
    #[serde(default = "default_min_threshold")]
    pub min_threshold: f64,
    #[serde(default = "default_max_threshold")]
    pub max_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_threshold: default_min_threshold(),
            max_threshold: default_max_threshold(),
        }
    }
}

fn default_min_threshold() -> f64 {
    30.0
}
fn default_max_threshold() -> f64 {
    70.0
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if !config.quality.min_threshold.is_finite() || !config.quality.max_threshold.is_finite() {
        anyhow::bail!("quality thresholds must be finite");
    }

    if config.quality.min_threshold > config.quality.max_threshold {
        anyhow::bail!(
            "quality.min_threshold ({}) must be <= quality.max_threshold ({})",
            config.quality.min_threshold,
            config.quality.max_threshold
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("curator.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_minimal_config_uses_quality_defaults() {
        let (_tmp, path) = write_config("[db]\npath = \"curator.sqlite\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.db.path, PathBuf::from("curator.sqlite"));
        assert_eq!(config.quality.min_threshold, 30.0);
        assert_eq!(config.quality.max_threshold, 70.0);
    }

    #[test]
    fn test_explicit_thresholds() {
        let (_tmp, path) = write_config(
            "[db]\npath = \"x.sqlite\"\n\n[quality]\nmin_threshold = 10.0\nmax_threshold = 90.0\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.quality.min_threshold, 10.0);
        assert_eq!(config.quality.max_threshold, 90.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let (_tmp, path) = write_config(
            "[db]\npath = \"x.sqlite\"\n\n[quality]\nmin_threshold = 80.0\nmax_threshold = 20.0\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(load_config(&tmp.path().join("nope.toml")).is_err());
    }
}
