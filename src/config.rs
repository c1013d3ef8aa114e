use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Knobs for the tree search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Exploration constant of the PUCT formula.
    pub c_puct: f64,
    /// Wall-clock budget per move in seconds.
    pub time_budget_secs: f64,
    /// Dirichlet concentration for root noise.
    pub dirichlet_alpha: f64,
    /// Root noise mixing weight; 0 disables noise.
    pub dirichlet_epsilon: f64,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            c_puct: 1.0,
            time_budget_secs: 2.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.0,
            seed: 0,
        }
    }
}

impl SearchConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let f = File::open(&path).map_err(|source| ConfigError::Io { path: display.clone(), source })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|source| ConfigError::Parse { path: display, source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.c_puct.is_finite() || self.c_puct < 0.0 {
            return Err(ConfigError::Invalid(format!("c_puct must be finite and >= 0, got {}", self.c_puct)));
        }
        if !self.time_budget_secs.is_finite() || self.time_budget_secs < 0.0 {
            return Err(ConfigError::Invalid(format!("time_budget_secs must be >= 0, got {}", self.time_budget_secs)));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(ConfigError::Invalid(format!("dirichlet_epsilon must be in [0, 1], got {}", self.dirichlet_epsilon)));
        }
        if self.dirichlet_epsilon > 0.0 && !(self.dirichlet_alpha > 0.0) {
            return Err(ConfigError::Invalid(format!("dirichlet_alpha must be > 0 when noise is on, got {}", self.dirichlet_alpha)));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs_f64(self.time_budget_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let cfg = SearchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.time_budget(), Duration::from_secs(2));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{ "c_puct": 1.5, "seed": 7 }"#).unwrap();
        assert_eq!(cfg, SearchConfig { c_puct: 1.5, seed: 7, ..SearchConfig::default() });
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = SearchConfig { dirichlet_epsilon: 1.5, ..SearchConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        let cfg = SearchConfig { c_puct: f64::NAN, ..SearchConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SearchConfig { dirichlet_epsilon: 0.25, dirichlet_alpha: 0.0, ..SearchConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = std::path::Path::new("target/config_test");
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("search.json");
        std::fs::write(&path, r#"{ "time_budget_secs": 0.5 }"#).unwrap();
        let cfg = SearchConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.time_budget(), Duration::from_millis(500));
        assert!(SearchConfig::from_json_file(dir.join("missing.json")).is_err());
    }
}
