use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root configuration, loaded from `~/.config/marcsim/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub batch: BatchConfig,
    /// Inline strategy. Empty means "use the strategy file or the built-in default".
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strategy: Vec<StrategyItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the checkers of one comparison on the rayon pool.
    pub parallel_checkers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub records_extension: String,
    /// Worker threads for batch comparison; 0 lets rayon decide.
    pub threads: usize,
}

/// One `{checker, weight}` entry of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyItem {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl StrategyItem {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            records_extension: "json".to_string(),
            threads: 0,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/marcsim/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MARCSIM_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("marcsim")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Path of a record file in a batch records directory.
    pub fn record_path(&self, dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("{id}.{}", self.batch.records_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert!(!cfg.engine.parallel_checkers);
        assert_eq!(cfg.batch.records_extension, "json");
        assert!(cfg.strategy.is_empty());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.engine.parallel_checkers = true;
        cfg.batch.threads = 4;
        cfg.strategy.push(StrategyItem::new("ISBN", 2.0));
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.engine.parallel_checkers);
        assert_eq!(loaded.batch.threads, 4);
        assert_eq!(loaded.strategy, vec![StrategyItem::new("ISBN", 2.0)]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[engine]\nparallel_checkers = true\n\n[[strategy]]\nname = \"title\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert!(cfg.engine.parallel_checkers);
        assert_eq!(cfg.batch.records_extension, "json");
        assert_eq!(cfg.strategy[0].weight, 1.0);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_marcsim_config.toml")).unwrap();
        assert_eq!(cfg.batch.threads, 0);
    }

    #[test]
    fn test_record_path() {
        let cfg = AppConfig::default();
        let path = cfg.record_path(Path::new("/data"), "000123");
        assert_eq!(path, PathBuf::from("/data/000123.json"));
    }
}
