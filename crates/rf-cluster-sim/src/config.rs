//! Simulation run configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Spins per batch unless configured otherwise
pub const DEFAULT_BATCH_SIZE: u64 = 100_000;

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of base rounds to play
    pub spins: u64,

    /// Root seed; every batch derives its own stream from it
    pub seed: u64,

    /// Rounds per batch (the unit of parallel work)
    pub batch_size: u64,

    /// Worker threads (None = one per logical CPU)
    pub threads: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spins: 1_000_000,
            seed: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            threads: None,
        }
    }
}

impl SimConfig {
    pub fn new(spins: u64, seed: u64) -> Self {
        Self {
            spins,
            seed,
            ..Default::default()
        }
    }

    /// Quick run for smoke tests
    pub fn quick() -> Self {
        Self {
            spins: 10_000,
            batch_size: 2_500,
            ..Default::default()
        }
    }

    /// Builder: set the round count
    pub fn with_spins(mut self, spins: u64) -> Self {
        self.spins = spins;
        self
    }

    /// Builder: set the root seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: set the batch size
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder: pin the worker thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Number of batches the run is split into
    pub fn batch_count(&self) -> u64 {
        if self.batch_size == 0 {
            return 0;
        }
        self.spins.div_ceil(self.batch_size)
    }

    /// Threads the run will actually use
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.spins == 0 {
            return Err(SimError::InvalidSpinCount(self.spins));
        }
        if self.batch_size == 0 {
            return Err(SimError::InvalidBatchSize(self.batch_size));
        }
        if let Some(0) = self.threads {
            return Err(SimError::InvalidThreadCount(0));
        }
        Ok(())
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                serde_yml::from_str(&text).map_err(|e| SimError::Parse(format!("YAML: {}", e)))?
            }
            _ => serde_json::from_str(&text).map_err(|e| SimError::Parse(format!("JSON: {}", e)))?,
        };
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.batch_size, 100_000);
        assert!(config.threads.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SimConfig::default()
            .with_spins(250_001)
            .with_seed(42)
            .with_batch_size(50_000)
            .with_threads(3);

        assert_eq!(config.spins, 250_001);
        assert_eq!(config.seed, 42);
        assert_eq!(config.batch_count(), 6);
        assert_eq!(config.resolved_threads(), 3);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            SimConfig::new(0, 1).validate(),
            Err(SimError::InvalidSpinCount(0))
        ));
        assert!(matches!(
            SimConfig::new(10, 1).with_batch_size(0).validate(),
            Err(SimError::InvalidBatchSize(0))
        ));
        assert!(matches!(
            SimConfig::new(10, 1).with_threads(0).validate(),
            Err(SimError::InvalidThreadCount(0))
        ));
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rf-cluster-sim-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_from_path_yaml_and_json() {
        let yaml = temp_file("run.yaml", "spins: 40000\nseed: 17\nthreads: 2\n");
        let loaded = SimConfig::from_path(&yaml);
        std::fs::remove_file(&yaml).ok();
        let loaded = loaded.unwrap();
        assert_eq!(loaded, SimConfig::new(40_000, 17).with_threads(2));

        let json = temp_file("run.json", r#"{ "spins": 9000, "batch_size": 1000 }"#);
        let loaded = SimConfig::from_path(&json);
        std::fs::remove_file(&json).ok();
        let loaded = loaded.unwrap();
        assert_eq!(loaded.spins, 9_000);
        assert_eq!(loaded.batch_count(), 9);
        assert_eq!(loaded.seed, 0);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_from_path_errors() {
        assert!(matches!(
            SimConfig::from_path("/definitely/not/here.yaml"),
            Err(SimError::Io(_))
        ));

        let bad = temp_file("bad.yml", "spins: [1, 2\n");
        let loaded = SimConfig::from_path(&bad);
        std::fs::remove_file(&bad).ok();
        assert!(matches!(loaded, Err(SimError::Parse(msg)) if msg.starts_with("YAML")));
    }

    #[test]
    fn test_partial_json() {
        let config: SimConfig = serde_json::from_str(r#"{ "spins": 500, "seed": 9 }"#).unwrap();
        assert_eq!(config.spins, 500);
        assert_eq!(config.seed, 9);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }
}
