//! LRC Configuration
//!
//! Stripe geometry as loaded from flags, environment or a JSON/YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ec::layout::{ShardLayout, LOCAL_SHARDS};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Shard counts of an LRC stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrcConfig {
    /// Number of data shards (D, even)
    #[serde(default = "default_data_shards")]
    pub data_shards: usize,

    /// Number of local parity shards (must be 2)
    #[serde(default = "default_local_shards")]
    pub local_shards: usize,

    /// Number of global parity shards (G)
    #[serde(default = "default_global_shards")]
    pub global_shards: usize,
}

fn default_data_shards() -> usize {
    4
}

fn default_local_shards() -> usize {
    LOCAL_SHARDS
}

fn default_global_shards() -> usize {
    3
}

impl Default for LrcConfig {
    fn default() -> Self {
        Self {
            data_shards: default_data_shards(),
            local_shards: default_local_shards(),
            global_shards: default_global_shards(),
        }
    }
}

impl LrcConfig {
    /// Create a configuration
    pub fn new(data_shards: usize, local_shards: usize, global_shards: usize) -> Self {
        Self {
            data_shards,
            local_shards,
            global_shards,
        }
    }

    /// Load a configuration file; `.yaml`/`.yml` is read as YAML, anything
    /// else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            serde_json::from_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the shard counts
    pub fn validate(&self) -> Result<()> {
        self.layout().map(|_| ())
    }

    /// Validated stripe geometry
    pub fn layout(&self) -> Result<ShardLayout> {
        ShardLayout::new(self.data_shards, self.local_shards, self.global_shards)
    }

    /// Total stripe width
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.local_shards + self.global_shards
    }

    /// Storage overhead ratio (total/data)
    pub fn storage_overhead(&self) -> f64 {
        if self.data_shards > 0 {
            self.total_shards() as f64 / self.data_shards as f64
        } else {
            1.0
        }
    }

    /// Storage efficiency (data/total)
    pub fn storage_efficiency(&self) -> f64 {
        let total = self.total_shards();
        if total > 0 {
            self.data_shards as f64 / total as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = LrcConfig::default();
        assert_eq!(config, LrcConfig::new(4, 2, 3));
        assert_eq!(config.total_shards(), 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_ratios() {
        let config = LrcConfig::new(8, 2, 2);
        assert!((config.storage_overhead() - 1.5).abs() < f64::EPSILON);
        assert!((config.storage_efficiency() - 8.0 / 12.0).abs() < f64::EPSILON);

        let empty = LrcConfig::new(0, 0, 0);
        assert_eq!(empty.storage_overhead(), 1.0);
        assert_eq!(empty.storage_efficiency(), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_counts() {
        assert_matches!(
            LrcConfig::new(4, 1, 3).validate(),
            Err(Error::LocalShardsUnsupported(1))
        );
        assert_matches!(
            LrcConfig::new(7, 2, 3).validate(),
            Err(Error::DataShardsInvalid(7))
        );
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config: LrcConfig = serde_yaml::from_str("dataShards: 8\nglobalShards: 2\n").unwrap();
        assert_eq!(config, LrcConfig::new(8, 2, 2));
    }

    #[test]
    fn test_parse_json() {
        let config: LrcConfig =
            serde_json::from_str(r#"{"dataShards": 6, "localShards": 2, "globalShards": 3}"#)
                .unwrap();
        assert_eq!(config, LrcConfig::new(6, 2, 3));
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir();
        let yaml = dir.join(format!("lrc-config-{}.yaml", std::process::id()));
        let json = dir.join(format!("lrc-config-{}.json", std::process::id()));
        std::fs::write(&yaml, "dataShards: 6\nglobalShards: 2\n").unwrap();
        std::fs::write(&json, r#"{"dataShards": 5}"#).unwrap();

        assert_eq!(LrcConfig::from_file(&yaml).unwrap(), LrcConfig::new(6, 2, 2));
        assert_matches!(LrcConfig::from_file(&json), Err(Error::DataShardsInvalid(5)));
        assert_matches!(
            LrcConfig::from_file(dir.join("lrc-config-missing.yaml")),
            Err(Error::Io(_))
        );

        std::fs::remove_file(yaml).unwrap();
        std::fs::remove_file(json).unwrap();
    }
}
