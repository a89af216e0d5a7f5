// Driver configuration for the `drift` binary.
//
// Loaded from JSON, never mutated after the command line has been merged
// in. Every field has a default, so a config file only needs the fields it
// changes. Without `rules_path` the embedded rule catalog is used.
//
// See also: `main.rs` for the command-line flags that override these
// fields, `lineage.rs` for what `lineage_depth` and `generations` drive.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

use crate::catalog::{Catalog, default_catalog};
use crate::compiler::compile;
use crate::error::ConfigError;
use crate::process::StressRule;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Seed for the one `StdRng` that drives every random choice.
    pub seed: u64,

    /// Number of dialect splits between the proto-language and the
    /// printed descendant.
    pub lineage_depth: usize,

    /// When non-zero, draw this many single changes per word instead of
    /// building a lineage, and print every intermediate form.
    pub generations: usize,

    /// Rule file to compile instead of the embedded catalog.
    pub rules_path: Option<String>,

    /// Stress proto-language words with `StressRule::default_placement()`
    /// before any change applies.
    pub apply_default_stress: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            lineage_depth: 3,
            generations: 0,
            rules_path: None,
            apply_default_stress: true,
        }
    }
}

impl DriftConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog this run draws from.
    pub fn catalog(&self) -> Result<Cow<'static, Catalog>, ConfigError> {
        let Some(path) = &self.rules_path else {
            return Ok(Cow::Borrowed(default_catalog()));
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let catalog = compile(&text).map_err(|source| ConfigError::Rules {
            path: path.clone(),
            source,
        })?;
        Ok(Cow::Owned(catalog))
    }

    pub fn proto_stress(&self) -> Option<StressRule> {
        self.apply_default_stress.then(StressRule::default_placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    #[test]
    fn test_default_config_serializes() {
        let config = DriftConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = DriftConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = DriftConfig::from_json(r#"{"seed": 42, "apply_default_stress": false}"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.lineage_depth, 3);
        assert!(config.proto_stress().is_none());
        assert_eq!(
            DriftConfig::default().proto_stress(),
            Some(StressRule::default_placement())
        );
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            DriftConfig::from_json(r#"{"seed": "many"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let error = DriftConfig::from_file(Path::new("/nonexistent/drift.json")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn test_catalog_defaults_to_embedded() {
        let config = DriftConfig::default();
        assert!(matches!(config.catalog().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_catalog_from_rules_file() {
        let dir = std::env::temp_dir().join(format!("drift-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.txt");
        std::fs::write(&good, "% only one\n500\tharmonia\tfront vowel\n").unwrap();
        let config = DriftConfig {
            rules_path: Some(good.display().to_string()),
            ..Default::default()
        };
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 1);

        let bad = dir.join("bad.txt");
        std::fs::write(&bad, "500\tmute\t[ +GLIDE ] > /\n").unwrap();
        let config = DriftConfig {
            rules_path: Some(bad.display().to_string()),
            ..Default::default()
        };
        let error = config.catalog().unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Rules {
                source: RuleError::UncheckedDeletionRule { line: 1, .. },
                ..
            }
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
