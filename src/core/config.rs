//! Run configuration files.
//!
//! A run file pairs a [`ModelSpec`] with a [`MarketStats`] snapshot:
//!
//! ```toml
//! [model]
//! assets = [{ id = "A" }, { id = "B" }]
//! objectives = [{ name = "return", weight = 1.0 }]
//! constraints = [{ type = "budget" }, { type = "long_only" }]
//!
//! [model.hyperparams]
//! iterations = 400
//! seed = 7
//!
//! [market]
//! means = [0.05, 0.08]
//! cov = [[0.04, 0.01], [0.01, 0.09]]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{AllocError, Result};
use crate::core::types::{MarketStats, ModelSpec};

/// One optimization run: model plus market snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelSpec,
    pub market: MarketStats,
}

impl RunConfig {
    pub fn new(model: ModelSpec, market: MarketStats) -> Self {
        Self { model, market }
    }

    /// Parse a TOML run file.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON run file.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a run file, picking the format from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(AllocError::invalid_config(format!(
                "unsupported run file extension {:?} (expected .toml or .json)",
                other.unwrap_or("")
            ))),
        }
    }

    /// Validate model and market together.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.market.validate(self.model.n_assets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ConstraintSpec, ObjectiveKind};

    const SAMPLE: &str = r#"
[model]
assets = [{ id = "A" }, { id = "B", name = "Bonds" }]
objectives = [{ name = "return", weight = 1.0 }, { name = "variance", weight = 0.5 }]
constraints = [{ type = "budget" }, { type = "long_only" }]

[model.hyperparams]
iterations = 400
seed = 7
execution = "parallel"

[market]
means = [0.05, 0.08]
cov = [[0.04, 0.01], [0.01, 0.09]]
"#;

    #[test]
    fn test_parse_toml() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.model.n_assets(), 2);
        assert_eq!(config.model.objectives[1].kind, ObjectiveKind::Variance);
        assert_eq!(config.model.constraints[1], ConstraintSpec::LongOnly);
        assert_eq!(config.model.hyperparams.iterations, Some(400));
        assert_eq!(config.model.hyperparams.states, None);
        assert_eq!(config.model.assets[1].label(), "Bonds");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "model": {
                "assets": [{"id": "A"}],
                "objectives": [{"name": "sharpe", "weight": 1.0, "params": {"risk_free": 0.02}}]
            },
            "market": {"means": [0.05], "cov": [[0.04]]}
        }"#;
        let config = RunConfig::from_json_str(json).unwrap();
        assert!((config.model.objectives[0].param("risk_free", 0.0) - 0.02).abs() < 1e-12);
        assert!(config.model.constraints.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let json = r#"{
            "model": {"assets": [{"id": "A"}, {"id": "B"}], "objectives": []},
            "market": {"means": [0.05], "cov": [[0.04]]}
        }"#;
        assert!(matches!(
            RunConfig::from_json_str(json),
            Err(AllocError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "model: {}").unwrap();
        assert!(matches!(
            RunConfig::from_path(&path),
            Err(AllocError::InvalidConfig { .. })
        ));
    }
}
