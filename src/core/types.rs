//! Core data types for RaptorAlloc.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{AllocError, Result};
use crate::core::linalg::validate_covariance;

/// Type alias for a portfolio weight vector, aligned to asset order.
pub type Weights = Vec<f64>;

/// Scoring callable for `custom` objectives.
pub type CustomObjective = Arc<dyn Fn(&[f64], &MarketStats) -> f64 + Send + Sync>;

/// A single allocatable asset. Defines one dimension of the weight vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Asset {
    /// Create an asset with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Set display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, falling back to the identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Market statistics snapshot consumed by one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    /// Expected return per asset.
    pub means: Vec<f64>,
    /// Covariance matrix (n x n).
    pub cov: Vec<Vec<f64>>,
    /// Optional liquidity per asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Vec<f64>>,
}

impl MarketStats {
    /// Create market stats from means and covariance.
    pub fn new(means: Vec<f64>, cov: Vec<Vec<f64>>) -> Self {
        Self {
            means,
            cov,
            liquidity: None,
        }
    }

    /// Set per-asset liquidity.
    pub fn with_liquidity(mut self, liquidity: Vec<f64>) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    /// Number of assets described by the snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Validate the snapshot against an asset count.
    pub fn validate(&self, n_assets: usize) -> Result<()> {
        if self.means.len() != n_assets {
            return Err(AllocError::length_mismatch("means", n_assets, self.means.len()));
        }
        if self.means.iter().any(|m| !m.is_finite()) {
            return Err(AllocError::non_finite("means"));
        }
        validate_covariance(&self.cov, n_assets)?;
        if let Some(liquidity) = &self.liquidity {
            if liquidity.len() != n_assets {
                return Err(AllocError::length_mismatch(
                    "liquidity",
                    n_assets,
                    liquidity.len(),
                ));
            }
        }
        Ok(())
    }
}

/// Objective term kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Expected portfolio return.
    Return,
    /// Portfolio variance (penalized).
    Variance,
    /// Return over volatility.
    Sharpe,
    /// Caller-supplied scoring function.
    Custom,
    /// Unrecognized name; contributes zero.
    #[serde(other)]
    Unknown,
}

impl ObjectiveKind {
    /// Parse an objective name. Unknown names map to [`ObjectiveKind::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "return" => ObjectiveKind::Return,
            "variance" => ObjectiveKind::Variance,
            "sharpe" => ObjectiveKind::Sharpe,
            "custom" => ObjectiveKind::Custom,
            _ => ObjectiveKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectiveKind::Return => "return",
            ObjectiveKind::Variance => "variance",
            ObjectiveKind::Sharpe => "sharpe",
            ObjectiveKind::Custom => "custom",
            ObjectiveKind::Unknown => "unknown",
        }
    }
}

/// One weighted term of the composite utility.
#[derive(Clone, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    /// Term kind.
    #[serde(rename = "name")]
    pub kind: ObjectiveKind,
    /// Linear weight of the term.
    pub weight: f64,
    /// Optional numeric parameters (`risk_free` for sharpe).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
    /// Optional label, used in utility breakdowns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Scoring function for `custom` terms.
    #[serde(skip)]
    pub custom: Option<CustomObjective>,
}

impl ObjectiveSpec {
    /// Create a built-in objective term.
    pub fn new(kind: ObjectiveKind, weight: f64) -> Self {
        Self {
            kind,
            weight,
            params: BTreeMap::new(),
            label: None,
            custom: None,
        }
    }

    pub fn expected_return(weight: f64) -> Self {
        Self::new(ObjectiveKind::Return, weight)
    }

    pub fn variance(weight: f64) -> Self {
        Self::new(ObjectiveKind::Variance, weight)
    }

    pub fn sharpe(weight: f64) -> Self {
        Self::new(ObjectiveKind::Sharpe, weight)
    }

    /// Create a custom objective from a scoring function.
    pub fn custom<F>(weight: f64, scorer: F) -> Self
    where
        F: Fn(&[f64], &MarketStats) -> f64 + Send + Sync + 'static,
    {
        Self {
            custom: Some(Arc::new(scorer)),
            ..Self::new(ObjectiveKind::Custom, weight)
        }
    }

    /// Set a numeric parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Set a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Read a numeric parameter with a fallback.
    pub fn param(&self, key: &str, default: f64) -> f64 {
        self.params.get(key).copied().unwrap_or(default)
    }

    /// Name shown in breakdowns: the label if set, otherwise the kind.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.as_str())
    }
}

impl fmt::Debug for ObjectiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectiveSpec")
            .field("kind", &self.kind)
            .field("weight", &self.weight)
            .field("params", &self.params)
            .field("label", &self.label)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

fn default_budget() -> f64 {
    1.0
}

/// Feasibility constraint. Constraints apply in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintSpec {
    /// Weights sum to a target.
    Budget {
        #[serde(default = "default_budget")]
        target: f64,
    },
    /// Per-asset lower and upper bounds.
    #[serde(rename = "box")]
    BoxBounds { min: Vec<f64>, max: Vec<f64> },
    /// Cap on a single asset's weight.
    MaxWeight { index: usize, max: f64 },
    /// No negative weights.
    LongOnly,
}

impl ConstraintSpec {
    /// Budget constraint summing to one.
    pub fn budget() -> Self {
        ConstraintSpec::Budget { target: 1.0 }
    }

    pub fn box_bounds(min: Vec<f64>, max: Vec<f64>) -> Self {
        ConstraintSpec::BoxBounds { min, max }
    }

    pub fn max_weight(index: usize, max: f64) -> Self {
        ConstraintSpec::MaxWeight { index, max }
    }

    /// Short name used in logs and violation reports.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintSpec::Budget { .. } => "budget",
            ConstraintSpec::BoxBounds { .. } => "box",
            ConstraintSpec::MaxWeight { .. } => "max_weight",
            ConstraintSpec::LongOnly => "long_only",
        }
    }

    fn validate(&self, n_assets: usize) -> Result<()> {
        match self {
            ConstraintSpec::Budget { target } => {
                if !target.is_finite() || *target <= 0.0 {
                    return Err(AllocError::invalid_config(format!(
                        "budget target must be positive, got {}",
                        target
                    )));
                }
            }
            ConstraintSpec::BoxBounds { min, max } => {
                if min.len() != n_assets {
                    return Err(AllocError::length_mismatch("box min", n_assets, min.len()));
                }
                if max.len() != n_assets {
                    return Err(AllocError::length_mismatch("box max", n_assets, max.len()));
                }
                for (i, (lo, hi)) in min.iter().zip(max.iter()).enumerate() {
                    if lo.is_nan() || hi.is_nan() || lo > hi {
                        return Err(AllocError::invalid_config(format!(
                            "box bounds for asset {} are inverted: [{}, {}]",
                            i, lo, hi
                        )));
                    }
                }
            }
            ConstraintSpec::MaxWeight { index, max } => {
                if *index >= n_assets {
                    return Err(AllocError::IndexOutOfBounds {
                        index: *index,
                        length: n_assets,
                    });
                }
                if max.is_nan() {
                    return Err(AllocError::non_finite("max_weight cap"));
                }
            }
            ConstraintSpec::LongOnly => {}
        }
        Ok(())
    }
}

/// How ensemble members are stepped within one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Members stepped one after another on the calling thread.
    #[default]
    Sequential,
    /// Members stepped on the rayon pool, joined before each interaction step.
    Parallel,
}

/// Optional search hyperparameters as declared in a [`ModelSpec`].
///
/// Unset fields resolve to the defaults listed on [`Hyperparams`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperparamOverrides {
    pub states: Option<usize>,
    pub iterations: Option<usize>,
    pub initial_temp: Option<f64>,
    pub final_temp: Option<f64>,
    pub tunneling_mass: Option<f64>,
    pub tunneling_hbar: Option<f64>,
    pub entanglement_gamma: Option<f64>,
    pub perturbation_scale: Option<f64>,
    pub seed: Option<u64>,
    pub execution: Option<ExecutionMode>,
}

impl HyperparamOverrides {
    /// Resolve against defaults for a given asset count.
    pub fn resolve(&self, n_assets: usize) -> Hyperparams {
        let defaults = Hyperparams::for_assets(n_assets);
        Hyperparams {
            states: self.states.unwrap_or(defaults.states),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            initial_temp: self.initial_temp.unwrap_or(defaults.initial_temp),
            final_temp: self.final_temp.unwrap_or(defaults.final_temp),
            tunneling_mass: self.tunneling_mass.unwrap_or(defaults.tunneling_mass),
            tunneling_hbar: self.tunneling_hbar.unwrap_or(defaults.tunneling_hbar),
            entanglement_gamma: self.entanglement_gamma.unwrap_or(defaults.entanglement_gamma),
            perturbation_scale: self.perturbation_scale.unwrap_or(defaults.perturbation_scale),
            seed: self.seed.unwrap_or(defaults.seed),
            execution: self.execution.unwrap_or(defaults.execution),
        }
    }
}

/// Resolved search hyperparameters used by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparams {
    /// Ensemble size.
    pub states: usize,
    /// Number of annealing iterations.
    pub iterations: usize,
    /// Starting temperature.
    pub initial_temp: f64,
    /// Temperature at the last iteration.
    pub final_temp: f64,
    /// Mass analogue in the tunneling probability.
    pub tunneling_mass: f64,
    /// Reduced Planck constant analogue in the tunneling probability.
    pub tunneling_hbar: f64,
    /// Strength of the correlated-pair penalty.
    pub entanglement_gamma: f64,
    /// Scale of proposal perturbations and initial sampling spread.
    pub perturbation_scale: f64,
    /// Random seed.
    pub seed: u64,
    /// Ensemble stepping mode.
    pub execution: ExecutionMode,
}

impl Hyperparams {
    /// Defaults for a model with `n_assets` assets.
    pub fn for_assets(n_assets: usize) -> Self {
        Self {
            states: (n_assets * 2).max(8),
            iterations: 1200,
            initial_temp: 1.0,
            final_temp: 1e-3,
            tunneling_mass: 1.0,
            tunneling_hbar: 1.0,
            entanglement_gamma: 0.5,
            perturbation_scale: 0.15,
            seed: 42,
            execution: ExecutionMode::Sequential,
        }
    }

    /// Validate hyperparameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.states == 0 {
            return Err(AllocError::invalid_parameter("states must be at least 1"));
        }
        if !(self.initial_temp.is_finite() && self.initial_temp > 0.0) {
            return Err(AllocError::invalid_parameter(format!(
                "initial_temp must be positive, got {}",
                self.initial_temp
            )));
        }
        if !(self.final_temp.is_finite() && self.final_temp > 0.0) {
            return Err(AllocError::invalid_parameter(format!(
                "final_temp must be positive, got {}",
                self.final_temp
            )));
        }
        if !(self.tunneling_mass.is_finite() && self.tunneling_mass >= 0.0) {
            return Err(AllocError::invalid_parameter(
                "tunneling_mass must be non-negative",
            ));
        }
        if !(self.tunneling_hbar.is_finite() && self.tunneling_hbar > 0.0) {
            return Err(AllocError::invalid_parameter("tunneling_hbar must be positive"));
        }
        if !self.entanglement_gamma.is_finite() {
            return Err(AllocError::non_finite("entanglement_gamma"));
        }
        if !(self.perturbation_scale.is_finite() && self.perturbation_scale >= 0.0) {
            return Err(AllocError::invalid_parameter(
                "perturbation_scale must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Configuration of one optimization model, independent of market data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Assets, in weight-vector order.
    pub assets: Vec<Asset>,
    /// Objective terms, combined linearly.
    pub objectives: Vec<ObjectiveSpec>,
    /// Constraints, applied in order.
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    /// Search hyperparameters.
    #[serde(default)]
    pub hyperparams: HyperparamOverrides,
    /// Per-asset multiplicative bias on initial sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_bias: Option<Vec<f64>>,
}

impl ModelSpec {
    /// Create a spec with assets and no objectives or constraints.
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            objectives: Vec::new(),
            constraints: Vec::new(),
            hyperparams: HyperparamOverrides::default(),
            initial_bias: None,
        }
    }

    /// Create a spec from bare asset identifiers.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ids.into_iter().map(Asset::new).collect())
    }

    /// Add an objective term.
    pub fn with_objective(mut self, objective: ObjectiveSpec) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Replace hyperparameter overrides.
    pub fn with_hyperparams(mut self, hyperparams: HyperparamOverrides) -> Self {
        self.hyperparams = hyperparams;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.hyperparams.seed = Some(seed);
        self
    }

    /// Set iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.hyperparams.iterations = Some(iterations);
        self
    }

    /// Set ensemble size.
    pub fn with_states(mut self, states: usize) -> Self {
        self.hyperparams.states = Some(states);
        self
    }

    /// Set execution mode.
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.hyperparams.execution = Some(execution);
        self
    }

    /// Set initial sampling bias.
    pub fn with_initial_bias(mut self, bias: Vec<f64>) -> Self {
        self.initial_bias = Some(bias);
        self
    }

    /// Number of assets.
    #[inline]
    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Hyperparameters with defaults filled in.
    pub fn resolved_hyperparams(&self) -> Hyperparams {
        self.hyperparams.resolve(self.n_assets())
    }

    /// Validate everything that does not depend on market data.
    pub fn validate(&self) -> Result<()> {
        let n = self.n_assets();
        if n == 0 {
            return Err(AllocError::empty_data("assets"));
        }

        let mut seen = HashSet::with_capacity(n);
        for asset in &self.assets {
            if !seen.insert(asset.id.as_str()) {
                return Err(AllocError::invalid_config(format!(
                    "duplicate asset id '{}'",
                    asset.id
                )));
            }
        }

        for objective in &self.objectives {
            if !objective.weight.is_finite() {
                return Err(AllocError::non_finite(format!(
                    "weight of objective '{}'",
                    objective.display_name()
                )));
            }
        }

        for constraint in &self.constraints {
            constraint.validate(n)?;
        }

        if let Some(bias) = &self.initial_bias {
            if bias.len() != n {
                return Err(AllocError::length_mismatch("initial_bias", n, bias.len()));
            }
            if bias.iter().any(|b| !b.is_finite() || *b < 0.0) {
                return Err(AllocError::invalid_config(
                    "initial_bias entries must be finite and non-negative",
                ));
            }
        }

        self.resolved_hyperparams().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_asset_market() -> MarketStats {
        MarketStats::new(vec![0.05, 0.07], vec![vec![0.04, 0.01], vec![0.01, 0.09]])
    }

    #[test]
    fn test_default_hyperparams() {
        let hp = Hyperparams::for_assets(3);
        assert_eq!(hp.states, 8);
        assert_eq!(hp.iterations, 1200);
        assert_eq!(hp.seed, 42);

        let hp = Hyperparams::for_assets(10);
        assert_eq!(hp.states, 20);
    }

    #[test]
    fn test_overrides_resolve() {
        let overrides = HyperparamOverrides {
            iterations: Some(50),
            seed: Some(7),
            ..Default::default()
        };
        let hp = overrides.resolve(4);
        assert_eq!(hp.iterations, 50);
        assert_eq!(hp.seed, 7);
        assert!((hp.initial_temp - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_market_validation() {
        let market = two_asset_market();
        assert!(market.validate(2).is_ok());
        assert!(matches!(
            market.validate(3),
            Err(AllocError::LengthMismatch { .. })
        ));

        let bad_liquidity = two_asset_market().with_liquidity(vec![1.0]);
        assert!(bad_liquidity.validate(2).is_err());
    }

    #[test]
    fn test_spec_validation() {
        let spec = ModelSpec::from_ids(["A", "B"])
            .with_objective(ObjectiveSpec::expected_return(1.0))
            .with_constraint(ConstraintSpec::max_weight(5, 0.5));
        assert!(matches!(
            spec.validate(),
            Err(AllocError::IndexOutOfBounds { index: 5, length: 2 })
        ));

        let empty = ModelSpec::new(vec![]);
        assert!(matches!(empty.validate(), Err(AllocError::EmptyData { .. })));

        let dup = ModelSpec::from_ids(["A", "A"]);
        assert!(matches!(dup.validate(), Err(AllocError::InvalidConfig { .. })));

        let zero_states = ModelSpec::from_ids(["A"]).with_states(0);
        assert!(zero_states.validate().is_err());
    }

    #[test]
    fn test_objective_names() {
        assert_eq!(ObjectiveKind::from_name("Sharpe"), ObjectiveKind::Sharpe);
        assert_eq!(ObjectiveKind::from_name("sortino"), ObjectiveKind::Unknown);

        let parsed: ObjectiveSpec =
            serde_json::from_str(r#"{"name": "kelly", "weight": 2.0}"#).unwrap();
        assert_eq!(parsed.kind, ObjectiveKind::Unknown);
        assert!(parsed.custom.is_none());
    }

    #[test]
    fn test_constraint_serde() {
        let json = r#"[
            {"type": "budget"},
            {"type": "box", "min": [0.0, 0.1], "max": [0.6, 0.9]},
            {"type": "max_weight", "index": 1, "max": 0.4},
            {"type": "long_only"}
        ]"#;
        let constraints: Vec<ConstraintSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(constraints[0], ConstraintSpec::Budget { target: 1.0 });
        assert_eq!(constraints[1].name(), "box");
        assert_eq!(constraints[2], ConstraintSpec::max_weight(1, 0.4));
        assert_eq!(constraints[3], ConstraintSpec::LongOnly);
    }

    #[test]
    fn test_asset_label() {
        assert_eq!(Asset::new("PPF").label(), "PPF");
        assert_eq!(
            Asset::new("gold").with_name("Gold ETF").label(),
            "Gold ETF"
        );
    }
}
