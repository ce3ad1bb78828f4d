//! PyO3 function bindings for RaptorAlloc.

use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::config::RunConfig;
use crate::core::types::{
    Asset, ConstraintSpec, ExecutionMode, HyperparamOverrides, MarketStats, ModelSpec,
    ObjectiveKind, ObjectiveSpec,
};
use crate::optimizer::{AllocationResult, Translator};
use crate::profile::{AssetUniverse, InvestmentHorizon, InvestorProfile, RiskTolerance};

use super::numpy_bridge::*;

/// Python-exposed allocation result.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyAllocationResult {
    #[pyo3(get)]
    pub asset_ids: Vec<String>,
    #[pyo3(get)]
    pub score: f64,
    #[pyo3(get)]
    pub acceptance_rate: f64,
    inner: AllocationResult,
}

#[pymethods]
impl PyAllocationResult {
    /// Best allocation as numpy array.
    fn allocation<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(py, self.inner.allocation.clone())
    }

    /// Best score per iteration.
    fn best_scores<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(
            py,
            self.inner.diagnostics.iter().map(|r| r.best_score).collect(),
        )
    }

    /// Ensemble average score per iteration.
    fn avg_scores<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(
            py,
            self.inner.diagnostics.iter().map(|r| r.avg_score).collect(),
        )
    }

    /// Mapping of asset id to weight.
    fn to_dict(&self, py: Python) -> PyResult<PyObject> {
        let dict = pyo3::types::PyDict::new(py);
        for (id, weight) in self.inner.weights_by_asset() {
            dict.set_item(id, weight)?;
        }
        Ok(dict.into())
    }

    /// Full result serialized as JSON.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "AllocationResult(assets={}, score={:.6}, iterations={})",
            self.asset_ids.len(),
            self.score,
            self.inner.diagnostics.len()
        )
    }
}

impl From<AllocationResult> for PyAllocationResult {
    fn from(result: AllocationResult) -> Self {
        Self {
            asset_ids: result.spec.assets.iter().map(|a| a.id.clone()).collect(),
            score: result.score,
            acceptance_rate: result.stats.acceptance_rate(),
            inner: result,
        }
    }
}

// ============================================================================
// Optimization Functions
// ============================================================================

/// Run a full `{model, market}` configuration given as JSON.
#[pyfunction]
pub fn optimize_json(py: Python<'_>, config_json: &str) -> PyResult<PyAllocationResult> {
    let config = RunConfig::from_json_str(config_json)?;
    let translator = Translator::new(config.model)?;
    let market = config.market;
    let result = py.allow_threads(|| translator.translate(&market))?;
    Ok(result.into())
}

/// Optimize from numpy market statistics.
///
/// `objectives` is a list of `(name, weight)` pairs. A budget constraint is
/// always applied; long-only is on by default.
#[pyfunction]
#[pyo3(signature = (asset_ids, means, cov, objectives, long_only=true, iterations=None, states=None, seed=None, parallel=false))]
#[allow(clippy::too_many_arguments)]
pub fn optimize(
    py: Python<'_>,
    asset_ids: Vec<String>,
    means: PyReadonlyArray1<f64>,
    cov: PyReadonlyArray2<f64>,
    objectives: Vec<(String, f64)>,
    long_only: bool,
    iterations: Option<usize>,
    states: Option<usize>,
    seed: Option<u64>,
    parallel: bool,
) -> PyResult<PyAllocationResult> {
    let market = MarketStats::new(numpy_to_vec_f64(means)?, numpy_to_matrix_f64(cov));

    let mut spec = ModelSpec::new(asset_ids.into_iter().map(Asset::new).collect())
        .with_constraint(ConstraintSpec::budget());
    if long_only {
        spec = spec.with_constraint(ConstraintSpec::LongOnly);
    }
    for (name, weight) in objectives {
        spec = spec.with_objective(ObjectiveSpec::new(ObjectiveKind::from_name(&name), weight));
    }
    spec.hyperparams = HyperparamOverrides {
        iterations,
        states,
        seed,
        execution: parallel.then_some(ExecutionMode::Parallel),
        ..Default::default()
    };

    let translator = Translator::new(spec)?;
    let result = py.allow_threads(|| translator.translate(&market))?;
    Ok(result.into())
}

/// Allocate across the default retail universe for an investor profile.
#[pyfunction]
#[pyo3(signature = (risk_tolerance=5, horizon="5-10", seed=None, iterations=None))]
pub fn optimize_profile(
    py: Python<'_>,
    risk_tolerance: u8,
    horizon: &str,
    seed: Option<u64>,
    iterations: Option<usize>,
) -> PyResult<PyAllocationResult> {
    let profile = InvestorProfile::new(
        RiskTolerance::new(risk_tolerance)?,
        horizon.parse::<InvestmentHorizon>()?,
    );
    let overrides = HyperparamOverrides {
        seed,
        iterations,
        ..Default::default()
    };
    let universe = AssetUniverse::default();
    let allocation = py.allow_threads(|| profile.allocate(&universe, overrides))?;
    Ok(allocation.result.into())
}
