// Suppress warning from PyO3 macro expansion (fixed in newer PyO3 versions)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

//! RaptorAlloc - portfolio weight allocation by ensemble annealing.
//!
//! This crate provides:
//! - A declarative model spec (assets, weighted objectives, constraints)
//! - Multi-objective utility with a correlation-based entanglement penalty
//! - Constraint enforcement with budget renormalization
//! - An ensemble simulated-annealing search with Metropolis and tunneling
//!   acceptance, reproducible from a seed in sequential or parallel mode
//! - An investor-profile layer over a default retail asset universe
//!
//! ```no_run
//! use raptoralloc::{optimize, ConstraintSpec, MarketStats, ModelSpec, ObjectiveSpec};
//!
//! let spec = ModelSpec::from_ids(["a", "b"])
//!     .with_objective(ObjectiveSpec::expected_return(1.0))
//!     .with_objective(ObjectiveSpec::variance(0.5))
//!     .with_constraint(ConstraintSpec::budget())
//!     .with_constraint(ConstraintSpec::LongOnly);
//! let market = MarketStats::new(vec![0.08, 0.05], vec![vec![0.04, 0.0], vec![0.0, 0.01]]);
//! let result = optimize(spec, &market).unwrap();
//! assert_eq!(result.allocation.len(), 2);
//! ```

pub mod core;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod profile;
#[cfg(feature = "python")]
pub mod python;

pub use crate::core::{
    AllocError, Asset, ConstraintSpec, ExecutionMode, HyperparamOverrides, Hyperparams,
    MarketStats, ModelSpec, ObjectiveKind, ObjectiveSpec, Result, RunConfig, Weights,
};
pub use crate::optimizer::{optimize, AllocationResult, Translator};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _raptoralloc(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::bindings::PyAllocationResult>()?;

    m.add_function(wrap_pyfunction!(python::bindings::optimize, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::optimize_json, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::optimize_profile, m)?)?;

    Ok(())
}
