//! Constraint enforcement.
//!
//! Maps any real vector onto the budget simplex, applying the declared
//! constraints in order and finishing with a budget renormalization. Box and
//! max-weight bounds are applied before that final step, so they can be
//! violated afterwards; [`ConstraintSet::violations`] reports the residue.

use serde::{Deserialize, Serialize};

use crate::core::types::{ConstraintSpec, Weights};

/// Tolerance below which a bound overshoot is not reported.
pub const VIOLATION_TOLERANCE: f64 = 1e-9;

/// Rescale positive coordinates so they sum to `target`.
///
/// Non-positive (and NaN) coordinates become zero. Entries are divided by
/// the largest positive entry before summing, so large finite inputs keep
/// their proportions. Infinite entries share the budget equally. When
/// nothing is positive the result is the uniform allocation `target / n`.
pub fn normalize_budget(weights: &[f64], target: f64) -> Weights {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }

    let largest = weights
        .iter()
        .filter(|&&w| w > 0.0)
        .fold(0.0f64, |acc, &w| acc.max(w));
    if largest <= 0.0 {
        return vec![target / n as f64; n];
    }

    let relative: Weights = if largest.is_infinite() {
        weights
            .iter()
            .map(|&w| if w == f64::INFINITY { 1.0 } else { 0.0 })
            .collect()
    } else {
        weights
            .iter()
            .map(|&w| if w > 0.0 { w / largest } else { 0.0 })
            .collect()
    };

    // at least one entry is exactly 1, so the sum lies in [1, n]
    let scale = target / relative.iter().sum::<f64>();
    relative.into_iter().map(|w| w * scale).collect()
}

/// A residual constraint violation on an enforced allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Position of the constraint in the spec.
    pub constraint_index: usize,
    /// Constraint name (`box`, `max_weight`, `long_only`).
    pub constraint: String,
    /// Offending asset.
    pub asset_index: usize,
    /// Bound that was crossed.
    pub bound: f64,
    /// Actual weight.
    pub value: f64,
}

impl ConstraintViolation {
    /// Distance past the bound.
    pub fn excess(&self) -> f64 {
        (self.value - self.bound).abs()
    }
}

/// Ordered constraint list with its resolved budget target.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    constraints: Vec<ConstraintSpec>,
    budget: f64,
}

impl ConstraintSet {
    /// Build from spec order. The budget target is the last explicit
    /// `budget` target, defaulting to 1.
    pub fn new(constraints: &[ConstraintSpec]) -> Self {
        let budget = constraints
            .iter()
            .rev()
            .find_map(|c| match c {
                ConstraintSpec::Budget { target } => Some(*target),
                _ => None,
            })
            .unwrap_or(1.0);

        Self {
            constraints: constraints.to_vec(),
            budget,
        }
    }

    /// Budget every enforced vector sums to.
    #[inline]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    /// Whether a `long_only` constraint is declared.
    pub fn is_long_only(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ConstraintSpec::LongOnly))
    }

    /// Map a vector to a feasible point.
    pub fn enforce(&self, weights: &[f64]) -> Weights {
        let mut out = weights.to_vec();

        for constraint in &self.constraints {
            match constraint {
                ConstraintSpec::LongOnly => {
                    for w in out.iter_mut() {
                        *w = w.max(0.0);
                    }
                }
                ConstraintSpec::BoxBounds { min, max } => {
                    // coordinates without a declared bound pass through
                    for (w, (lo, hi)) in out.iter_mut().zip(min.iter().zip(max.iter())) {
                        *w = w.min(*hi).max(*lo);
                    }
                }
                ConstraintSpec::MaxWeight { index, max } => {
                    if let Some(w) = out.get_mut(*index) {
                        *w = w.min(*max);
                    }
                }
                ConstraintSpec::Budget { target } => {
                    out = normalize_budget(&out, *target);
                }
            }
        }

        normalize_budget(&out, self.budget)
    }

    /// Bound violations remaining on an enforced allocation.
    pub fn violations(&self, weights: &[f64]) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for (ci, constraint) in self.constraints.iter().enumerate() {
            match constraint {
                ConstraintSpec::LongOnly => {
                    for (i, &w) in weights.iter().enumerate() {
                        if w < -VIOLATION_TOLERANCE {
                            violations.push(violation(ci, constraint, i, 0.0, w));
                        }
                    }
                }
                ConstraintSpec::BoxBounds { min, max } => {
                    let bounds = min.iter().zip(max.iter());
                    for (i, (&w, (&lo, &hi))) in weights.iter().zip(bounds).enumerate() {
                        if w < lo - VIOLATION_TOLERANCE {
                            violations.push(violation(ci, constraint, i, lo, w));
                        } else if w > hi + VIOLATION_TOLERANCE {
                            violations.push(violation(ci, constraint, i, hi, w));
                        }
                    }
                }
                ConstraintSpec::MaxWeight { index, max } => {
                    if let Some(&w) = weights.get(*index) {
                        if w > max + VIOLATION_TOLERANCE {
                            violations.push(violation(ci, constraint, *index, *max, w));
                        }
                    }
                }
                ConstraintSpec::Budget { .. } => {}
            }
        }

        violations
    }
}

fn violation(
    constraint_index: usize,
    constraint: &ConstraintSpec,
    asset_index: usize,
    bound: f64,
    value: f64,
) -> ConstraintViolation {
    ConstraintViolation {
        constraint_index,
        constraint: constraint.name().to_string(),
        asset_index,
        bound,
        value,
    }
}
