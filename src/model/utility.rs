//! Composite utility function.
//!
//! Built once per run from the market snapshot and the objective list. The
//! correlation matrix is precomputed; evaluation is a pure function of the
//! weight vector.

use crate::core::linalg::{covariance_to_correlation, dot, quadratic_form, EPSILON};
use crate::core::types::{Hyperparams, MarketStats, ModelSpec, ObjectiveKind, ObjectiveSpec};

/// Contribution of one term to a utility score.
#[derive(Debug, Clone, PartialEq)]
pub struct TermContribution {
    pub name: String,
    pub value: f64,
}

/// Utility function `weights -> score`.
#[derive(Debug, Clone)]
pub struct UtilityFunction {
    market: MarketStats,
    corr: Vec<Vec<f64>>,
    objectives: Vec<ObjectiveSpec>,
    entanglement_gamma: f64,
}

impl UtilityFunction {
    /// Build the utility for a validated market snapshot.
    pub fn new(market: &MarketStats, objectives: &[ObjectiveSpec], entanglement_gamma: f64) -> Self {
        Self {
            corr: covariance_to_correlation(&market.cov),
            market: market.clone(),
            objectives: objectives.to_vec(),
            entanglement_gamma,
        }
    }

    /// Build the utility described by a model spec.
    pub fn from_spec(spec: &ModelSpec, hyperparams: &Hyperparams, market: &MarketStats) -> Self {
        Self::new(market, &spec.objectives, hyperparams.entanglement_gamma)
    }

    /// Precomputed asset correlation matrix.
    pub fn correlation(&self) -> &[Vec<f64>] {
        &self.corr
    }

    pub fn market(&self) -> &MarketStats {
        &self.market
    }

    /// Evaluate the composite score.
    pub fn evaluate(&self, weights: &[f64]) -> f64 {
        let mut score = 0.0;
        for objective in &self.objectives {
            score += self.term(objective, weights);
        }
        score - self.entanglement_penalty(weights)
    }

    /// Per-term breakdown, ending with the entanglement penalty (negated).
    ///
    /// The values sum to [`UtilityFunction::evaluate`].
    pub fn breakdown(&self, weights: &[f64]) -> Vec<TermContribution> {
        let mut terms: Vec<TermContribution> = self
            .objectives
            .iter()
            .map(|objective| TermContribution {
                name: objective.display_name().to_string(),
                value: self.term(objective, weights),
            })
            .collect();
        terms.push(TermContribution {
            name: "entanglement_penalty".to_string(),
            value: -self.entanglement_penalty(weights),
        });
        terms
    }

    /// `gamma * sum_{i != j} corr[i][j] * w[i] * w[j]`.
    pub fn entanglement_penalty(&self, weights: &[f64]) -> f64 {
        let n = weights.len();
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    sum += self.corr[i][j] * weights[i] * weights[j];
                }
            }
        }
        self.entanglement_gamma * sum
    }

    /// Signed contribution of one objective term.
    fn term(&self, objective: &ObjectiveSpec, weights: &[f64]) -> f64 {
        let w = objective.weight;
        match objective.kind {
            ObjectiveKind::Return => w * dot(weights, &self.market.means),
            ObjectiveKind::Variance => -w * quadratic_form(&self.market.cov, weights),
            ObjectiveKind::Sharpe => {
                let ret = dot(weights, &self.market.means) - objective.param("risk_free", 0.0);
                let vol = quadratic_form(&self.market.cov, weights).max(EPSILON).sqrt();
                w * (ret / (vol + EPSILON))
            }
            ObjectiveKind::Custom => match &objective.custom {
                Some(scorer) => {
                    let value = scorer(weights, &self.market);
                    if value.is_finite() {
                        w * value
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            },
            ObjectiveKind::Unknown => 0.0,
        }
    }
}
