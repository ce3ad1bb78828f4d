//! Annealing allocator.
//!
//! A [`Translator`] is built once from a [`ModelSpec`] and can then be run
//! against any number of market snapshots. Each run goes
//! `Initializing -> Annealing(t = 0..T-1) -> Terminated` and keeps no state
//! between calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::{AllocError, Result};
use crate::core::rng::Xoshiro256;
use crate::core::types::{Hyperparams, MarketStats, ModelSpec, Weights};
use crate::model::{ConstraintSet, ConstraintViolation, UtilityFunction};
use crate::optimizer::acceptance::AcceptanceRule;
use crate::optimizer::diagnostics::{IterationRecord, RunStats};
use crate::optimizer::ensemble::{CandidateState, Ensemble, StepContext};
use crate::optimizer::schedule::CoolingSchedule;

/// Outcome of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Best allocation found, aligned to asset order.
    pub allocation: Weights,
    /// Utility of `allocation`.
    pub score: f64,
    /// One record per iteration.
    pub diagnostics: Vec<IterationRecord>,
    /// Hyperparameters the run used.
    pub hyperparams: Hyperparams,
    /// Echo of the model spec.
    pub spec: ModelSpec,
    /// Acceptance and interaction counters.
    pub stats: RunStats,
    /// Bound violations left on `allocation` after budget renormalization.
    pub violations: Vec<ConstraintViolation>,
}

impl AllocationResult {
    /// Pair each weight with its asset id.
    pub fn weights_by_asset(&self) -> Vec<(String, f64)> {
        self.spec
            .assets
            .iter()
            .zip(self.allocation.iter())
            .map(|(asset, &w)| (asset.id.clone(), w))
            .collect()
    }

    /// Sum of the allocation.
    pub fn total_weight(&self) -> f64 {
        self.allocation.iter().sum()
    }

    /// Whether every declared bound holds on the allocation.
    pub fn is_fully_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Reusable optimizer configured by a [`ModelSpec`].
#[derive(Debug, Clone)]
pub struct Translator {
    spec: ModelSpec,
    hyperparams: Hyperparams,
    constraints: ConstraintSet,
}

impl Translator {
    /// Validate the spec and resolve hyperparameters.
    pub fn new(spec: ModelSpec) -> Result<Self> {
        spec.validate()?;
        let hyperparams = spec.resolved_hyperparams();
        let constraints = ConstraintSet::new(&spec.constraints);
        Ok(Self {
            spec,
            hyperparams,
            constraints,
        })
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn hyperparams(&self) -> &Hyperparams {
        &self.hyperparams
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Build the utility this translator optimizes for a market snapshot.
    pub fn utility(&self, market: &MarketStats) -> Result<UtilityFunction> {
        market.validate(self.spec.n_assets())?;
        Ok(UtilityFunction::from_spec(
            &self.spec,
            &self.hyperparams,
            market,
        ))
    }

    /// Run one search against `market`.
    ///
    /// Fails only on invalid market data, before any iteration runs.
    pub fn translate(&self, market: &MarketStats) -> Result<AllocationResult> {
        let utility = self.utility(market)?;
        let hp = &self.hyperparams;
        let n_assets = self.spec.n_assets();

        info!(
            "Starting allocation search: {} assets, {} states, {} iterations, seed {}",
            n_assets, hp.states, hp.iterations, hp.seed
        );

        let mut rng = Xoshiro256::new(hp.seed);
        let mut ensemble = Ensemble::initialize(
            hp.states,
            n_assets,
            hp.perturbation_scale,
            self.spec.initial_bias.as_deref(),
            &utility,
            &self.constraints,
            &mut rng,
        );

        let mut best: CandidateState = ensemble
            .best()
            .cloned()
            .ok_or_else(|| AllocError::empty_data("ensemble"))?;

        let mut stats = RunStats {
            initial_best_score: best.score,
            ..Default::default()
        };
        let mut diagnostics = Vec::with_capacity(hp.iterations);

        let schedule = CoolingSchedule::new(hp.initial_temp, hp.final_temp, hp.iterations);
        let rule = AcceptanceRule::new(hp.tunneling_mass, hp.tunneling_hbar);
        let interaction_period = (hp.iterations / 10).max(1);

        for t in 0..hp.iterations {
            let temperature = schedule.temperature(t);
            let ctx = StepContext {
                utility: &utility,
                constraints: &self.constraints,
                rule,
                temperature,
                perturbation_scale: hp.perturbation_scale,
            };

            let outcomes = ensemble.step(&ctx, hp.execution);
            for (i, outcome) in outcomes.into_iter().enumerate() {
                stats.record(outcome);
                let state = ensemble.state(i);
                if state.score > best.score {
                    best = state.clone();
                    stats.best_updates += 1;
                    debug!(
                        "New best at iteration {} (state {}): score {:.6}",
                        t, i, best.score
                    );
                }
            }

            let avg_score = ensemble.average_score();
            diagnostics.push(IterationRecord {
                iteration: t,
                best_score: best.score,
                avg_score,
            });

            if t % interaction_period == 0 {
                ensemble.interact(avg_score, temperature, &utility, &self.constraints);
                stats.interaction_steps += 1;
                debug!(
                    "Ensemble interaction at iteration {} (T = {:.6}, avg {:.6})",
                    t, temperature, avg_score
                );
            }
        }

        let violations = self.constraints.violations(&best.weights);
        if !violations.is_empty() {
            warn!(
                "Best allocation violates {} bound(s) after budget renormalization",
                violations.len()
            );
        }

        info!(
            "Allocation search completed: score {:.6} (initial best {:.6}), acceptance rate {:.3}",
            best.score,
            stats.initial_best_score,
            stats.acceptance_rate()
        );

        Ok(AllocationResult {
            allocation: best.weights,
            score: best.score,
            diagnostics,
            hyperparams: hp.clone(),
            spec: self.spec.clone(),
            stats,
            violations,
        })
    }
}

/// Build a translator and run it once.
pub fn optimize(spec: ModelSpec, market: &MarketStats) -> Result<AllocationResult> {
    Translator::new(spec)?.translate(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ConstraintSpec, ObjectiveSpec};

    fn spec() -> ModelSpec {
        ModelSpec::from_ids(["A", "B", "C"])
            .with_objective(ObjectiveSpec::expected_return(1.0))
            .with_objective(ObjectiveSpec::variance(0.5))
            .with_constraint(ConstraintSpec::budget())
            .with_constraint(ConstraintSpec::LongOnly)
            .with_iterations(120)
            .with_states(6)
            .with_seed(11)
    }

    fn market() -> MarketStats {
        MarketStats::new(
            vec![0.05, 0.09, 0.03],
            vec![
                vec![0.04, 0.01, 0.0],
                vec![0.01, 0.09, 0.01],
                vec![0.0, 0.01, 0.02],
            ],
        )
    }

    #[test]
    fn test_translate_basic() {
        let result = Translator::new(spec()).unwrap().translate(&market()).unwrap();
        assert_eq!(result.allocation.len(), 3);
        assert!((result.total_weight() - 1.0).abs() < 1e-6);
        assert_eq!(result.diagnostics.len(), 120);
        assert_eq!(result.stats.proposals(), 120 * 6);
        assert_eq!(result.stats.interaction_steps, 10);
        assert!(result.score >= result.stats.initial_best_score);
        assert!(result.is_fully_feasible());
    }

    #[test]
    fn test_score_matches_allocation() {
        let translator = Translator::new(spec()).unwrap();
        let result = translator.translate(&market()).unwrap();
        let utility = translator.utility(&market()).unwrap();
        assert!((utility.evaluate(&result.allocation) - result.score).abs() < 1e-12);
    }

    #[test]
    fn test_reusable_across_markets() {
        let translator = Translator::new(spec()).unwrap();
        let first = translator.translate(&market()).unwrap();
        let again = translator.translate(&market()).unwrap();
        assert_eq!(first.allocation, again.allocation);

        let mut shifted = market();
        shifted.means = vec![0.12, 0.01, 0.01];
        let other = translator.translate(&shifted).unwrap();
        assert!(other.allocation[0] > first.allocation[0]);
    }

    #[test]
    fn test_mismatched_market_fails_fast() {
        let translator = Translator::new(spec()).unwrap();
        let bad = MarketStats::new(vec![0.05, 0.09], vec![vec![0.04, 0.0], vec![0.0, 0.09]]);
        assert!(matches!(
            translator.translate(&bad),
            Err(AllocError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_iterations() {
        let result = optimize(spec().with_iterations(0), &market()).unwrap();
        assert!(result.diagnostics.is_empty());
        assert!((result.score - result.stats.initial_best_score).abs() < 1e-15);
    }

    #[test]
    fn test_weights_by_asset() {
        let result = optimize(spec(), &market()).unwrap();
        let labelled = result.weights_by_asset();
        assert_eq!(labelled[0].0, "A");
        assert_eq!(labelled[2].1, result.allocation[2]);
    }
}
