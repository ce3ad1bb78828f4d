//! Candidate ensemble: initialization, per-member moves and interaction.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::linalg::{l2_distance, EPSILON};
use crate::core::rng::Xoshiro256;
use crate::core::types::{ExecutionMode, Weights};
use crate::model::{normalize_budget, ConstraintSet, UtilityFunction};
use crate::optimizer::acceptance::{Acceptance, AcceptanceRule};

/// Floor added to every initial coordinate so sampled states start interior.
const INITIAL_FLOOR: f64 = 0.01;

/// Bound on the interaction exponent; keeps the rescale factor finite.
pub const MAX_INTERACTION_EXPONENT: f64 = 60.0;

/// A weight vector and its utility score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateState {
    pub weights: Weights,
    pub score: f64,
}

/// Everything a member needs to take one annealing step.
pub struct StepContext<'a> {
    pub utility: &'a UtilityFunction,
    pub constraints: &'a ConstraintSet,
    pub rule: AcceptanceRule,
    pub temperature: f64,
    pub perturbation_scale: f64,
}

/// Ensemble member with its own random stream.
#[derive(Debug, Clone)]
struct Member {
    state: CandidateState,
    rng: Xoshiro256,
}

impl Member {
    fn step(&mut self, ctx: &StepContext<'_>) -> Acceptance {
        let proposal = propose(&self.state.weights, ctx.perturbation_scale, &mut self.rng);
        let candidate = ctx.constraints.enforce(&proposal);
        let candidate_score = ctx.utility.evaluate(&candidate);
        let distance = l2_distance(&self.state.weights, &candidate);

        let outcome = ctx.rule.decide(
            self.state.score,
            candidate_score,
            distance,
            ctx.temperature,
            &mut self.rng,
        );
        if outcome.is_accepted() {
            self.state = CandidateState {
                weights: candidate,
                score: candidate_score,
            };
        }
        outcome
    }
}

/// Neighbor proposal: move one random coordinate by a uniform amount in
/// `[-scale/2, scale/2)` and take half that amount out of a second random
/// coordinate (possibly the same one).
pub fn propose(weights: &[f64], scale: f64, rng: &mut Xoshiro256) -> Weights {
    let n = weights.len();
    let mut candidate = weights.to_vec();
    if n == 0 {
        return candidate;
    }

    let idx = rng.next_index(n);
    let change = rng.next_centered(scale);
    candidate[idx] += change;

    let offset = rng.next_index(n);
    candidate[offset] -= change * 0.5;

    candidate
}

/// Fixed-size collection of candidate states evolved together.
#[derive(Debug, Clone)]
pub struct Ensemble {
    members: Vec<Member>,
}

impl Ensemble {
    /// Sample `size` feasible states from `rng`.
    ///
    /// Each coordinate is `|u - 0.5| * scale + 0.01` (times the optional
    /// per-asset bias), normalized to the budget and constraint-enforced.
    /// Members then receive independent sub-streams split from `rng`.
    pub fn initialize(
        size: usize,
        n_assets: usize,
        perturbation_scale: f64,
        bias: Option<&[f64]>,
        utility: &UtilityFunction,
        constraints: &ConstraintSet,
        rng: &mut Xoshiro256,
    ) -> Self {
        let mut states = Vec::with_capacity(size);
        for _ in 0..size {
            let raw: Weights = (0..n_assets)
                .map(|j| {
                    let base = (rng.next_f64() - 0.5).abs() * perturbation_scale + INITIAL_FLOOR;
                    base * bias.map_or(1.0, |b| b[j])
                })
                .collect();
            let weights = constraints.enforce(&normalize_budget(&raw, constraints.budget()));
            let score = utility.evaluate(&weights);
            states.push(CandidateState { weights, score });
        }

        let members = states
            .into_iter()
            .map(|state| Member {
                state,
                rng: rng.split(),
            })
            .collect();

        Self { members }
    }

    /// Ensemble size.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over member states.
    pub fn states(&self) -> impl Iterator<Item = &CandidateState> {
        self.members.iter().map(|m| &m.state)
    }

    /// State of member `index`.
    pub fn state(&self, index: usize) -> &CandidateState {
        &self.members[index].state
    }

    /// Mean score across members.
    pub fn average_score(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|m| m.state.score).sum::<f64>() / self.members.len() as f64
    }

    /// Highest-scoring member; ties resolve to the lowest index.
    pub fn best(&self) -> Option<&CandidateState> {
        let mut best: Option<&CandidateState> = None;
        for state in self.states() {
            if best.map_or(true, |b| state.score > b.score) {
                best = Some(state);
            }
        }
        best
    }

    /// Step every member once and return the outcomes in member order.
    ///
    /// Members only touch their own state and stream, so both modes yield
    /// identical results. The parallel mode joins before returning.
    pub fn step(&mut self, ctx: &StepContext<'_>, mode: ExecutionMode) -> Vec<Acceptance> {
        match mode {
            ExecutionMode::Sequential => self.members.iter_mut().map(|m| m.step(ctx)).collect(),
            ExecutionMode::Parallel => self.members.par_iter_mut().map(|m| m.step(ctx)).collect(),
        }
    }

    /// Soft selection step: scale each member by
    /// `exp((score - average) / |T|)`, re-enforce and re-score.
    pub fn interact(
        &mut self,
        average_score: f64,
        temperature: f64,
        utility: &UtilityFunction,
        constraints: &ConstraintSet,
    ) {
        for member in &mut self.members {
            let exponent = ((member.state.score - average_score) / (temperature.abs() + EPSILON))
                .clamp(-MAX_INTERACTION_EXPONENT, MAX_INTERACTION_EXPONENT);
            let alpha = exponent.exp();

            let scaled: Weights = member.state.weights.iter().map(|w| w * alpha).collect();
            let weights = constraints.enforce(&scaled);
            member.state.score = utility.evaluate(&weights);
            member.state.weights = weights;
        }
    }
}
