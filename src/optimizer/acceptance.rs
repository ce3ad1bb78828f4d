//! Acceptance criteria for proposed moves.
//!
//! A worse candidate gets two chances: the Metropolis test at the current
//! temperature, then a tunneling test that depends on the score gap and the
//! distance of the move but not on temperature.

use serde::{Deserialize, Serialize};

use crate::core::linalg::EPSILON;
use crate::core::rng::Xoshiro256;

/// Outcome of one accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    /// Candidate scored at least as well as the current state.
    Improvement,
    /// Worse candidate accepted by the Metropolis test.
    Metropolis,
    /// Worse candidate accepted by the tunneling test.
    Tunneling,
    /// Candidate rejected.
    Rejected,
}

impl Acceptance {
    #[inline]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Acceptance::Rejected)
    }
}

/// Metropolis probability `exp((candidate - current) / T)`, 1 for improvements.
#[inline]
pub fn metropolis_probability(current: f64, candidate: f64, temperature: f64) -> f64 {
    if candidate >= current {
        return 1.0;
    }
    ((candidate - current) / (temperature + EPSILON)).exp()
}

/// Tunneling acceptance rule parameterized by mass and hbar analogues.
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceRule {
    mass: f64,
    hbar: f64,
}

impl AcceptanceRule {
    pub fn new(mass: f64, hbar: f64) -> Self {
        Self { mass, hbar }
    }

    /// `exp(-2 * sqrt(2 * m * gap) / hbar * distance)`, clamped to [0, 1].
    ///
    /// `current` plays the barrier height and `candidate` the particle
    /// energy; a candidate at or above the current score passes through.
    pub fn tunneling_probability(&self, current: f64, candidate: f64, distance: f64) -> f64 {
        if candidate >= current {
            return 1.0;
        }
        let gap = (current - candidate).max(0.0);
        let width = distance + EPSILON;
        let kappa = (2.0 * self.mass * gap).sqrt() / self.hbar;
        (-2.0 * kappa * width).exp().clamp(0.0, 1.0)
    }

    /// Decide whether to move from `current` to `candidate`.
    ///
    /// Draws at most two uniforms from `rng`: one for Metropolis, one for
    /// tunneling when Metropolis rejects.
    pub fn decide(
        &self,
        current: f64,
        candidate: f64,
        distance: f64,
        temperature: f64,
        rng: &mut Xoshiro256,
    ) -> Acceptance {
        if candidate >= current {
            return Acceptance::Improvement;
        }
        if rng.next_f64() < metropolis_probability(current, candidate, temperature) {
            return Acceptance::Metropolis;
        }
        if rng.next_f64() < self.tunneling_probability(current, candidate, distance) {
            return Acceptance::Tunneling;
        }
        Acceptance::Rejected
    }
}
