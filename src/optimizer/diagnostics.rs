//! Run diagnostics: per-iteration trace and acceptance statistics.

use serde::{Deserialize, Serialize};

use crate::optimizer::acceptance::Acceptance;

/// Snapshot recorded once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Best score seen so far in the run.
    pub best_score: f64,
    /// Mean ensemble score after this iteration's moves.
    pub avg_score: f64,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Best score of the freshly initialized ensemble.
    pub initial_best_score: f64,
    pub improvements: usize,
    pub metropolis_accepts: usize,
    pub tunneling_accepts: usize,
    pub rejections: usize,
    /// Number of ensemble interaction steps applied.
    pub interaction_steps: usize,
    /// Number of times the global best improved.
    pub best_updates: usize,
}

impl RunStats {
    /// Count one acceptance outcome.
    pub fn record(&mut self, outcome: Acceptance) {
        match outcome {
            Acceptance::Improvement => self.improvements += 1,
            Acceptance::Metropolis => self.metropolis_accepts += 1,
            Acceptance::Tunneling => self.tunneling_accepts += 1,
            Acceptance::Rejected => self.rejections += 1,
        }
    }

    /// Total proposals evaluated.
    pub fn proposals(&self) -> usize {
        self.improvements + self.metropolis_accepts + self.tunneling_accepts + self.rejections
    }

    /// Fraction of proposals accepted by any criterion.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.proposals();
        if total == 0 {
            return 0.0;
        }
        (total - self.rejections) as f64 / total as f64
    }
}

/// Check that a best-so-far trace never regresses.
pub fn is_monotone_best(trace: &[IterationRecord]) -> bool {
    trace.windows(2).all(|w| w[1].best_score >= w[0].best_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut stats = RunStats::default();
        stats.record(Acceptance::Improvement);
        stats.record(Acceptance::Tunneling);
        stats.record(Acceptance::Rejected);
        stats.record(Acceptance::Rejected);
        assert_eq!(stats.proposals(), 4);
        assert!((stats.acceptance_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_acceptance_rate() {
        assert_eq!(RunStats::default().acceptance_rate(), 0.0);
    }

    #[test]
    fn test_monotone_check() {
        let rec = |i, b| IterationRecord {
            iteration: i,
            best_score: b,
            avg_score: 0.0,
        };
        assert!(is_monotone_best(&[rec(0, 0.1), rec(1, 0.1), rec(2, 0.3)]));
        assert!(!is_monotone_best(&[rec(0, 0.2), rec(1, 0.1)]));
    }
}
