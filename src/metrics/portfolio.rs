//! Portfolio-level metrics for a finished allocation.
//!
//! Consumers display expected return, volatility and Sharpe ratio next to
//! the weights; these are computed here from the raw weight vector so the
//! numbers are reproducible from an [`AllocationResult`].
//!
//! [`AllocationResult`]: crate::optimizer::AllocationResult

use serde::{Deserialize, Serialize};

use crate::core::linalg::{dot, quadratic_form, EPSILON};
use crate::core::types::MarketStats;

/// Expected return, risk and Sharpe ratio of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// `w . means`
    pub expected_return: f64,
    /// `w' cov w`
    pub variance: f64,
    /// `sqrt(variance)`
    pub volatility: f64,
    /// `(expected_return - risk_free) / volatility`, 0 when volatility is ~0.
    pub sharpe_ratio: f64,
}

impl PortfolioMetrics {
    /// Compute metrics for `weights` under `market`.
    pub fn compute(weights: &[f64], market: &MarketStats, risk_free_rate: f64) -> Self {
        let expected_return = dot(weights, &market.means);
        let variance = quadratic_form(&market.cov, weights).max(0.0);
        let volatility = variance.sqrt();
        let sharpe_ratio = if volatility > EPSILON {
            (expected_return - risk_free_rate) / volatility
        } else {
            0.0
        };

        Self {
            expected_return,
            variance,
            volatility,
            sharpe_ratio,
        }
    }
}

/// Shannon entropy of the allocation in bits; higher means more diversified.
pub fn diversification_entropy(weights: &[f64]) -> f64 {
    -weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| w * w.log2())
        .sum::<f64>()
}

/// Effective number of holdings: `1 / sum(w^2)` on normalized weights.
pub fn effective_holdings(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().filter(|&&w| w > 0.0).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let hhi: f64 = weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| (w / total).powi(2))
        .sum();
    1.0 / hhi
}

/// Entropy of pairwise correlated exposure.
///
/// Each pair contributes `-p log2 p` with `p = sqrt(w_i w_j) |corr_ij|`.
/// Large values flag weight concentrated in correlated pairs.
pub fn correlated_pair_entropy(weights: &[f64], corr: &[Vec<f64>]) -> f64 {
    let n = weights.len();
    let mut entropy = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if weights[i] > 0.0 && weights[j] > 0.0 {
                let p = (weights[i] * weights[j]).sqrt() * corr[i][j].abs();
                if p > 0.0 {
                    entropy -= p * p.log2();
                }
            }
        }
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let market = MarketStats::new(vec![0.10, 0.04], vec![vec![0.04, 0.0], vec![0.0, 0.01]]);
        let m = PortfolioMetrics::compute(&[0.5, 0.5], &market, 0.02);
        assert!((m.expected_return - 0.07).abs() < 1e-12);
        assert!((m.variance - 0.0125).abs() < 1e-12);
        assert!((m.volatility - 0.0125f64.sqrt()).abs() < 1e-12);
        assert!((m.sharpe_ratio - 0.05 / 0.0125f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volatility_sharpe() {
        let market = MarketStats::new(vec![0.07], vec![vec![0.0]]);
        let m = PortfolioMetrics::compute(&[1.0], &market, 0.065);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_entropy() {
        assert!((diversification_entropy(&[0.25; 4]) - 2.0).abs() < 1e-12);
        assert!(diversification_entropy(&[1.0, 0.0]).abs() < 1e-12);
    }

    #[test]
    fn test_effective_holdings() {
        assert!((effective_holdings(&[0.25; 4]) - 4.0).abs() < 1e-12);
        assert!((effective_holdings(&[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(effective_holdings(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_correlated_pair_entropy() {
        let corr = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(correlated_pair_entropy(&[0.5, 0.5], &corr), 0.0);

        let corr = vec![vec![1.0, 0.5], vec![0.5, 1.0]];
        // p = 0.5 * 0.5 = 0.25 -> 0.25 * 2
        assert!((correlated_pair_entropy(&[0.5, 0.5], &corr) - 0.5).abs() < 1e-12);
    }
}
